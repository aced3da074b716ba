//! File I/O for models and workspaces.
//!
//! Models are persisted as JSON. Workspaces are read and written as IDF text.

pub mod idf;
pub mod json;

pub use idf::{from_idf_string, read_idf, to_idf_string, write_idf};
pub use json::{from_json_string, read_model, to_json_string, write_model};
