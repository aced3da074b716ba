pub mod error;
mod handle;
pub mod idf;
pub mod io;
pub mod model;
mod name;
pub mod schedule_types;
pub mod translator;

// Prelude
pub use error::{CatalogError, IdfError, ModelError, TranslationError};
pub use handle::Handle;
pub use idf::{IdfRecord, IdfValue, RecordId, Workspace};
pub use model::{FieldValue, Model, ObjectStore};
pub use name::{HasName, SortByName};
pub use schedule_types::{ScheduleType, ScheduleTypeCatalog};
pub use translator::{ForwardTranslator, ReverseTranslator, TranslatorConfig};
