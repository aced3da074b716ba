//! Error taxonomy.
//!
//! Incompatibility between a schedule and a field is not an error: it is
//! reported as `Ok(false)` by the registry functions.

use thiserror::Error;

use crate::Handle;

/// Failures of the schedule type catalog.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// The (class, display name) pair has no registered schedule type.
    /// The catalog is meant to be exhaustive, so this is a usage error.
    #[error("No '{display_name}' Schedule is registered for class {class_name}.")]
    NotFound {
        class_name: String,
        display_name: String,
    },

    #[error("Duplicate schedule type '{display_name}' for class {class_name}")]
    Duplicate {
        class_name: String,
        display_name: String,
    },

    #[error("Invalid schedule type catalog: {0}")]
    Parse(String),
}

/// Failures of the in-memory object store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Object {0} not found in model")]
    ObjectNotFound(Handle),

    #[error("Object {handle} is a {actual}, expected {expected}")]
    WrongClass {
        handle: Handle,
        expected: String,
        actual: String,
    },

    #[error("Object {handle} is still referenced by {use_count} field(s)")]
    InUse { handle: Handle, use_count: usize },

    #[error("{object} points at missing object {target}")]
    DanglingTarget { object: String, target: Handle },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Failures of the target record graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdfError {
    #[error("Unknown IDF object type: {0}")]
    UnknownType(String),

    #[error("{type_name} has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    #[error("Record #{0} not found in workspace")]
    RecordNotFound(usize),

    #[error("{type_name} does not take extensible fields")]
    NotExtensible { type_name: String },

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Failures of a translation pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslationError {
    /// A guarantee of the object model does not hold (e.g. a named class without a name).
    /// Aborts the whole pass.
    #[error("Precondition violated for {object}: {message}")]
    Precondition { object: String, message: String },

    /// A required sub-object is missing or could not be translated.
    #[error("{object}: required {field} could not be translated")]
    MissingRequired { object: String, field: String },

    /// The object graph references an object that is still being translated.
    #[error("Reference cycle detected at {object}")]
    Cycle { object: String },

    #[error("{object}: {message}")]
    Invalid { object: String, message: String },

    #[error("{0} dangling or duplicate reference(s) in translated workspace")]
    DanglingReferences(usize),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Idf(#[from] IdfError),
}

impl TranslationError {
    /// Whether the error must abort the whole pass instead of only the current object.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TranslationError::Precondition { .. } | TranslationError::Catalog(_)
        )
    }

    /// The message without the object description.
    pub fn reason(&self) -> String {
        match self {
            TranslationError::Precondition { message, .. }
            | TranslationError::Invalid { message, .. } => message.clone(),
            TranslationError::MissingRequired { field, .. } => {
                format!("required {field} could not be translated")
            }
            TranslationError::Cycle { .. } => "Reference cycle detected".to_string(),
            other => other.to_string(),
        }
    }
}
