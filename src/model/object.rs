use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{HasName, Handle};

/// Value stored in a model object field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Real(f64),
    Text(String),
    /// Pointer-valued field ("target"): refers to another object by handle.
    Target(Handle),
    Autosize,
}

impl FieldValue {
    pub fn as_real(&self) -> Option<f64> {
        match self {
            FieldValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_target(&self) -> Option<&Handle> {
        match self {
            FieldValue::Target(h) => Some(h),
            _ => None,
        }
    }

    pub fn is_autosize(&self) -> bool {
        matches!(self, FieldValue::Autosize)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Real(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Handle> for FieldValue {
    fn from(value: Handle) -> Self {
        FieldValue::Target(value)
    }
}

/// A schema object in the store: a class name, an optional name and keyed fields.
///
/// Fields are keyed by their display name (e.g. `"Pressure Rise"`), extensible
/// groups are kept positionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelObject {
    pub handle: Handle,
    pub class_name: String,
    pub name: Option<String>,
    pub(crate) fields: BTreeMap<String, FieldValue>,
    pub(crate) extensible: Vec<FieldValue>,
}

impl HasName for ModelObject {
    fn get_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl ModelObject {
    pub(crate) fn new(class_name: &str, name: Option<String>) -> Self {
        Self {
            handle: Handle::new(),
            class_name: class_name.to_string(),
            name,
            fields: BTreeMap::new(),
            extensible: Vec::new(),
        }
    }

    pub fn field(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn extensible(&self) -> &[FieldValue] {
        &self.extensible
    }

    /// Handles of all objects this object points to.
    pub fn targets(&self) -> impl Iterator<Item = &Handle> {
        self.fields
            .values()
            .chain(self.extensible.iter())
            .filter_map(FieldValue::as_target)
    }

    /// Short human-readable description used in diagnostics, e.g. `FanOnOff 'Supply Fan'`.
    pub fn brief_description(&self) -> String {
        match &self.name {
            Some(name) => format!("{} '{}'", self.class_name, name),
            None => format!("{} {}", self.class_name, self.handle),
        }
    }
}
