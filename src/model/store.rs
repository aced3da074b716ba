use crate::Handle;
use crate::error::ModelError;

use super::FieldValue;

/// The capability set the translators consume from an object model.
///
/// Anything that can enumerate objects by handle and read/write their fields
/// can be translated; the schema behind the objects is not visible here.
pub trait ObjectStore {
    /// All handles, in a stable order.
    fn handles(&self) -> Vec<Handle>;

    fn class_name(&self, handle: &Handle) -> Option<&str>;

    fn name(&self, handle: &Handle) -> Option<&str>;

    fn get_field(&self, handle: &Handle, field: &str) -> Option<&FieldValue>;

    fn set_field(&mut self, handle: &Handle, field: &str, value: FieldValue)
    -> Result<(), ModelError>;

    /// Positional extensible values of an object (empty if it has none).
    fn extensible(&self, handle: &Handle) -> &[FieldValue];

    /// Resolves a pointer-valued field.
    fn get_target(&self, handle: &Handle, field: &str) -> Option<Handle> {
        self.get_field(handle, field)
            .and_then(FieldValue::as_target)
            .cloned()
    }

    fn get_real(&self, handle: &Handle, field: &str) -> Option<f64> {
        self.get_field(handle, field).and_then(FieldValue::as_real)
    }

    fn get_text(&self, handle: &Handle, field: &str) -> Option<&str> {
        self.get_field(handle, field).and_then(FieldValue::as_text)
    }

    fn brief_description(&self, handle: &Handle) -> String {
        match (self.class_name(handle), self.name(handle)) {
            (Some(class), Some(name)) => format!("{class} '{name}'"),
            (Some(class), None) => format!("{class} {handle}"),
            _ => format!("object {handle}"),
        }
    }
}
