//! In-memory object model.
//!
//! Objects are identified by [`Handle`] and reference each other through
//! pointer-valued fields ([`FieldValue::Target`]). Names are unique within a
//! class: assigning a taken name appends `" 1"`, `" 2"`, ...

pub mod hvac;
pub mod object;
pub mod schedule;
pub mod store;

pub use object::{FieldValue, ModelObject};
pub use store::ObjectStore;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ModelError;
use crate::name::unique_name;
use crate::{Handle, SortByName};

/// Records that `owner`'s `field` was assigned a schedule for the catalog entry
/// `(class_name, display_name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUsage {
    pub owner: Handle,
    pub field: String,
    pub class_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ModelData", into = "ModelData")]
pub struct Model {
    objects: HashMap<Handle, ModelObject>,
    order: Vec<Handle>,
    schedule_usages: Vec<ScheduleUsage>,
}

/// Serialized form of a [`Model`]: objects in insertion order.
#[derive(Serialize, Deserialize)]
struct ModelData {
    objects: Vec<ModelObject>,
    #[serde(default)]
    schedule_usages: Vec<ScheduleUsage>,
}

impl From<ModelData> for Model {
    fn from(data: ModelData) -> Self {
        let order = data.objects.iter().map(|o| o.handle.clone()).collect();
        let objects = data
            .objects
            .into_iter()
            .map(|o| (o.handle.clone(), o))
            .collect();
        Self {
            objects,
            order,
            schedule_usages: data.schedule_usages,
        }
    }
}

impl From<Model> for ModelData {
    fn from(mut model: Model) -> Self {
        let objects = model
            .order
            .iter()
            .filter_map(|h| model.objects.remove(h))
            .collect();
        Self {
            objects,
            schedule_usages: model.schedule_usages,
        }
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in the model.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Adds an empty object of the given class and returns its handle.
    ///
    /// If `name` is already used by another object of the same class, a unique
    /// variant is assigned instead.
    pub fn add_object(&mut self, class_name: &str, name: Option<&str>) -> Handle {
        let name = name.map(|n| self.free_name(class_name, n, None));
        let object = ModelObject::new(class_name, name);
        let handle = object.handle.clone();
        self.order.push(handle.clone());
        self.objects.insert(handle.clone(), object);
        handle
    }

    pub fn object(&self, handle: &Handle) -> Option<&ModelObject> {
        self.objects.get(handle)
    }

    pub fn contains(&self, handle: &Handle) -> bool {
        self.objects.contains_key(handle)
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &ModelObject> {
        self.order.iter().filter_map(|h| self.objects.get(h))
    }

    /// Objects of a class, sorted by name.
    pub fn objects_by_class(&self, class_name: &str) -> Vec<&ModelObject> {
        let mut result: Vec<&ModelObject> = self
            .objects()
            .filter(|o| o.class_name == class_name)
            .collect();
        result.as_mut_slice().sort_by_name();
        result
    }

    /// Objects of a class whose name is exactly `name`.
    pub fn objects_by_class_and_name(&self, class_name: &str, name: &str) -> Vec<&ModelObject> {
        self.objects()
            .filter(|o| o.class_name == class_name && o.name.as_deref() == Some(name))
            .collect()
    }

    /// Renames an object and returns the name actually assigned.
    pub fn set_name(&mut self, handle: &Handle, name: &str) -> Result<String, ModelError> {
        let class_name = self.require(handle)?.class_name.clone();
        let name = self.free_name(&class_name, name, Some(handle));
        if let Some(obj) = self.objects.get_mut(handle) {
            obj.name = Some(name.clone());
        }
        Ok(name)
    }

    pub fn remove_field(&mut self, handle: &Handle, field: &str) -> Result<(), ModelError> {
        let obj = self.require_mut(handle)?;
        obj.fields.remove(field);
        Ok(())
    }

    pub fn push_extensible(&mut self, handle: &Handle, value: FieldValue) -> Result<(), ModelError> {
        self.require_mut(handle)?.extensible.push(value);
        Ok(())
    }

    pub fn set_extensible(
        &mut self,
        handle: &Handle,
        values: Vec<FieldValue>,
    ) -> Result<(), ModelError> {
        self.require_mut(handle)?.extensible = values;
        Ok(())
    }

    /// Number of fields in other objects pointing at `handle`.
    pub fn direct_use_count(&self, handle: &Handle) -> usize {
        self.objects()
            .filter(|o| &o.handle != handle)
            .map(|o| o.targets().filter(|t| *t == handle).count())
            .sum()
    }

    /// Objects with at least one field pointing at `handle`.
    pub fn sources_of(&self, handle: &Handle) -> Vec<&ModelObject> {
        self.objects()
            .filter(|o| o.targets().any(|t| t == handle))
            .collect()
    }

    /// Removes an object that nothing points at.
    pub fn remove(&mut self, handle: &Handle) -> Result<ModelObject, ModelError> {
        self.require(handle)?;
        let use_count = self.direct_use_count(handle);
        if use_count > 0 {
            return Err(ModelError::InUse {
                handle: handle.clone(),
                use_count,
            });
        }
        self.order.retain(|h| h != handle);
        self.schedule_usages.retain(|u| &u.owner != handle);
        self.objects
            .remove(handle)
            .ok_or_else(|| ModelError::ObjectNotFound(handle.clone()))
    }

    /// Returns the object, failing if the handle is unknown or of another class.
    pub fn require_class(
        &self,
        handle: &Handle,
        class_name: &str,
    ) -> Result<&ModelObject, ModelError> {
        let obj = self.require(handle)?;
        if obj.class_name != class_name {
            return Err(ModelError::WrongClass {
                handle: handle.clone(),
                expected: class_name.to_string(),
                actual: obj.class_name.clone(),
            });
        }
        Ok(obj)
    }

    /// Live usages of a schedule: recorded assignments whose field still points at it.
    pub fn schedule_usages_of(&self, schedule: &Handle) -> Vec<&ScheduleUsage> {
        self.schedule_usages
            .iter()
            .filter(|u| self.get_target(&u.owner, &u.field).as_ref() == Some(schedule))
            .collect()
    }

    pub(crate) fn record_schedule_usage(&mut self, usage: ScheduleUsage) {
        self.schedule_usages
            .retain(|u| !(u.owner == usage.owner && u.field == usage.field));
        self.schedule_usages.push(usage);
    }

    pub(crate) fn require(&self, handle: &Handle) -> Result<&ModelObject, ModelError> {
        self.objects
            .get(handle)
            .ok_or_else(|| ModelError::ObjectNotFound(handle.clone()))
    }

    fn require_mut(&mut self, handle: &Handle) -> Result<&mut ModelObject, ModelError> {
        self.objects
            .get_mut(handle)
            .ok_or_else(|| ModelError::ObjectNotFound(handle.clone()))
    }

    fn free_name(&self, class_name: &str, name: &str, exclude: Option<&Handle>) -> String {
        unique_name(name, |candidate| {
            self.objects.values().any(|o| {
                o.class_name == class_name
                    && o.name.as_deref() == Some(candidate)
                    && Some(&o.handle) != exclude
            })
        })
    }
}

impl ObjectStore for Model {
    fn handles(&self) -> Vec<Handle> {
        self.order.clone()
    }

    fn class_name(&self, handle: &Handle) -> Option<&str> {
        self.objects.get(handle).map(|o| o.class_name.as_str())
    }

    fn name(&self, handle: &Handle) -> Option<&str> {
        self.objects.get(handle).and_then(|o| o.name.as_deref())
    }

    fn get_field(&self, handle: &Handle, field: &str) -> Option<&FieldValue> {
        self.objects.get(handle).and_then(|o| o.fields.get(field))
    }

    fn set_field(
        &mut self,
        handle: &Handle,
        field: &str,
        value: FieldValue,
    ) -> Result<(), ModelError> {
        if let FieldValue::Target(target) = &value {
            if !self.objects.contains_key(target) {
                return Err(ModelError::ObjectNotFound(target.clone()));
            }
        }
        self.require_mut(handle)?
            .fields
            .insert(field.to_string(), value);
        Ok(())
    }

    fn extensible(&self, handle: &Handle) -> &[FieldValue] {
        self.objects
            .get(handle)
            .map(|o| o.extensible.as_slice())
            .unwrap_or(&[])
    }
}
