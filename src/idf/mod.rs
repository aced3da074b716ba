//! Target record graph.
//!
//! Records reference each other by name only. [`Workspace`] keeps a
//! bidirectional index between `(type, name)` and [`RecordId`] so that names
//! resolve to exactly one record. Types a single field may reference (all
//! schedules, all fans, ...) share one name space, see
//! [`schema::NAME_GROUPS`].

pub mod check;
pub mod schema;

pub use check::{ReferenceIssue, check_references};
pub use schema::{IdfField, IdfFieldKind, IdfObjectSchema, name_group, schema_for};

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::IdfError;
use crate::name::unique_name;

/// Field value in a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum IdfValue {
    #[default]
    Blank,
    Text(String),
    Real(f64),
}

impl IdfValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            IdfValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            IdfValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            IdfValue::Blank => true,
            IdfValue::Text(s) => s.is_empty(),
            IdfValue::Real(_) => false,
        }
    }
}

impl fmt::Display for IdfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdfValue::Blank => Ok(()),
            IdfValue::Text(s) => write!(f, "{s}"),
            IdfValue::Real(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for IdfValue {
    fn from(value: &str) -> Self {
        IdfValue::Text(value.to_string())
    }
}

impl From<String> for IdfValue {
    fn from(value: String) -> Self {
        IdfValue::Text(value)
    }
}

impl From<f64> for IdfValue {
    fn from(value: f64) -> Self {
        IdfValue::Real(value)
    }
}

/// Position of a record in its workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One named record with positional fields laid out by its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfRecord {
    schema: &'static IdfObjectSchema,
    name: Option<String>,
    fields: Vec<IdfValue>,
    extensible: Vec<IdfValue>,
}

impl IdfRecord {
    /// A detached record with all fields blank.
    pub fn new(type_name: &str, name: Option<&str>) -> Result<Self, IdfError> {
        let schema =
            schema_for(type_name).ok_or_else(|| IdfError::UnknownType(type_name.to_string()))?;
        Ok(Self {
            schema,
            name: name.filter(|_| schema.has_name).map(str::to_string),
            fields: vec![IdfValue::Blank; schema.fields.len()],
            extensible: Vec::new(),
        })
    }

    pub fn schema(&self) -> &'static IdfObjectSchema {
        self.schema
    }

    pub fn type_name(&self) -> &'static str {
        self.schema.name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get(&self, field: &str) -> Option<&IdfValue> {
        self.schema
            .field_index(field)
            .and_then(|i| self.fields.get(i))
            .filter(|v| !v.is_blank())
    }

    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(IdfValue::as_text)
    }

    pub fn get_real(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(IdfValue::as_real)
    }

    pub fn set(&mut self, field: &str, value: impl Into<IdfValue>) -> Result<(), IdfError> {
        let i = self
            .schema
            .field_index(field)
            .ok_or_else(|| IdfError::UnknownField {
                type_name: self.schema.name.to_string(),
                field: field.to_string(),
            })?;
        self.fields[i] = value.into();
        Ok(())
    }

    /// Fields in schema order, without the name.
    pub fn values(&self) -> &[IdfValue] {
        &self.fields
    }

    pub fn extensible(&self) -> &[IdfValue] {
        &self.extensible
    }

    pub fn push_extensible(&mut self, value: impl Into<IdfValue>) -> Result<(), IdfError> {
        if self.schema.extensible.is_none() {
            return Err(IdfError::NotExtensible {
                type_name: self.schema.name.to_string(),
            });
        }
        self.extensible.push(value.into());
        Ok(())
    }

    pub(crate) fn set_value_at(&mut self, index: usize, value: IdfValue) {
        if let Some(slot) = self.fields.get_mut(index) {
            *slot = value;
        }
    }

    /// Short description used in diagnostics, e.g. `Fan:OnOff 'Supply Fan'`.
    pub fn brief_description(&self) -> String {
        match &self.name {
            Some(name) => format!("{} '{}'", self.schema.name, name),
            None => self.schema.name.to_string(),
        }
    }
}

/// Ordered collection of records with a name index.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    records: Vec<IdfRecord>,
    by_name: HashMap<(&'static str, String), RecordId>,
    /// Taken names per name group.
    taken: HashSet<(&'static str, String)>,
}

fn key(schema: &'static IdfObjectSchema, name: &str) -> (&'static str, String) {
    (schema.name, name.to_lowercase())
}

fn group_key(schema: &'static IdfObjectSchema, name: &str) -> (&'static str, String) {
    (name_group(schema), name.to_lowercase())
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds a blank record. Returns its id; the name may have been made unique.
    pub fn add_record(&mut self, type_name: &str, name: Option<&str>) -> Result<RecordId, IdfError> {
        let record = IdfRecord::new(type_name, name)?;
        Ok(self.insert(record))
    }

    /// Inserts a detached record, renaming it if its name is taken within its
    /// name group.
    pub fn insert(&mut self, mut record: IdfRecord) -> RecordId {
        let schema = record.schema;
        if let Some(name) = record.name.take() {
            let name = unique_name(&name, |n| self.taken.contains(&group_key(schema, n)));
            record.name = Some(name);
        }
        let id = RecordId(self.records.len());
        if let Some(name) = &record.name {
            self.by_name.insert(key(schema, name), id);
            self.taken.insert(group_key(schema, name));
        }
        self.records.push(record);
        id
    }

    /// Returns the node named `name`, adding it if it does not exist yet.
    pub fn add_node(&mut self, name: &str) -> RecordId {
        if let Some(id) = self.find(schema::NODE, name) {
            return id;
        }
        self.insert(IdfRecord {
            schema: &schema::NODE_SCHEMA,
            name: Some(name.to_string()),
            fields: Vec::new(),
            extensible: Vec::new(),
        })
    }

    pub fn record(&self, id: RecordId) -> Option<&IdfRecord> {
        self.records.get(id.0)
    }

    pub fn record_mut(&mut self, id: RecordId) -> Option<&mut IdfRecord> {
        self.records.get_mut(id.0)
    }

    /// Sets a field of a record already in the workspace.
    pub fn set_field(
        &mut self,
        id: RecordId,
        field: &str,
        value: impl Into<IdfValue>,
    ) -> Result<(), IdfError> {
        self.records
            .get_mut(id.0)
            .ok_or(IdfError::RecordNotFound(id.0))?
            .set(field, value)
    }

    pub fn get_text(&self, id: RecordId, field: &str) -> Option<&str> {
        self.record(id).and_then(|r| r.get_text(field))
    }

    /// Record of `type_name` named `name` (both case-insensitive).
    pub fn find(&self, type_name: &str, name: &str) -> Option<RecordId> {
        let schema = schema_for(type_name)?;
        self.by_name.get(&key(schema, name)).copied()
    }

    /// Whether inserting a `type_name` record named `name` would rename it.
    pub fn is_name_taken(&self, type_name: &str, name: &str) -> bool {
        schema_for(type_name).is_some_and(|schema| self.taken.contains(&group_key(schema, name)))
    }

    /// First record named `name` among `types`.
    pub fn find_any(&self, types: &[&str], name: &str) -> Option<RecordId> {
        types.iter().find_map(|t| self.find(t, name))
    }

    /// Records in insertion order with their ids.
    pub fn records(&self) -> impl Iterator<Item = (RecordId, &IdfRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (RecordId(i), r))
    }

    pub fn records_of_type<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = (RecordId, &'a IdfRecord)> + 'a {
        self.records()
            .filter(move |(_, r)| r.type_name().eq_ignore_ascii_case(type_name))
    }

    /// Adds a `Node` record for every node name referenced by any record.
    pub fn materialize_nodes(&mut self) -> usize {
        let mut names = Vec::new();
        for (_, record) in self.records() {
            let schema = record.schema();
            let fixed = schema
                .fields
                .iter()
                .zip(record.values())
                .filter(|(f, _)| f.kind == IdfFieldKind::NodeRef)
                .map(|(_, v)| v);
            let extensible = record
                .extensible()
                .iter()
                .filter(|_| schema.extensible == Some(IdfFieldKind::NodeRef));
            for value in fixed.chain(extensible) {
                if let Some(name) = value.as_text().filter(|s| !s.is_empty()) {
                    names.push(name.to_string());
                }
            }
        }
        let before = self.len();
        for name in names {
            self.add_node(&name);
        }
        self.len() - before
    }
}
