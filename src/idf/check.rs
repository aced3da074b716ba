//! Reference invariant checker for a [`Workspace`].

use std::fmt;

use super::schema::{IdfFieldKind, NODE};
use super::{IdfValue, Workspace};

/// A reference field naming no record of an allowed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceIssue {
    pub record: String,
    pub field: String,
    pub target: String,
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} '{}' does not resolve", self.record, self.field, self.target)
    }
}

/// Verifies that every reference resolves to a record.
///
/// A reference resolves to at most one record: types a field may reference
/// share a name group, and [`Workspace::insert`] keeps names unique per group.
pub fn check_references(workspace: &Workspace) -> Vec<ReferenceIssue> {
    let mut issues = Vec::new();
    for (_, record) in workspace.records() {
        let schema = record.schema();
        let fixed = schema
            .fields
            .iter()
            .zip(record.values())
            .map(|(f, v)| (f.name, f.kind, v));
        let extensible = schema.extensible.into_iter().flat_map(|kind| {
            record
                .extensible()
                .iter()
                .map(move |v| ("Extensible Field", kind, v))
        });
        for (field, kind, value) in fixed.chain(extensible) {
            let allowed: &[&str] = match kind {
                IdfFieldKind::ObjectRef(types) => types,
                IdfFieldKind::NodeRef => &[NODE],
                _ => continue,
            };
            let target = match value {
                IdfValue::Text(s) if !s.is_empty() => s,
                _ => continue,
            };
            if workspace.find_any(allowed, target).is_none() {
                issues.push(ReferenceIssue {
                    record: record.brief_description(),
                    field: field.to_string(),
                    target: target.clone(),
                });
            }
        }
    }
    issues
}
