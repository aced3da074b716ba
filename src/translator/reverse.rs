//! Record graph back to a model.
//!
//! Name references are resolved to handles through the same mapping tables the
//! forward translator uses. Schedules go through
//! [`set_schedule`](crate::schedule_types::set_schedule), so every assignment
//! is checked against the catalog. Internal nodes synthesized for composite
//! components do not survive the round trip.

use std::collections::HashMap;

use tracing::{debug, info, trace};

use super::mapping::{
    ComponentMapping, FieldKind, FieldPolicy, FieldRule, Stitch, mapping_for_idf_type,
};
use super::stitch::{Children, ErvNodes, UnitaryLayout, unitary_chain};
use super::{Diagnostics, LogMessage};
use crate::error::{ModelError, TranslationError};
use crate::idf::schema as idf;
use crate::idf::{IdfFieldKind, IdfRecord, IdfValue, RecordId, Workspace};
use crate::model::hvac::{self, fields as hf};
use crate::model::schedule::compact_entry;
use crate::model::{FieldValue, Model, ObjectStore};
use crate::schedule_types::{ScheduleTypeCatalog, set_schedule};
use crate::Handle;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done(Handle),
}

/// A schedule reference waiting for its owner to exist.
struct PendingSchedule {
    field: &'static str,
    display_name: &'static str,
    schedule: Handle,
}

struct ReversePass<'a> {
    workspace: &'a Workspace,
    catalog: &'a ScheduleTypeCatalog,
    model: Model,
    memo: HashMap<RecordId, Visit>,
    log: Diagnostics,
}

fn catalog_fatal(e: ModelError) -> TranslationError {
    match e {
        ModelError::Catalog(c) => TranslationError::Catalog(c),
        other => TranslationError::Model(other),
    }
}

/// Types a reference field of `record` may point at.
fn allowed_types(record: &IdfRecord, field: &str) -> &'static [&'static str] {
    let schema = record.schema();
    match schema
        .field_index(field)
        .and_then(|i| schema.fields.get(i))
        .map(|f| f.kind)
    {
        Some(IdfFieldKind::ObjectRef(types)) => types,
        _ => &[],
    }
}

fn model_value(value: &IdfValue, kind: FieldKind) -> Option<FieldValue> {
    match (value, kind) {
        (IdfValue::Real(v), FieldKind::Scalar | FieldKind::Autosizable) => Some(FieldValue::Real(*v)),
        (IdfValue::Text(s), FieldKind::Autosizable) if s.eq_ignore_ascii_case("autosize") => {
            Some(FieldValue::Autosize)
        }
        (IdfValue::Text(s), FieldKind::Scalar | FieldKind::Autosizable) => {
            s.trim().parse().ok().map(FieldValue::Real)
        }
        (IdfValue::Text(s), FieldKind::Text) => Some(FieldValue::Text(s.clone())),
        (IdfValue::Real(v), FieldKind::Text) => Some(FieldValue::Text(v.to_string())),
        _ => None,
    }
}

impl<'a> ReversePass<'a> {
    fn new(workspace: &'a Workspace, catalog: &'a ScheduleTypeCatalog) -> Self {
        Self {
            workspace,
            catalog,
            model: Model::new(),
            memo: HashMap::new(),
            log: Diagnostics::new(),
        }
    }

    fn translate_all(&mut self) -> Result<(), TranslationError> {
        let workspace = self.workspace;
        info!("Reverse translating {} records", workspace.len());
        for (id, record) in workspace.records() {
            let type_name = record.type_name();
            if type_name == idf::NODE || type_name == idf::OUTDOOR_AIR_NODE_LIST {
                continue;
            }
            self.translate(id)?;
        }
        Ok(())
    }

    fn translate(&mut self, id: RecordId) -> Result<Option<Handle>, TranslationError> {
        let workspace = self.workspace;
        let record = workspace
            .record(id)
            .ok_or(crate::error::IdfError::RecordNotFound(id.index()))?;
        let desc = record.brief_description();
        match self.memo.get(&id) {
            Some(Visit::Done(handle)) => return Ok(Some(handle.clone())),
            Some(Visit::InProgress) => {
                let err = TranslationError::Cycle { object: desc };
                self.log.error(None, err.to_string());
                return Ok(None);
            }
            None => {}
        }
        let Some(mapping) = mapping_for_idf_type(record.type_name()) else {
            self.log
                .warn(Some(&desc), "Unsupported object type, not translated");
            return Ok(None);
        };

        self.memo.insert(id, Visit::InProgress);
        match self.emit(mapping, record) {
            Ok(handle) => {
                trace!("{} -> {}", desc, handle);
                self.memo.insert(id, Visit::Done(handle.clone()));
                Ok(Some(handle))
            }
            Err(e) => {
                self.memo.remove(&id);
                if e.is_fatal() {
                    return Err(e);
                }
                self.log.error(Some(&desc), e.reason());
                Ok(None)
            }
        }
    }

    /// Resolves a reference field to the record it names and translates it.
    fn resolve(
        &mut self,
        record: &IdfRecord,
        rule: &FieldRule,
    ) -> Result<Option<(RecordId, Handle)>, TranslationError> {
        let Some(name) = record.get_text(rule.target) else {
            return Ok(None);
        };
        let type_field = match rule.kind {
            FieldKind::Component { type_field } => type_field,
            _ => None,
        };
        let declared = type_field.and_then(|f| record.get_text(f));
        let found = match declared {
            Some(type_name) => self.workspace.find(type_name, name),
            None => self
                .workspace
                .find_any(allowed_types(record, rule.target), name),
        };
        let Some(id) = found else {
            return Err(TranslationError::Invalid {
                object: record.brief_description(),
                message: format!("{} '{}' does not resolve", rule.target, name),
            });
        };
        Ok(self.translate(id)?.map(|h| (id, h)))
    }

    fn emit(
        &mut self,
        mapping: &ComponentMapping,
        record: &IdfRecord,
    ) -> Result<Handle, TranslationError> {
        if record.schema().has_name && record.name().is_none() {
            return Err(TranslationError::Precondition {
                object: record.brief_description(),
                message: "record has no name".to_string(),
            });
        }

        let missing = |rule: &FieldRule| TranslationError::MissingRequired {
            object: record.brief_description(),
            field: rule.target.to_string(),
        };

        let mut values: Vec<(&'static str, FieldValue)> = Vec::new();
        let mut schedules: Vec<PendingSchedule> = Vec::new();
        let mut children = Children::default();
        for rule in mapping.rules {
            match rule.kind {
                FieldKind::Scalar | FieldKind::Text | FieldKind::Autosizable => {
                    match record.get(rule.target) {
                        Some(value) => {
                            let value = model_value(value, rule.kind).ok_or_else(|| {
                                TranslationError::Invalid {
                                    object: record.brief_description(),
                                    message: format!("{} has an unexpected value", rule.target),
                                }
                            })?;
                            values.push((rule.source, value));
                        }
                        None if rule.policy == FieldPolicy::Required => return Err(missing(rule)),
                        None => {}
                    }
                }
                FieldKind::Node => {
                    if let Some(name) = record.get_text(rule.target) {
                        let node = self.model.get_or_add_node(name);
                        values.push((rule.source, FieldValue::Target(node)));
                    }
                }
                FieldKind::Schedule { display_name } => match self.resolve(record, rule) {
                    Ok(Some((_, schedule))) => schedules.push(PendingSchedule {
                        field: rule.source,
                        display_name,
                        schedule,
                    }),
                    Ok(None) if rule.policy == FieldPolicy::Required => return Err(missing(rule)),
                    Ok(None) => {}
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => self.log.warn(Some(&record.brief_description()), e.reason()),
                },
                FieldKind::Component { .. } => match self.resolve(record, rule) {
                    Ok(Some((id, handle))) => {
                        children.push(rule.source, id);
                        values.push((rule.source, FieldValue::Target(handle)));
                    }
                    Ok(None) if rule.policy == FieldPolicy::Required => return Err(missing(rule)),
                    Ok(None) => {}
                    Err(e) if e.is_fatal() || rule.policy == FieldPolicy::Required => return Err(e),
                    Err(e) => self.log.warn(Some(&record.brief_description()), e.reason()),
                },
            }
        }

        let handle = self.model.add_object(mapping.class_name, record.name());
        for (field, value) in values {
            self.model.set_field(&handle, field, value)?;
        }
        if mapping.copy_extensible {
            let entries = record
                .extensible()
                .iter()
                .filter(|v| !v.is_blank())
                .map(|v| match v {
                    IdfValue::Real(x) => FieldValue::Real(*x),
                    other => compact_entry(&other.to_string()),
                })
                .collect();
            self.model.set_extensible(&handle, entries)?;
        }
        for pending in schedules {
            let assigned = set_schedule(
                &mut self.model,
                self.catalog,
                &handle,
                pending.field,
                pending.display_name,
                &pending.schedule,
            )
            .map_err(catalog_fatal)?;
            if !assigned {
                self.log.warn(
                    Some(&record.brief_description()),
                    format!("{} is not compatible, left unset", pending.field),
                );
            }
        }

        match mapping.stitch {
            Some(Stitch::EnergyRecoveryVentilator) => {
                self.unstitch_erv(record, &handle, &children)?
            }
            Some(Stitch::UnitarySystem) => self.unstitch_unitary(record, &children)?,
            None => {}
        }
        Ok(handle)
    }

    fn child_handle(&self, children: &Children, field: &str) -> Option<Handle> {
        children.get(field).and_then(|id| match self.memo.get(&id) {
            Some(Visit::Done(h)) => Some(h.clone()),
            _ => None,
        })
    }

    /// Drops node connections of a sub-component and removes the internal
    /// nodes nothing else uses.
    fn detach_internal_nodes(
        &mut self,
        parts: &[Handle],
        internal: &[String],
    ) -> Result<(), TranslationError> {
        for part in parts {
            self.model.remove_field(part, hf::INLET_NODE)?;
            self.model.remove_field(part, hf::OUTLET_NODE)?;
        }
        for name in internal {
            let unused: Vec<Handle> = self
                .model
                .objects_by_class_and_name(hvac::NODE, name)
                .iter()
                .filter(|n| self.model.direct_use_count(&n.handle) == 0)
                .map(|n| n.handle.clone())
                .collect();
            for node in unused {
                self.model.remove(&node)?;
                debug!("Dropped internal node '{}'", name);
            }
        }
        Ok(())
    }

    /// Recovers the zone connections of an ERV: the zone exhaust feeds the
    /// heat exchanger, the supply fan discharges into the zone inlet.
    fn unstitch_erv(
        &mut self,
        record: &IdfRecord,
        handle: &Handle,
        children: &Children,
    ) -> Result<(), TranslationError> {
        let ws = self.workspace;
        let zone_exhaust = children
            .get(hf::HEAT_EXCHANGER)
            .and_then(|id| ws.get_text(id, "Exhaust Air Inlet Node Name"));
        let zone_inlet = children
            .get(hf::SUPPLY_AIR_FAN)
            .and_then(|id| ws.get_text(id, "Air Outlet Node Name"));

        let parts: Vec<Handle> = [hf::SUPPLY_AIR_FAN, hf::EXHAUST_AIR_FAN]
            .iter()
            .filter_map(|f| self.child_handle(children, f))
            .collect();
        let nodes = ErvNodes::new(record.name().unwrap_or_default());
        let internal = [
            nodes.oa,
            nodes.supply_fan_inlet,
            nodes.exhaust_fan_inlet,
            nodes.exhaust_fan_outlet,
        ];
        self.detach_internal_nodes(&parts, &internal)?;

        match (zone_exhaust, zone_inlet) {
            (Some(exhaust), Some(inlet)) => {
                let exhaust = self.model.get_or_add_node(exhaust);
                let inlet = self.model.get_or_add_node(inlet);
                self.model
                    .connect_zone_equipment(handle, &exhaust, &inlet)?;
            }
            _ => self.log.warn(
                Some(&record.brief_description()),
                "zone nodes could not be recovered",
            ),
        }
        Ok(())
    }

    /// Removes the nodes between the parts of a unitary system.
    fn unstitch_unitary(
        &mut self,
        record: &IdfRecord,
        children: &Children,
    ) -> Result<(), TranslationError> {
        let (Some(inlet), Some(outlet)) = (
            record.get_text("Air Inlet Node Name"),
            record.get_text("Air Outlet Node Name"),
        ) else {
            return Ok(());
        };
        let fields = [
            hf::SUPPLY_FAN,
            hf::COOLING_COIL,
            hf::HEATING_COIL,
            hf::SUPPLEMENTAL_HEATING_COIL,
        ];
        let layout = UnitaryLayout {
            fan: children.get(hf::SUPPLY_FAN).is_some(),
            blow_through: record
                .get_text("Fan Placement")
                .is_some_and(|s| s.eq_ignore_ascii_case("BlowThrough")),
            cooling_coil: children.get(hf::COOLING_COIL).is_some(),
            heating_coil: children.get(hf::HEATING_COIL).is_some(),
            supplemental_coil: children.get(hf::SUPPLEMENTAL_HEATING_COIL).is_some(),
        };
        let chain = unitary_chain(record.name().unwrap_or_default(), inlet, outlet, &layout);
        let internal: Vec<String> = [
            chain.fan,
            chain.cooling_coil,
            chain.heating_coil,
            chain.supplemental_coil,
        ]
        .into_iter()
        .flatten()
        .flat_map(|p| [p.inlet, p.outlet])
        .filter(|n| n != inlet && n != outlet)
        .collect();
        let parts: Vec<Handle> = fields
            .iter()
            .filter_map(|f| self.child_handle(children, f))
            .collect();
        self.detach_internal_nodes(&parts, &internal)
    }
}

/// Builds a model from a workspace.
pub struct ReverseTranslator<'a> {
    catalog: &'a ScheduleTypeCatalog,
    log: Diagnostics,
}

impl<'a> ReverseTranslator<'a> {
    pub fn new(catalog: &'a ScheduleTypeCatalog) -> Self {
        Self {
            catalog,
            log: Diagnostics::new(),
        }
    }

    pub fn translate_workspace(&mut self, workspace: &Workspace) -> Result<Model, TranslationError> {
        let mut pass = ReversePass::new(workspace, self.catalog);
        let result = pass.translate_all();
        self.log = pass.log;
        result.map(|()| pass.model)
    }

    pub fn messages(&self) -> &[LogMessage] {
        self.log.messages()
    }

    pub fn warnings(&self) -> Vec<LogMessage> {
        self.log.warnings()
    }

    pub fn errors(&self) -> Vec<LogMessage> {
        self.log.errors()
    }
}
