//! Model to record graph.

use std::collections::HashMap;

use tracing::{debug, info, trace};

use super::mapping::{
    ComponentMapping, FieldKind, FieldPolicy, FieldRule, Stitch, mapping_for_class,
};
use super::stitch::{self, Children, StitchContext};
use super::{Diagnostics, LogMessage, TranslatorConfig};
use crate::error::{ModelError, TranslationError};
use crate::idf::schema as idf;
use crate::idf::{IdfRecord, IdfValue, RecordId, Workspace, check_references};
use crate::model::hvac;
use crate::model::{FieldValue, Model, ObjectStore};
use crate::{Handle, HasName};

/// Visitation state of a source object within one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done(RecordId),
}

/// One depth-first translation over a model.
///
/// Each source object is emitted at most once per pass. A pass owns its memo,
/// so a new pass starts from scratch.
pub struct TranslationPass<'a> {
    model: &'a Model,
    config: &'a TranslatorConfig,
    workspace: Workspace,
    memo: HashMap<Handle, Visit>,
    always_on: Option<String>,
    log: Diagnostics,
}

impl<'a> TranslationPass<'a> {
    pub fn new(model: &'a Model, config: &'a TranslatorConfig) -> Self {
        Self {
            model,
            config,
            workspace: Workspace::new(),
            memo: HashMap::new(),
            always_on: None,
            log: Diagnostics::new(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn into_parts(self) -> (Workspace, Diagnostics) {
        (self.workspace, self.log)
    }

    /// Translates every supported object, ordered by class priority then name.
    pub fn translate_all(&mut self) -> Result<(), TranslationError> {
        let model = self.model;
        let mut objects = Vec::new();
        for obj in model.objects() {
            match mapping_for_class(&obj.class_name) {
                Some(mapping) => objects.push((mapping.priority, obj)),
                None => self.log.warn(
                    Some(&obj.brief_description()),
                    "Unsupported object type, not translated",
                ),
            }
        }
        objects.sort_by(|(pa, a), (pb, b)| pa.cmp(pb).then_with(|| a.get_name().cmp(b.get_name())));
        info!("Translating {} objects", objects.len());

        for (_, obj) in objects {
            self.translate(&obj.handle)?;
        }
        Ok(())
    }

    /// Emits the record of one object, reusing the record of a previous visit.
    ///
    /// Returns `Ok(None)` if the object could not be translated; the reason is
    /// logged. Only fatal errors are returned.
    pub fn translate(&mut self, handle: &Handle) -> Result<Option<RecordId>, TranslationError> {
        let desc = self.model.brief_description(handle);
        match self.memo.get(handle) {
            Some(Visit::Done(id)) => return Ok(Some(*id)),
            Some(Visit::InProgress) => {
                let err = TranslationError::Cycle { object: desc };
                self.log.error(None, err.to_string());
                return Ok(None);
            }
            None => {}
        }

        let class_name = self
            .model
            .class_name(handle)
            .ok_or_else(|| ModelError::ObjectNotFound(handle.clone()))?;
        let Some(mapping) = mapping_for_class(class_name) else {
            self.log
                .warn(Some(&desc), "Unsupported object type, not translated");
            return Ok(None);
        };

        self.memo.insert(handle.clone(), Visit::InProgress);
        match self.emit(mapping, handle) {
            Ok(id) => {
                trace!("{} -> {}", desc, id);
                self.memo.insert(handle.clone(), Visit::Done(id));
                Ok(Some(id))
            }
            Err(e) => {
                self.memo.remove(handle);
                if e.is_fatal() {
                    return Err(e);
                }
                self.log.error(Some(&desc), e.reason());
                Ok(None)
            }
        }
    }

    fn emit(
        &mut self,
        mapping: &ComponentMapping,
        handle: &Handle,
    ) -> Result<RecordId, TranslationError> {
        let model = self.model;
        let name = model.name(handle);
        if mapping.class_name == hvac::NODE {
            let name = name.ok_or_else(|| unnamed(model, handle))?;
            return Ok(self.workspace.add_node(name));
        }

        let mut record = IdfRecord::new(mapping.idf_type, name)?;
        if record.schema().has_name && name.is_none() {
            return Err(unnamed(model, handle));
        }

        let mut children = Children::default();
        for rule in mapping.rules {
            self.apply_rule(handle, rule, &mut record, &mut children)?;
        }
        if mapping.copy_extensible {
            for value in model.extensible(handle) {
                let value = match value {
                    FieldValue::Real(v) => IdfValue::Real(*v),
                    FieldValue::Text(s) => IdfValue::Text(s.clone()),
                    _ => {
                        return Err(TranslationError::Invalid {
                            object: record.brief_description(),
                            message: "unexpected extensible value".to_string(),
                        });
                    }
                };
                record.push_extensible(value)?;
            }
        }

        if let Some(kind) = mapping.stitch {
            let base = name.unwrap_or_default();
            let ctx = StitchContext {
                model,
                source: handle,
                children: &children,
                workspace: &mut self.workspace,
                log: &mut self.log,
            };
            match kind {
                Stitch::EnergyRecoveryVentilator => {
                    stitch::stitch_energy_recovery_ventilator(ctx, &mut record, base)?
                }
                Stitch::UnitarySystem => stitch::stitch_unitary_system(ctx, &mut record, base)?,
            }
        }

        Ok(self.workspace.insert(record))
    }

    fn apply_rule(
        &mut self,
        handle: &Handle,
        rule: &FieldRule,
        record: &mut IdfRecord,
        children: &mut Children,
    ) -> Result<(), TranslationError> {
        let model = self.model;
        let value = model.get_field(handle, rule.source);
        let missing = || TranslationError::MissingRequired {
            object: record.brief_description(),
            field: rule.source.to_string(),
        };

        match rule.kind {
            FieldKind::Scalar | FieldKind::Text | FieldKind::Autosizable => {
                let Some(value) = value else {
                    if rule.policy == FieldPolicy::Required {
                        return Err(missing());
                    }
                    return Ok(());
                };
                let converted =
                    scalar_value(value, rule.kind).ok_or_else(|| TranslationError::Invalid {
                        object: record.brief_description(),
                        message: format!("{} has an unexpected value", rule.source),
                    })?;
                record.set(rule.target, converted)?;
            }
            FieldKind::Schedule { .. } | FieldKind::Component { .. } | FieldKind::Node => {
                let target = value.and_then(FieldValue::as_target).cloned();
                let emitted = match &target {
                    Some(t) => self.translate(t)?,
                    None => None,
                };
                if let Some(id) = emitted {
                    let (child_name, child_type) = self.emitted(id)?;
                    record.set(rule.target, child_name)?;
                    if let FieldKind::Component {
                        type_field: Some(type_field),
                    } = rule.kind
                    {
                        record.set(type_field, child_type)?;
                    }
                    children.push(rule.source, id);
                    return Ok(());
                }
                match rule.policy {
                    FieldPolicy::Required => return Err(missing()),
                    FieldPolicy::AlwaysOn => {
                        if target.is_some() {
                            self.log.warn(
                                Some(&record.brief_description()),
                                format!("{} could not be translated, using always on", rule.source),
                            );
                        }
                        let schedule = self.always_on_schedule()?;
                        record.set(rule.target, schedule)?;
                    }
                    FieldPolicy::Optional => {
                        if target.is_some() {
                            self.log.warn(
                                Some(&record.brief_description()),
                                format!("{} could not be translated, left blank", rule.source),
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Name and type of an emitted record.
    fn emitted(&self, id: RecordId) -> Result<(String, &'static str), TranslationError> {
        let record = self
            .workspace
            .record(id)
            .ok_or(crate::error::IdfError::RecordNotFound(id.index()))?;
        let name = record.name().unwrap_or_default().to_string();
        Ok((name, record.type_name()))
    }

    /// Name of the constant always-on schedule, emitted on first use.
    fn always_on_schedule(&mut self) -> Result<String, TranslationError> {
        if let Some(name) = &self.always_on {
            return Ok(name.clone());
        }

        let existing = self
            .workspace
            .find(idf::SCHEDULE_TYPE_LIMITS, "OnOff")
            .filter(|id| self.workspace.record(*id).is_some_and(is_on_off_limits));
        let limits = match existing {
            Some(id) => self.emitted(id)?.0,
            None => {
                let mut limits = IdfRecord::new(idf::SCHEDULE_TYPE_LIMITS, Some("OnOff"))?;
                limits.set("Lower Limit Value", 0.0)?;
                limits.set("Upper Limit Value", 1.0)?;
                limits.set("Numeric Type", "Discrete")?;
                limits.set("Unit Type", "Availability")?;
                let id = self.workspace.insert(limits);
                self.emitted(id)?.0
            }
        };

        let mut schedule =
            IdfRecord::new(idf::SCHEDULE_CONSTANT, Some(&self.config.always_on_schedule_name))?;
        schedule.set("Schedule Type Limits Name", limits)?;
        schedule.set("Hourly Value", 1.0)?;
        let id = self.workspace.insert(schedule);
        let name = self.emitted(id)?.0;
        debug!("Added always-on schedule '{}'", name);
        self.always_on = Some(name.clone());
        Ok(name)
    }

    /// Runs the reference checker if configured.
    pub fn check_references(&mut self) -> Result<(), TranslationError> {
        if !self.config.check_references {
            return Ok(());
        }
        let issues = check_references(&self.workspace);
        for issue in &issues {
            self.log.error(None, issue.to_string());
        }
        if !issues.is_empty() && self.config.fail_on_dangling_references {
            return Err(TranslationError::DanglingReferences(issues.len()));
        }
        Ok(())
    }
}

/// Discrete limits bounded to `[0, 1]`.
fn is_on_off_limits(record: &IdfRecord) -> bool {
    record.get_real("Lower Limit Value") == Some(0.0)
        && record.get_real("Upper Limit Value") == Some(1.0)
        && record
            .get_text("Numeric Type")
            .is_some_and(|t| t.eq_ignore_ascii_case("Discrete"))
}

fn unnamed(model: &Model, handle: &Handle) -> TranslationError {
    TranslationError::Precondition {
        object: model.brief_description(handle),
        message: "object has no name".to_string(),
    }
}

fn scalar_value(value: &FieldValue, kind: FieldKind) -> Option<IdfValue> {
    match (value, kind) {
        (FieldValue::Real(v), FieldKind::Scalar | FieldKind::Autosizable) => Some(IdfValue::Real(*v)),
        (FieldValue::Autosize, FieldKind::Autosizable) => Some(IdfValue::from("Autosize")),
        (FieldValue::Text(s), FieldKind::Text) => Some(IdfValue::Text(s.clone())),
        _ => None,
    }
}

/// Translates models into workspaces and keeps the diagnostics of the last run.
#[derive(Debug, Clone, Default)]
pub struct ForwardTranslator {
    config: TranslatorConfig,
    log: Diagnostics,
}

impl ForwardTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            config,
            log: Diagnostics::new(),
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translates the whole model with a fresh pass.
    pub fn translate_model(&mut self, model: &Model) -> Result<Workspace, TranslationError> {
        let mut pass = TranslationPass::new(model, &self.config);
        let result = pass.translate_all().and_then(|()| pass.check_references());
        let (workspace, log) = pass.into_parts();
        self.log = log;
        result.map(|()| workspace)
    }

    /// Translates one object and whatever it references.
    pub fn translate_object(
        &mut self,
        model: &Model,
        handle: &Handle,
    ) -> Result<Workspace, TranslationError> {
        let mut pass = TranslationPass::new(model, &self.config);
        let result = pass
            .translate(handle)
            .and_then(|_| pass.check_references());
        let (workspace, log) = pass.into_parts();
        self.log = log;
        result.map(|()| workspace)
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
