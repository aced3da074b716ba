//! Schedules and schedule type limits on the model side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{FieldValue, Model, ObjectStore};
use crate::Handle;
use crate::error::ModelError;

pub const SCHEDULE_TYPE_LIMITS: &str = "ScheduleTypeLimits";
pub const SCHEDULE_CONSTANT: &str = "ScheduleConstant";
pub const SCHEDULE_COMPACT: &str = "ScheduleCompact";
pub const SCHEDULE_RULESET: &str = "ScheduleRuleset";

/// Field keys used by schedule and limits objects.
pub mod fields {
    pub const LOWER_LIMIT_VALUE: &str = "Lower Limit Value";
    pub const UPPER_LIMIT_VALUE: &str = "Upper Limit Value";
    pub const NUMERIC_TYPE: &str = "Numeric Type";
    pub const UNIT_TYPE: &str = "Unit Type";
    pub const SCHEDULE_TYPE_LIMITS: &str = "Schedule Type Limits";
    pub const VALUE: &str = "Value";
}

/// Unit type reported by limits whose unit type was never set.
pub const DEFAULT_UNIT_TYPE: &str = "Dimensionless";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericType {
    Continuous,
    Discrete,
}

impl NumericType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericType::Continuous => "Continuous",
            NumericType::Discrete => "Discrete",
        }
    }

    pub fn from_is_continuous(is_continuous: bool) -> Self {
        if is_continuous {
            NumericType::Continuous
        } else {
            NumericType::Discrete
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("continuous") {
            Ok(NumericType::Continuous)
        } else if s.eq_ignore_ascii_case("discrete") {
            Ok(NumericType::Discrete)
        } else {
            Err(format!("Unknown numeric type: {s}"))
        }
    }
}

/// Snapshot of a `ScheduleTypeLimits` object.
///
/// The compatibility predicate only looks at bounds and unit type, so this
/// can also be built by hand for objects that are not in any model.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTypeLimits {
    pub handle: Handle,
    pub name: String,
    pub lower_limit_value: Option<f64>,
    pub upper_limit_value: Option<f64>,
    pub numeric_type: Option<NumericType>,
    pub unit_type: Option<String>,
}

impl ScheduleTypeLimits {
    /// Detached limits with no bounds and no unit type.
    pub fn new(name: &str) -> Self {
        Self {
            handle: Handle::new(),
            name: name.to_string(),
            lower_limit_value: None,
            upper_limit_value: None,
            numeric_type: None,
            unit_type: None,
        }
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower_limit_value = lower;
        self.upper_limit_value = upper;
        self
    }

    pub fn with_unit_type(mut self, unit_type: &str) -> Self {
        self.unit_type = Some(unit_type.to_string());
        self
    }

    /// Unit type, `"Dimensionless"` when unset.
    pub fn unit_type(&self) -> &str {
        self.unit_type.as_deref().unwrap_or(DEFAULT_UNIT_TYPE)
    }

    /// Reads the limits object `handle` from `model`.
    pub fn load(model: &Model, handle: &Handle) -> Result<Self, ModelError> {
        let obj = model.require_class(handle, SCHEDULE_TYPE_LIMITS)?;
        let numeric_type = obj
            .field(fields::NUMERIC_TYPE)
            .and_then(FieldValue::as_text)
            .and_then(|s| s.parse().ok());
        Ok(Self {
            handle: handle.clone(),
            name: obj.name.clone().unwrap_or_default(),
            lower_limit_value: obj.field(fields::LOWER_LIMIT_VALUE).and_then(FieldValue::as_real),
            upper_limit_value: obj.field(fields::UPPER_LIMIT_VALUE).and_then(FieldValue::as_real),
            numeric_type,
            unit_type: obj
                .field(fields::UNIT_TYPE)
                .and_then(FieldValue::as_text)
                .map(str::to_string),
        })
    }

    /// True if every value lies within the bounds that are set.
    pub fn contains_all(&self, values: &[f64]) -> bool {
        values.iter().all(|v| {
            self.lower_limit_value.is_none_or(|lo| *v >= lo)
                && self.upper_limit_value.is_none_or(|hi| *v <= hi)
        })
    }
}

/// Concrete schedule variants stored in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Constant,
    Compact,
    Ruleset,
}

impl ScheduleKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            ScheduleKind::Constant => SCHEDULE_CONSTANT,
            ScheduleKind::Compact => SCHEDULE_COMPACT,
            ScheduleKind::Ruleset => SCHEDULE_RULESET,
        }
    }

    pub fn from_class_name(class_name: &str) -> Option<Self> {
        match class_name {
            SCHEDULE_CONSTANT => Some(ScheduleKind::Constant),
            SCHEDULE_COMPACT => Some(ScheduleKind::Compact),
            SCHEDULE_RULESET => Some(ScheduleKind::Ruleset),
            _ => None,
        }
    }
}

const COMPACT_DIRECTIVES: [&str; 4] = ["through:", "for:", "until:", "interpolate:"];

fn is_compact_directive(text: &str) -> bool {
    let lower = text.trim().to_ascii_lowercase();
    COMPACT_DIRECTIVES.iter().any(|d| lower.starts_with(d))
}

/// Parses one `Schedule:Compact` entry: numbers become `Real`, directives stay text.
pub fn compact_entry(text: &str) -> FieldValue {
    if !is_compact_directive(text) {
        if let Ok(v) = text.trim().parse::<f64>() {
            return FieldValue::Real(v);
        }
    }
    FieldValue::Text(text.trim().to_string())
}

impl Model {
    pub fn add_schedule_type_limits(&mut self, name: &str) -> Handle {
        self.add_object(SCHEDULE_TYPE_LIMITS, Some(name))
    }

    pub fn schedule_type_limits(&self, handle: &Handle) -> Result<ScheduleTypeLimits, ModelError> {
        ScheduleTypeLimits::load(self, handle)
    }

    /// All limits objects, sorted by name.
    pub fn all_schedule_type_limits(&self) -> Vec<ScheduleTypeLimits> {
        self.objects_by_class(SCHEDULE_TYPE_LIMITS)
            .iter()
            .filter_map(|o| ScheduleTypeLimits::load(self, &o.handle).ok())
            .collect()
    }

    pub fn add_schedule_constant(&mut self, name: &str, value: f64) -> Handle {
        let handle = self.add_object(SCHEDULE_CONSTANT, Some(name));
        if let Some(obj) = self.objects.get_mut(&handle) {
            obj.fields
                .insert(fields::VALUE.to_string(), FieldValue::Real(value));
        }
        handle
    }

    /// Adds a compact schedule from its textual entries, e.g.
    /// `["Through: 12/31", "For: AllDays", "Until: 24:00", "1"]`.
    pub fn add_schedule_compact(&mut self, name: &str, entries: &[&str]) -> Handle {
        let handle = self.add_object(SCHEDULE_COMPACT, Some(name));
        if let Some(obj) = self.objects.get_mut(&handle) {
            obj.extensible = entries.iter().map(|e| compact_entry(e)).collect();
        }
        handle
    }

    /// Adds a ruleset schedule whose default day carries `day_values`.
    pub fn add_schedule_ruleset(&mut self, name: &str, day_values: &[f64]) -> Handle {
        let handle = self.add_object(SCHEDULE_RULESET, Some(name));
        if let Some(obj) = self.objects.get_mut(&handle) {
            obj.extensible = day_values.iter().map(|v| FieldValue::Real(*v)).collect();
        }
        handle
    }

    pub fn schedule_kind(&self, handle: &Handle) -> Option<ScheduleKind> {
        self.class_name(handle).and_then(ScheduleKind::from_class_name)
    }

    pub fn is_schedule(&self, handle: &Handle) -> bool {
        self.schedule_kind(handle).is_some()
    }

    /// Every value the schedule can take.
    pub fn schedule_values(&self, schedule: &Handle) -> Result<Vec<f64>, ModelError> {
        let obj = self.require(schedule)?;
        let kind = ScheduleKind::from_class_name(&obj.class_name).ok_or_else(|| {
            ModelError::WrongClass {
                handle: schedule.clone(),
                expected: "Schedule".to_string(),
                actual: obj.class_name.clone(),
            }
        })?;
        let values = match kind {
            ScheduleKind::Constant => obj
                .field(fields::VALUE)
                .and_then(FieldValue::as_real)
                .into_iter()
                .collect(),
            ScheduleKind::Compact => obj
                .extensible
                .iter()
                .filter_map(|v| match v {
                    FieldValue::Real(x) => Some(*x),
                    FieldValue::Text(t) if !is_compact_directive(t) => t.trim().parse().ok(),
                    _ => None,
                })
                .collect(),
            ScheduleKind::Ruleset => obj
                .extensible
                .iter()
                .filter_map(FieldValue::as_real)
                .collect(),
        };
        Ok(values)
    }

    /// Limits currently attached to a schedule, if any.
    pub fn schedule_type_limits_of(&self, schedule: &Handle) -> Option<Handle> {
        self.get_target(schedule, fields::SCHEDULE_TYPE_LIMITS)
    }

    /// Detaches the limits of a schedule. The limits object itself is kept.
    pub fn reset_schedule_type_limits(&mut self, schedule: &Handle) -> Result<(), ModelError> {
        if !self.is_schedule(schedule) {
            self.require(schedule)?;
            return Err(ModelError::WrongClass {
                handle: schedule.clone(),
                expected: "Schedule".to_string(),
                actual: self.class_name(schedule).unwrap_or_default().to_string(),
            });
        }
        self.remove_field(schedule, fields::SCHEDULE_TYPE_LIMITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_type_defaults_to_dimensionless() -> anyhow::Result<()> {
        let mut model = Model::new();
        let h = model.add_schedule_type_limits("Fractional");
        let limits = model.schedule_type_limits(&h)?;
        assert_eq!(limits.unit_type(), "Dimensionless");
        assert_eq!(limits.lower_limit_value, None);
        Ok(())
    }

    #[test]
    fn test_load_limits_fields() -> anyhow::Result<()> {
        let mut model = Model::new();
        let h = model.add_schedule_type_limits("OnOff");
        model.set_field(&h, fields::LOWER_LIMIT_VALUE, 0.0.into())?;
        model.set_field(&h, fields::UPPER_LIMIT_VALUE, 1.0.into())?;
        model.set_field(&h, fields::NUMERIC_TYPE, "discrete".into())?;
        model.set_field(&h, fields::UNIT_TYPE, "Availability".into())?;
        let limits = model.schedule_type_limits(&h)?;
        assert_eq!(limits.name, "OnOff");
        assert_eq!(limits.lower_limit_value, Some(0.0));
        assert_eq!(limits.upper_limit_value, Some(1.0));
        assert_eq!(limits.numeric_type, Some(NumericType::Discrete));
        assert_eq!(limits.unit_type(), "Availability");
        Ok(())
    }

    #[test]
    fn test_compact_values_skip_directives() -> anyhow::Result<()> {
        let mut model = Model::new();
        let h = model.add_schedule_compact(
            "Occupancy",
            &["Through: 12/31", "For: Weekdays", "Until: 08:00", "0", "Until: 24:00", "0.75"],
        );
        assert_eq!(model.schedule_values(&h)?, vec![0.0, 0.75]);
        Ok(())
    }

    #[test]
    fn test_constant_values() -> anyhow::Result<()> {
        let mut model = Model::new();
        let h = model.add_schedule_constant("Always On", 1.0);
        assert_eq!(model.schedule_values(&h)?, vec![1.0]);
        assert_eq!(model.schedule_kind(&h), Some(ScheduleKind::Constant));
        Ok(())
    }

    #[test]
    fn test_schedule_values_rejects_non_schedule() {
        let mut model = Model::new();
        let h = model.add_schedule_type_limits("OnOff");
        assert!(matches!(
            model.schedule_values(&h),
            Err(ModelError::WrongClass { .. })
        ));
    }

    #[test]
    fn test_contains_all() {
        let limits = ScheduleTypeLimits::new("Fractional").with_bounds(Some(0.0), Some(1.0));
        assert!(limits.contains_all(&[0.0, 0.5, 1.0]));
        assert!(!limits.contains_all(&[1.5]));
        let open = ScheduleTypeLimits::new("Temperature");
        assert!(open.contains_all(&[-40.0, 100.0]));
    }

    #[test]
    fn test_reset_limits() -> anyhow::Result<()> {
        let mut model = Model::new();
        let limits = model.add_schedule_type_limits("OnOff");
        let sched = model.add_schedule_constant("On", 1.0);
        model.set_field(&sched, fields::SCHEDULE_TYPE_LIMITS, limits.clone().into())?;
        assert_eq!(model.schedule_type_limits_of(&sched), Some(limits.clone()));
        model.reset_schedule_type_limits(&sched)?;
        assert_eq!(model.schedule_type_limits_of(&sched), None);
        assert!(model.contains(&limits));
        Ok(())
    }
}
