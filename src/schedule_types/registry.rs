//! Reconciles schedule type limits across a model.
//!
//! Limits objects are shared by name: every requirement derives a default
//! name and reuses the first limits object carrying it that strictly fits,
//! creating one only when none does. Creating is visible in the returned
//! [`LimitsResolution`].

use tracing::{debug, trace, warn};

use super::compat::{Stringency, is_compatible, is_compatible_with};
use super::{ScheduleType, ScheduleTypeCatalog};
use crate::Handle;
use crate::error::{CatalogError, ModelError};
use crate::model::schedule::{NumericType, SCHEDULE_TYPE_LIMITS, ScheduleTypeLimits, fields};
use crate::model::{FieldValue, Model, ObjectStore, ScheduleUsage};

/// Outcome of [`get_or_create_schedule_type_limits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitsResolution {
    /// An existing limits object was reused.
    Found(Handle),
    /// A new limits object was added to the model.
    Created(Handle),
}

impl LimitsResolution {
    pub fn handle(&self) -> &Handle {
        match self {
            LimitsResolution::Found(h) | LimitsResolution::Created(h) => h,
        }
    }

    pub fn into_handle(self) -> Handle {
        match self {
            LimitsResolution::Found(h) | LimitsResolution::Created(h) => h,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, LimitsResolution::Created(_))
    }
}

/// Finds a limits object satisfying `schedule_type` or adds a new one.
///
/// Only limits named [`ScheduleType::default_name`] (or a numbered variant of
/// it, e.g. `"Temperature 1"`) are considered, and only if they leave open
/// every bound the requirement leaves open.
pub fn get_or_create_schedule_type_limits(
    model: &mut Model,
    schedule_type: &ScheduleType,
) -> Result<LimitsResolution, ModelError> {
    let default_name = schedule_type.default_name();

    let view: &Model = model;
    let found = view
        .objects_by_class(SCHEDULE_TYPE_LIMITS)
        .iter()
        .filter(|o| o.name.as_deref().is_some_and(|n| is_name_variant(n, &default_name)))
        .filter_map(|o| ScheduleTypeLimits::load(view, &o.handle).ok())
        .find(|candidate| is_compatible_with(schedule_type, candidate, Stringency::Strict))
        .map(|candidate| candidate.handle);
    if let Some(handle) = found {
        trace!("Reusing ScheduleTypeLimits '{}'", default_name);
        return Ok(LimitsResolution::Found(handle));
    }

    let handle = model.add_schedule_type_limits(&default_name);
    let mut values = Vec::new();
    if let Some(lower) = schedule_type.lower_limit_value {
        values.push((fields::LOWER_LIMIT_VALUE, FieldValue::Real(lower)));
    }
    if let Some(upper) = schedule_type.upper_limit_value {
        values.push((fields::UPPER_LIMIT_VALUE, FieldValue::Real(upper)));
    }
    values.push((
        fields::NUMERIC_TYPE,
        NumericType::from_is_continuous(schedule_type.is_continuous)
            .as_str()
            .into(),
    ));
    if !schedule_type.unit_type.is_empty() {
        values.push((fields::UNIT_TYPE, schedule_type.unit_type.as_str().into()));
    }
    for (field, value) in values {
        model.set_field(&handle, field, value)?;
    }
    debug!(
        "Created ScheduleTypeLimits '{}' for {} '{}'",
        model.name(&handle).unwrap_or_default(),
        schedule_type.class_name,
        schedule_type.display_name
    );
    Ok(LimitsResolution::Created(handle))
}

/// `name` is `base` or `base` followed by a uniquifying counter.
fn is_name_variant(name: &str, base: &str) -> bool {
    match name.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(' ')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

/// Attaches `limits` to `schedule`.
///
/// Returns `Ok(false)` without changing anything if a value of the schedule
/// lies outside the limits or if the limits are incompatible with a field the
/// schedule is already used in.
pub fn set_schedule_type_limits(
    model: &mut Model,
    catalog: &ScheduleTypeCatalog,
    schedule: &Handle,
    limits: &Handle,
) -> Result<bool, ModelError> {
    let candidate = ScheduleTypeLimits::load(model, limits)?;
    if !accepts(model, catalog, schedule, &candidate)? {
        return Ok(false);
    }
    model.set_field(schedule, fields::SCHEDULE_TYPE_LIMITS, limits.clone().into())?;
    Ok(true)
}

/// Whether `schedule` could carry `candidate`: values within bounds and every
/// live usage compatible.
fn accepts(
    model: &Model,
    catalog: &ScheduleTypeCatalog,
    schedule: &Handle,
    candidate: &ScheduleTypeLimits,
) -> Result<bool, ModelError> {
    let values = model.schedule_values(schedule)?;
    if !candidate.contains_all(&values) {
        debug!(
            "{}: values outside of ScheduleTypeLimits '{}'",
            model.brief_description(schedule),
            candidate.name
        );
        return Ok(false);
    }
    for usage in model.schedule_usages_of(schedule) {
        let st = catalog.get_schedule_type(&usage.class_name, &usage.display_name)?;
        if !is_compatible(st, candidate) {
            debug!(
                "{}: ScheduleTypeLimits '{}' incompatible with {} '{}'",
                model.brief_description(schedule),
                candidate.name,
                usage.class_name,
                usage.display_name
            );
            return Ok(false);
        }
    }
    Ok(true)
}

/// Checks that `schedule` may be used in the `display_name` schedule field of
/// `class_name`, assigning limits to it if it has none.
///
/// A catalog miss is an error. An incompatible schedule is `Ok(false)`.
pub fn check_or_assign_schedule_type_limits(
    model: &mut Model,
    catalog: &ScheduleTypeCatalog,
    class_name: &str,
    display_name: &str,
    schedule: &Handle,
) -> Result<bool, ModelError> {
    let schedule_type = catalog.get_schedule_type(class_name, display_name)?;

    if let Some(existing) = model.schedule_type_limits_of(schedule) {
        let limits = ScheduleTypeLimits::load(model, &existing)?;
        return Ok(is_compatible(schedule_type, &limits));
    }

    let resolution = get_or_create_schedule_type_limits(model, schedule_type)?;
    let attached = set_schedule_type_limits(model, catalog, schedule, resolution.handle());
    if !matches!(attached, Ok(true)) && model.direct_use_count(resolution.handle()) == 0 {
        let removed = model.remove(resolution.handle())?;
        debug!("Removed unused {}", removed.brief_description());
    }
    attached
}

/// Assigns `schedule` to the `field` of `owner`, which the catalog knows as
/// `display_name`.
///
/// The assignment only happens if the schedule passes
/// [`check_or_assign_schedule_type_limits`]; the usage is then recorded so
/// later limit changes can be validated against it.
pub fn set_schedule(
    model: &mut Model,
    catalog: &ScheduleTypeCatalog,
    owner: &Handle,
    field: &str,
    display_name: &str,
    schedule: &Handle,
) -> Result<bool, ModelError> {
    let class_name = model.require(owner)?.class_name.clone();
    if !model.is_schedule(schedule) {
        return Err(ModelError::WrongClass {
            handle: schedule.clone(),
            expected: "Schedule".to_string(),
            actual: model.class_name(schedule).unwrap_or_default().to_string(),
        });
    }
    if !check_or_assign_schedule_type_limits(model, catalog, &class_name, display_name, schedule)? {
        warn!(
            "{}: {} is not compatible with the '{}' schedule",
            model.brief_description(owner),
            model.brief_description(schedule),
            display_name
        );
        return Ok(false);
    }
    model.set_field(owner, field, schedule.clone().into())?;
    model.record_schedule_usage(ScheduleUsage {
        owner: owner.clone(),
        field: field.to_string(),
        class_name,
        display_name: display_name.to_string(),
    });
    Ok(true)
}

/// Lenient compatibility of a candidate with a catalog entry.
pub fn is_compatible_for(
    catalog: &ScheduleTypeCatalog,
    class_name: &str,
    display_name: &str,
    candidate: &ScheduleTypeLimits,
) -> Result<bool, CatalogError> {
    let schedule_type = catalog.get_schedule_type(class_name, display_name)?;
    Ok(is_compatible(schedule_type, candidate))
}

/// Limits in the model that strictly fit the catalog entry.
///
/// Strict matching keeps e.g. a `[0.5, 0.7]` limits object out of the list
/// for a field that accepts any number.
pub fn get_compatible_schedule_type_limits(
    model: &Model,
    catalog: &ScheduleTypeCatalog,
    class_name: &str,
    display_name: &str,
) -> Result<Vec<ScheduleTypeLimits>, CatalogError> {
    let schedule_type = catalog.get_schedule_type(class_name, display_name)?;
    Ok(model
        .all_schedule_type_limits()
        .into_iter()
        .filter(|l| is_compatible_with(schedule_type, l, Stringency::Strict))
        .collect())
}

/// Schedules usable in the catalog entry's field. Schedules without limits are
/// always included.
pub fn get_compatible_schedules(
    model: &Model,
    catalog: &ScheduleTypeCatalog,
    class_name: &str,
    display_name: &str,
) -> Result<Vec<Handle>, CatalogError> {
    let ok: Vec<Handle> =
        get_compatible_schedule_type_limits(model, catalog, class_name, display_name)?
            .into_iter()
            .map(|l| l.handle)
            .collect();
    Ok(model
        .objects()
        .filter(|o| model.is_schedule(&o.handle))
        .filter(|o| match model.schedule_type_limits_of(&o.handle) {
            Some(limits) => ok.contains(&limits),
            None => true,
        })
        .map(|o| o.handle.clone())
        .collect())
}

/// Changes the bounds of an existing limits object.
///
/// Every schedule attached to the limits is re-checked against the new bounds
/// (values and usages). If any would break, nothing is changed and `Ok(false)`
/// is returned.
pub fn set_limits_bounds(
    model: &mut Model,
    catalog: &ScheduleTypeCatalog,
    limits: &Handle,
    lower: Option<f64>,
    upper: Option<f64>,
) -> Result<bool, ModelError> {
    let candidate = ScheduleTypeLimits::load(model, limits)?.with_bounds(lower, upper);
    let schedules: Vec<Handle> = model
        .sources_of(limits)
        .iter()
        .filter(|o| model.schedule_type_limits_of(&o.handle).as_ref() == Some(limits))
        .map(|o| o.handle.clone())
        .collect();
    for schedule in &schedules {
        if !accepts(model, catalog, schedule, &candidate)? {
            warn!(
                "ScheduleTypeLimits '{}': new bounds rejected by {}",
                candidate.name,
                model.brief_description(schedule)
            );
            return Ok(false);
        }
    }
    for (field, value) in [
        (fields::LOWER_LIMIT_VALUE, lower),
        (fields::UPPER_LIMIT_VALUE, upper),
    ] {
        match value {
            Some(v) => model.set_field(limits, field, FieldValue::Real(v))?,
            None => model.remove_field(limits, field)?,
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::hvac;

    fn catalog() -> ScheduleTypeCatalog {
        match ScheduleTypeCatalog::builtin() {
            Ok(c) => c,
            Err(e) => panic!("builtin catalog: {e}"),
        }
    }

    #[test]
    fn test_name_variants() {
        assert!(is_name_variant("OnOff", "OnOff"));
        assert!(is_name_variant("OnOff 12", "OnOff"));
        assert!(!is_name_variant("OnOff 1a", "OnOff"));
        assert!(!is_name_variant("OnOff ", "OnOff"));
        assert!(!is_name_variant("OnOffice", "OnOff"));
    }

    #[test]
    fn test_sharing_convergence() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let t1 = catalog.get_schedule_type("FanOnOff", "Availability")?;
        let t2 = catalog.get_schedule_type("CoilHeatingElectric", "Availability")?;
        let r1 = get_or_create_schedule_type_limits(&mut model, t1)?;
        let r2 = get_or_create_schedule_type_limits(&mut model, t2)?;
        assert!(r1.was_created());
        assert_eq!(r2, LimitsResolution::Found(r1.handle().clone()));
        let limits = model.schedule_type_limits(r1.handle())?;
        assert_eq!(limits.name, "OnOff");
        assert_eq!(limits.numeric_type, Some(NumericType::Discrete));
        assert_eq!(model.objects_by_class(SCHEDULE_TYPE_LIMITS).len(), 1);
        Ok(())
    }

    #[test]
    fn test_created_limits_leave_absent_bounds_unset() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let st = catalog.get_schedule_type("ThermostatSetpointDualSetpoint", "Heating Setpoint Temperature")?;
        let r = get_or_create_schedule_type_limits(&mut model, st)?;
        let limits = model.schedule_type_limits(r.handle())?;
        assert_eq!(limits.name, "Temperature");
        assert_eq!(limits.lower_limit_value, None);
        assert_eq!(limits.upper_limit_value, None);
        assert_eq!(limits.numeric_type, Some(NumericType::Continuous));
        Ok(())
    }

    #[test]
    fn test_incompatible_candidate_not_reused() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let wrong = model.add_schedule_type_limits("OnOff");
        model.set_field(&wrong, fields::UNIT_TYPE, "Temperature".into())?;
        let st = catalog.get_schedule_type("FanOnOff", "Availability")?;
        let r = get_or_create_schedule_type_limits(&mut model, st)?;
        assert!(r.was_created());
        assert_ne!(r.handle(), &wrong);
        assert_eq!(model.name(r.handle()), Some("OnOff 1"));
        Ok(())
    }

    #[test]
    fn test_check_or_assign_attaches() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let sched = model.add_schedule_constant("Always On", 1.0);
        assert!(check_or_assign_schedule_type_limits(
            &mut model, &catalog, "FanOnOff", "Availability", &sched
        )?);
        let limits = model
            .schedule_type_limits_of(&sched)
            .ok_or_else(|| anyhow::anyhow!("no limits"))?;
        assert_eq!(model.name(&limits), Some("OnOff"));
        Ok(())
    }

    #[test]
    fn test_check_or_assign_existing_incompatible() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let temp = model.add_schedule_type_limits("Temperature");
        model.set_field(&temp, fields::UNIT_TYPE, "Temperature".into())?;
        let sched = model.add_schedule_constant("Setpoint", 21.0);
        assert!(set_schedule_type_limits(&mut model, &catalog, &sched, &temp)?);
        let before = model.len();
        assert!(!check_or_assign_schedule_type_limits(
            &mut model, &catalog, "FanOnOff", "Availability", &sched
        )?);
        assert_eq!(model.len(), before);
        assert_eq!(model.schedule_type_limits_of(&sched), Some(temp));
        Ok(())
    }

    #[test]
    fn test_failed_attach_removes_created_limits() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let sched = model.add_schedule_constant("Too High", 5.0);
        assert!(!check_or_assign_schedule_type_limits(
            &mut model, &catalog, "FanOnOff", "Availability", &sched
        )?);
        assert!(model.objects_by_class(SCHEDULE_TYPE_LIMITS).is_empty());
        assert_eq!(model.schedule_type_limits_of(&sched), None);
        Ok(())
    }

    #[test]
    fn test_failed_attach_removes_unused_found_limits() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let on_off = model.add_schedule_type_limits("OnOff");
        model.set_field(&on_off, fields::LOWER_LIMIT_VALUE, 0.0.into())?;
        model.set_field(&on_off, fields::UPPER_LIMIT_VALUE, 1.0.into())?;
        model.set_field(&on_off, fields::NUMERIC_TYPE, "Discrete".into())?;
        model.set_field(&on_off, fields::UNIT_TYPE, "Availability".into())?;
        let sched = model.add_schedule_constant("Five", 5.0);

        assert!(!check_or_assign_schedule_type_limits(
            &mut model, &catalog, "FanOnOff", "Availability", &sched
        )?);
        assert!(!model.contains(&on_off));
        assert!(model.objects_by_class(SCHEDULE_TYPE_LIMITS).is_empty());
        Ok(())
    }

    #[test]
    fn test_open_requirement_skips_bounded_limits() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let bounded = model.add_schedule_type_limits("Temperature");
        model.set_field(&bounded, fields::UNIT_TYPE, "Temperature".into())?;
        model.set_field(&bounded, fields::LOWER_LIMIT_VALUE, (-60.0).into())?;
        model.set_field(&bounded, fields::UPPER_LIMIT_VALUE, 200.0.into())?;

        let st = catalog.get_schedule_type("ThermostatSetpointDualSetpoint", "Heating Setpoint Temperature")?;
        let r = get_or_create_schedule_type_limits(&mut model, st)?;
        assert!(r.was_created());
        assert_ne!(r.handle(), &bounded);
        assert_eq!(model.name(r.handle()), Some("Temperature 1"));

        // The unbounded object is found on the next request
        let again = get_or_create_schedule_type_limits(&mut model, st)?;
        assert_eq!(again, LimitsResolution::Found(r.handle().clone()));
        Ok(())
    }

    #[test]
    fn test_catalog_miss_propagates() {
        let catalog = catalog();
        let mut model = Model::new();
        let sched = model.add_schedule_constant("s", 1.0);
        let err = check_or_assign_schedule_type_limits(&mut model, &catalog, "FanOnOff", "Nope", &sched)
            .unwrap_err();
        assert!(matches!(err, ModelError::Catalog(CatalogError::NotFound { .. })));
    }

    #[test]
    fn test_set_schedule_records_usage() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let fan = model.add_fan_on_off("Fan");
        let sched = model.add_schedule_constant("On", 1.0);
        assert!(set_schedule(
            &mut model,
            &catalog,
            &fan,
            hvac::fields::AVAILABILITY_SCHEDULE,
            "Availability",
            &sched
        )?);
        assert_eq!(model.get_target(&fan, hvac::fields::AVAILABILITY_SCHEDULE), Some(sched.clone()));
        assert_eq!(model.schedule_usages_of(&sched).len(), 1);
        Ok(())
    }

    #[test]
    fn test_set_schedule_rejects_incompatible() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let fan = model.add_fan_on_off("Fan");
        let sched = model.add_schedule_constant("Setpoint", 21.0);
        assert!(!set_schedule(
            &mut model,
            &catalog,
            &fan,
            hvac::fields::AVAILABILITY_SCHEDULE,
            "Availability",
            &sched
        )?);
        assert_eq!(model.get_target(&fan, hvac::fields::AVAILABILITY_SCHEDULE), None);
        Ok(())
    }

    #[test]
    fn test_attach_checks_existing_usages() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let fan = model.add_fan_on_off("Fan");
        let sched = model.add_schedule_constant("On", 1.0);
        set_schedule(&mut model, &catalog, &fan, hvac::fields::AVAILABILITY_SCHEDULE, "Availability", &sched)?;
        let temp = model.add_schedule_type_limits("Temperature");
        model.set_field(&temp, fields::UNIT_TYPE, "Temperature".into())?;
        assert!(!set_schedule_type_limits(&mut model, &catalog, &sched, &temp)?);
        Ok(())
    }

    #[test]
    fn test_compatible_lists() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let on_off = model.add_schedule_type_limits("OnOff");
        model.set_field(&on_off, fields::LOWER_LIMIT_VALUE, 0.0.into())?;
        model.set_field(&on_off, fields::UPPER_LIMIT_VALUE, 1.0.into())?;
        model.set_field(&on_off, fields::UNIT_TYPE, "Availability".into())?;
        let temp = model.add_schedule_type_limits("Temperature");
        model.set_field(&temp, fields::UNIT_TYPE, "Temperature".into())?;

        let typed = model.add_schedule_constant("Typed", 1.0);
        set_schedule_type_limits(&mut model, &catalog, &typed, &on_off)?;
        let hot = model.add_schedule_constant("Hot", 30.0);
        set_schedule_type_limits(&mut model, &catalog, &hot, &temp)?;
        let untyped = model.add_schedule_constant("Untyped", 7.0);

        let limits = get_compatible_schedule_type_limits(&model, &catalog, "FanOnOff", "Availability")?;
        assert_eq!(limits.len(), 1);
        assert_eq!(limits[0].handle, on_off);

        let schedules = get_compatible_schedules(&model, &catalog, "FanOnOff", "Availability")?;
        assert_eq!(schedules, vec![typed, untyped]);
        Ok(())
    }

    #[test]
    fn test_set_limits_bounds_rolls_back() -> anyhow::Result<()> {
        let catalog = catalog();
        let mut model = Model::new();
        let lights = model.add_object("Lights", Some("Lights"));
        let sched = model.add_schedule_constant("Half", 0.5);
        assert!(set_schedule(&mut model, &catalog, &lights, "Schedule", "Lighting", &sched)?);
        let limits = model
            .schedule_type_limits_of(&sched)
            .ok_or_else(|| anyhow::anyhow!("no limits"))?;
        assert_eq!(model.name(&limits), Some("Fractional"));

        // Widening past the lighting requirement breaks the usage
        assert!(!set_limits_bounds(&mut model, &catalog, &limits, Some(0.0), Some(2.0))?);
        assert_eq!(model.schedule_type_limits(&limits)?.upper_limit_value, Some(1.0));

        // Excluding the schedule value breaks the schedule
        assert!(!set_limits_bounds(&mut model, &catalog, &limits, Some(0.6), Some(1.0))?);

        assert!(set_limits_bounds(&mut model, &catalog, &limits, Some(0.1), Some(0.9))?);
        let updated = model.schedule_type_limits(&limits)?;
        assert_eq!(updated.lower_limit_value, Some(0.1));
        assert_eq!(updated.upper_limit_value, Some(0.9));
        Ok(())
    }
}
