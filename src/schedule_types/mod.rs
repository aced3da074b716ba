//! Schedule type catalog and registry.
//!
//! A [`ScheduleType`] states what a (class, schedule field) pair expects of the
//! schedules attached to it. The catalog holding them is plain configuration
//! data: the built-in table ships with the crate and other tables can be
//! loaded from JSON.

pub mod compat;
pub mod registry;
pub mod units;

pub use compat::{Stringency, is_compatible, is_compatible_with};
pub use registry::{
    LimitsResolution, check_or_assign_schedule_type_limits, get_compatible_schedule_type_limits,
    get_compatible_schedules, get_or_create_schedule_type_limits, is_compatible_for,
    set_limits_bounds, set_schedule, set_schedule_type_limits,
};
pub use units::{Unit, units_for};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../../data/schedule_types.json");

/// Requirement of a (class, schedule field) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleType {
    pub class_name: String,
    pub display_name: String,
    pub relationship_name: String,
    pub is_continuous: bool,
    pub unit_type: String,
    pub lower_limit_value: Option<f64>,
    pub upper_limit_value: Option<f64>,
}

impl ScheduleType {
    /// Canonical name of the limits object satisfying this requirement.
    ///
    /// Limits are shared by this name, so the mapping must stay exact:
    /// `"Availability"` is shown as `"OnOff"`, and bounds are compared to
    /// `0.0`/`1.0` without tolerance.
    pub fn default_name(&self) -> String {
        if self.unit_type.is_empty() {
            let unit_interval =
                self.lower_limit_value == Some(0.0) && self.upper_limit_value == Some(1.0);
            match (self.is_continuous, unit_interval) {
                (true, true) => "Fractional",
                (true, false) => "Dimensionless",
                (false, true) => "Binary",
                (false, false) => "Integer",
            }
            .to_string()
        } else if self.unit_type == "Availability" {
            "OnOff".to_string()
        } else {
            self.unit_type.clone()
        }
    }
}

/// Immutable table of schedule types, keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTypeCatalog {
    by_class: BTreeMap<String, Vec<ScheduleType>>,
}

impl ScheduleTypeCatalog {
    /// Catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Builds a catalog from a list of schedule types.
    ///
    /// Fails if a (class, display name) pair appears twice.
    pub fn from_schedule_types(types: Vec<ScheduleType>) -> Result<Self, CatalogError> {
        let mut by_class: BTreeMap<String, Vec<ScheduleType>> = BTreeMap::new();
        for st in types {
            let entry = by_class.entry(st.class_name.clone()).or_default();
            if entry.iter().any(|e| e.display_name == st.display_name) {
                return Err(CatalogError::Duplicate {
                    class_name: st.class_name,
                    display_name: st.display_name,
                });
            }
            entry.push(st);
        }
        debug!("Schedule type catalog with {} classes", by_class.len());
        Ok(Self { by_class })
    }

    /// Parses a JSON array of schedule types.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let types: Vec<ScheduleType> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_schedule_types(types)
    }

    pub fn len(&self) -> usize {
        self.by_class.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }

    /// Names of all classes with at least one schedule type, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        self.by_class.keys().map(String::as_str).collect()
    }

    /// Schedule types of a class in table order (empty for unknown classes).
    pub fn get_schedule_types_by_class_name(&self, class_name: &str) -> &[ScheduleType] {
        self.by_class
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_schedule_type(
        &self,
        class_name: &str,
        display_name: &str,
    ) -> Result<&ScheduleType, CatalogError> {
        self.get_schedule_types_by_class_name(class_name)
            .iter()
            .find(|st| st.display_name == display_name)
            .ok_or_else(|| CatalogError::NotFound {
                class_name: class_name.to_string(),
                display_name: display_name.to_string(),
            })
    }

    pub fn default_name(&self, schedule_type: &ScheduleType) -> String {
        schedule_type.default_name()
    }
}

/// Reads a catalog from a JSON file.
pub fn read_catalog(path: &Path) -> Result<ScheduleTypeCatalog> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    ScheduleTypeCatalog::from_json_str(&json)
        .with_context(|| format!("Failed to load catalog from: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(is_continuous: bool, unit_type: &str, lower: Option<f64>, upper: Option<f64>) -> ScheduleType {
        ScheduleType {
            class_name: "Test".to_string(),
            display_name: "Test".to_string(),
            relationship_name: "testSchedule".to_string(),
            is_continuous,
            unit_type: unit_type.to_string(),
            lower_limit_value: lower,
            upper_limit_value: upper,
        }
    }

    #[test]
    fn test_default_name_boundaries() {
        assert_eq!(st(true, "", Some(0.0), Some(1.0)).default_name(), "Fractional");
        assert_eq!(st(false, "", Some(0.0), Some(1.0)).default_name(), "Binary");
        assert_eq!(st(true, "", Some(0.0), Some(5.0)).default_name(), "Dimensionless");
        assert_eq!(st(false, "", Some(0.0), None).default_name(), "Integer");
        assert_eq!(st(true, "", None, None).default_name(), "Dimensionless");
    }

    #[test]
    fn test_default_name_availability_is_on_off() {
        assert_eq!(st(true, "Availability", None, None).default_name(), "OnOff");
        assert_eq!(st(false, "Availability", Some(0.0), Some(1.0)).default_name(), "OnOff");
        assert_eq!(st(true, "Temperature", None, None).default_name(), "Temperature");
    }

    #[test]
    fn test_default_name_exact_bounds() {
        assert_eq!(
            st(true, "", Some(0.0), Some(1.0 + f64::EPSILON)).default_name(),
            "Dimensionless"
        );
    }

    #[test]
    fn test_builtin_catalog_loads() -> anyhow::Result<()> {
        let catalog = ScheduleTypeCatalog::builtin()?;
        assert!(catalog.len() > 300);
        let fan = catalog.get_schedule_type("FanOnOff", "Availability")?;
        assert_eq!(fan.unit_type, "Availability");
        assert!(!fan.is_continuous);
        assert_eq!(fan.lower_limit_value, Some(0.0));
        assert_eq!(fan.upper_limit_value, Some(1.0));
        assert!(catalog.class_names().contains(&"ZoneHVACEnergyRecoveryVentilator"));
        Ok(())
    }

    #[test]
    fn test_lookup_miss_is_error() -> anyhow::Result<()> {
        let catalog = ScheduleTypeCatalog::builtin()?;
        let err = catalog.get_schedule_type("FanOnOff", "Brightness").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No 'Brightness' Schedule is registered for class FanOnOff."
        );
        assert!(catalog.get_schedule_types_by_class_name("Nope").is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        let json = r#"[
            {"class_name": "A", "display_name": "X", "relationship_name": "x", "is_continuous": true, "unit_type": "", "lower_limit_value": null, "upper_limit_value": null},
            {"class_name": "A", "display_name": "X", "relationship_name": "x", "is_continuous": true, "unit_type": "", "lower_limit_value": 0.0, "upper_limit_value": 1.0}
        ]"#;
        assert!(matches!(
            ScheduleTypeCatalog::from_json_str(json),
            Err(CatalogError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_read_catalog_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"class_name": "Lights", "display_name": "Lighting", "relationship_name": "schedule", "is_continuous": true, "unit_type": "", "lower_limit_value": 0.0, "upper_limit_value": 1.0}]"#,
        )?;
        let catalog = read_catalog(&path)?;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.class_names(), vec!["Lights"]);
        Ok(())
    }
}
