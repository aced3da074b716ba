//! Declarative field rules of every translated class.
//!
//! A [`ComponentMapping`] pairs a model class with an IDF object type and
//! lists how each model field lands in the record. The forward and reverse
//! translators interpret the same tables.

use crate::idf::schema as idf;
use crate::model::hvac::{self, fields as hf};
use crate::model::schedule::{self, fields as sf};

/// How a field value is carried across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain number.
    Scalar,
    Text,
    /// Number or `Autosize`.
    Autosizable,
    /// Reference to a schedule known to the catalog as `display_name` of the
    /// owning class.
    Schedule { display_name: &'static str },
    /// Reference to another component. When `type_field` is set, the IDF type
    /// of the emitted child is written there.
    Component { type_field: Option<&'static str> },
    /// Reference to a node.
    Node,
}

/// What happens when a field is unset or its target cannot be translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The parent record is not emitted.
    Required,
    /// The field stays blank.
    Optional,
    /// The field falls back to the always-on schedule.
    AlwaysOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Model field key.
    pub source: &'static str,
    /// IDF field name.
    pub target: &'static str,
    pub kind: FieldKind,
    pub policy: FieldPolicy,
}

/// Post-processing that splices a composite component into the node graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stitch {
    EnergyRecoveryVentilator,
    UnitarySystem,
}

#[derive(Debug)]
pub struct ComponentMapping {
    pub class_name: &'static str,
    pub idf_type: &'static str,
    /// Objects are translated in ascending priority.
    pub priority: u8,
    pub rules: &'static [FieldRule],
    /// Whether extensible values are copied one to one.
    pub copy_extensible: bool,
    pub stitch: Option<Stitch>,
}

use FieldKind::{Autosizable, Component, Node, Scalar, Text};
use FieldPolicy::{AlwaysOn, Optional, Required};

const fn rule(
    source: &'static str,
    target: &'static str,
    kind: FieldKind,
    policy: FieldPolicy,
) -> FieldRule {
    FieldRule {
        source,
        target,
        kind,
        policy,
    }
}

const fn optional(source: &'static str, target: &'static str, kind: FieldKind) -> FieldRule {
    rule(source, target, kind, Optional)
}

const AVAILABILITY_ALWAYS_ON: FieldRule = rule(
    hf::AVAILABILITY_SCHEDULE,
    "Availability Schedule Name",
    FieldKind::Schedule {
        display_name: "Availability",
    },
    AlwaysOn,
);

const LIMITS: FieldRule = optional(
    sf::SCHEDULE_TYPE_LIMITS,
    "Schedule Type Limits Name",
    Component { type_field: None },
);

const FAN_RULES: &[FieldRule] = &[
    AVAILABILITY_ALWAYS_ON,
    optional(hf::FAN_TOTAL_EFFICIENCY, "Fan Total Efficiency", Scalar),
    optional(hf::PRESSURE_RISE, "Pressure Rise", Scalar),
    optional(hf::MAXIMUM_FLOW_RATE, "Maximum Flow Rate", Autosizable),
    optional(hf::MOTOR_EFFICIENCY, "Motor Efficiency", Scalar),
    optional(
        hf::MOTOR_IN_AIRSTREAM_FRACTION,
        "Motor In Airstream Fraction",
        Scalar,
    ),
    optional(hf::INLET_NODE, "Air Inlet Node Name", Node),
    optional(hf::OUTLET_NODE, "Air Outlet Node Name", Node),
    optional(hf::END_USE_SUBCATEGORY, "End-Use Subcategory", Text),
];

const FAN_VARIABLE_VOLUME_RULES: &[FieldRule] = &[
    AVAILABILITY_ALWAYS_ON,
    optional(hf::FAN_TOTAL_EFFICIENCY, "Fan Total Efficiency", Scalar),
    optional(hf::PRESSURE_RISE, "Pressure Rise", Scalar),
    optional(hf::MAXIMUM_FLOW_RATE, "Maximum Flow Rate", Autosizable),
    optional(
        hf::FAN_POWER_MINIMUM_FLOW_RATE_INPUT_METHOD,
        "Fan Power Minimum Flow Rate Input Method",
        Text,
    ),
    optional(
        hf::FAN_POWER_MINIMUM_FLOW_FRACTION,
        "Fan Power Minimum Flow Fraction",
        Scalar,
    ),
    optional(hf::MOTOR_EFFICIENCY, "Motor Efficiency", Scalar),
    optional(
        hf::MOTOR_IN_AIRSTREAM_FRACTION,
        "Motor In Airstream Fraction",
        Scalar,
    ),
    optional(hf::INLET_NODE, "Air Inlet Node Name", Node),
    optional(hf::OUTLET_NODE, "Air Outlet Node Name", Node),
    optional(hf::END_USE_SUBCATEGORY, "End-Use Subcategory", Text),
];

const COIL_NODES: [FieldRule; 2] = [
    optional(hf::INLET_NODE, "Air Inlet Node Name", Node),
    optional(hf::OUTLET_NODE, "Air Outlet Node Name", Node),
];

static MAPPINGS: &[ComponentMapping] = &[
    ComponentMapping {
        class_name: schedule::SCHEDULE_TYPE_LIMITS,
        idf_type: idf::SCHEDULE_TYPE_LIMITS,
        priority: 0,
        rules: &[
            optional(sf::LOWER_LIMIT_VALUE, "Lower Limit Value", Scalar),
            optional(sf::UPPER_LIMIT_VALUE, "Upper Limit Value", Scalar),
            optional(sf::NUMERIC_TYPE, "Numeric Type", Text),
            optional(sf::UNIT_TYPE, "Unit Type", Text),
        ],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: schedule::SCHEDULE_CONSTANT,
        idf_type: idf::SCHEDULE_CONSTANT,
        priority: 1,
        rules: &[LIMITS, rule(sf::VALUE, "Hourly Value", Scalar, Required)],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: schedule::SCHEDULE_COMPACT,
        idf_type: idf::SCHEDULE_COMPACT,
        priority: 1,
        rules: &[LIMITS],
        copy_extensible: true,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::NODE,
        idf_type: idf::NODE,
        priority: 2,
        rules: &[],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::ERV_CONTROLLER,
        idf_type: idf::ERV_CONTROLLER,
        priority: 3,
        rules: &[
            optional(hf::TEMPERATURE_HIGH_LIMIT, "Temperature High Limit", Scalar),
            optional(hf::TEMPERATURE_LOW_LIMIT, "Temperature Low Limit", Scalar),
            optional(hf::ENTHALPY_HIGH_LIMIT, "Enthalpy High Limit", Scalar),
            optional(
                hf::EXHAUST_AIR_TEMPERATURE_LIMIT,
                "Exhaust Air Temperature Limit",
                Text,
            ),
            optional(
                hf::EXHAUST_AIR_ENTHALPY_LIMIT,
                "Exhaust Air Enthalpy Limit",
                Text,
            ),
            optional(
                hf::TIME_OF_DAY_ECONOMIZER_FLOW_CONTROL_SCHEDULE,
                "Time of Day Economizer Flow Control Schedule Name",
                FieldKind::Schedule {
                    display_name: "Time of Day Economizer Flow Control",
                },
            ),
            optional(
                hf::HIGH_HUMIDITY_CONTROL_FLAG,
                "High Humidity Control Flag",
                Text,
            ),
        ],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::FAN_ON_OFF,
        idf_type: idf::FAN_ON_OFF,
        priority: 4,
        rules: FAN_RULES,
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::FAN_CONSTANT_VOLUME,
        idf_type: idf::FAN_CONSTANT_VOLUME,
        priority: 4,
        rules: FAN_RULES,
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::FAN_VARIABLE_VOLUME,
        idf_type: idf::FAN_VARIABLE_VOLUME,
        priority: 4,
        rules: FAN_VARIABLE_VOLUME_RULES,
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::HEAT_EXCHANGER_AIR_TO_AIR,
        idf_type: idf::HEAT_EXCHANGER_AIR_TO_AIR,
        priority: 4,
        rules: &[
            AVAILABILITY_ALWAYS_ON,
            optional(
                hf::NOMINAL_SUPPLY_AIR_FLOW_RATE,
                "Nominal Supply Air Flow Rate",
                Autosizable,
            ),
            optional(
                hf::SENSIBLE_EFFECTIVENESS_100_HEATING,
                "Sensible Effectiveness at 100% Heating Air Flow",
                Scalar,
            ),
            optional(
                hf::LATENT_EFFECTIVENESS_100_HEATING,
                "Latent Effectiveness at 100% Heating Air Flow",
                Scalar,
            ),
            optional(
                hf::SENSIBLE_EFFECTIVENESS_100_COOLING,
                "Sensible Effectiveness at 100% Cooling Air Flow",
                Scalar,
            ),
            optional(
                hf::LATENT_EFFECTIVENESS_100_COOLING,
                "Latent Effectiveness at 100% Cooling Air Flow",
                Scalar,
            ),
            optional(hf::NOMINAL_ELECTRIC_POWER, "Nominal Electric Power", Scalar),
            optional(
                hf::SUPPLY_AIR_OUTLET_TEMPERATURE_CONTROL,
                "Supply Air Outlet Temperature Control",
                Text,
            ),
            optional(hf::HEAT_EXCHANGER_TYPE, "Heat Exchanger Type", Text),
            optional(hf::FROST_CONTROL_TYPE, "Frost Control Type", Text),
            optional(hf::THRESHOLD_TEMPERATURE, "Threshold Temperature", Scalar),
            optional(hf::ECONOMIZER_LOCKOUT, "Economizer Lockout", Text),
        ],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::COIL_COOLING_DX_SINGLE_SPEED,
        idf_type: idf::COIL_COOLING_DX_SINGLE_SPEED,
        priority: 4,
        rules: &[
            AVAILABILITY_ALWAYS_ON,
            optional(
                hf::GROSS_RATED_TOTAL_COOLING_CAPACITY,
                "Gross Rated Total Cooling Capacity",
                Autosizable,
            ),
            optional(
                hf::GROSS_RATED_SENSIBLE_HEAT_RATIO,
                "Gross Rated Sensible Heat Ratio",
                Autosizable,
            ),
            optional(hf::GROSS_RATED_COOLING_COP, "Gross Rated Cooling COP", Scalar),
            optional(hf::RATED_AIR_FLOW_RATE, "Rated Air Flow Rate", Autosizable),
            COIL_NODES[0],
            COIL_NODES[1],
        ],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::COIL_HEATING_ELECTRIC,
        idf_type: idf::COIL_HEATING_ELECTRIC,
        priority: 4,
        rules: &[
            AVAILABILITY_ALWAYS_ON,
            optional(hf::EFFICIENCY, "Efficiency", Scalar),
            optional(hf::NOMINAL_CAPACITY, "Nominal Capacity", Autosizable),
            COIL_NODES[0],
            COIL_NODES[1],
        ],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::COIL_HEATING_GAS,
        idf_type: idf::COIL_HEATING_FUEL,
        priority: 4,
        rules: &[
            AVAILABILITY_ALWAYS_ON,
            optional(hf::FUEL_TYPE, "Fuel Type", Text),
            optional(hf::EFFICIENCY, "Burner Efficiency", Scalar),
            optional(hf::NOMINAL_CAPACITY, "Nominal Capacity", Autosizable),
            COIL_NODES[0],
            COIL_NODES[1],
        ],
        copy_extensible: false,
        stitch: None,
    },
    ComponentMapping {
        class_name: hvac::ERV,
        idf_type: idf::ERV,
        priority: 5,
        rules: &[
            AVAILABILITY_ALWAYS_ON,
            rule(
                hf::HEAT_EXCHANGER,
                "Heat Exchanger Name",
                Component { type_field: None },
                Required,
            ),
            optional(hf::SUPPLY_AIR_FLOW_RATE, "Supply Air Flow Rate", Autosizable),
            optional(hf::EXHAUST_AIR_FLOW_RATE, "Exhaust Air Flow Rate", Autosizable),
            rule(
                hf::SUPPLY_AIR_FAN,
                "Supply Air Fan Name",
                Component { type_field: None },
                Required,
            ),
            rule(
                hf::EXHAUST_AIR_FAN,
                "Exhaust Air Fan Name",
                Component { type_field: None },
                Required,
            ),
            optional(
                hf::CONTROLLER,
                "Controller Name",
                Component { type_field: None },
            ),
            optional(
                hf::VENTILATION_RATE_PER_UNIT_FLOOR_AREA,
                "Ventilation Rate per Unit Floor Area",
                Scalar,
            ),
            optional(
                hf::VENTILATION_RATE_PER_OCCUPANT,
                "Ventilation Rate per Occupant",
                Scalar,
            ),
        ],
        copy_extensible: false,
        stitch: Some(Stitch::EnergyRecoveryVentilator),
    },
    ComponentMapping {
        class_name: hvac::UNITARY_SYSTEM,
        idf_type: idf::UNITARY_SYSTEM,
        priority: 5,
        rules: &[
            optional(hf::CONTROL_TYPE, "Control Type", Text),
            optional(
                hf::DEHUMIDIFICATION_CONTROL_TYPE,
                "Dehumidification Control Type",
                Text,
            ),
            optional(
                hf::AVAILABILITY_SCHEDULE,
                "Availability Schedule Name",
                FieldKind::Schedule {
                    display_name: "Availability",
                },
            ),
            optional(hf::INLET_NODE, "Air Inlet Node Name", Node),
            optional(hf::OUTLET_NODE, "Air Outlet Node Name", Node),
            optional(
                hf::SUPPLY_FAN,
                "Supply Fan Name",
                Component {
                    type_field: Some("Supply Fan Object Type"),
                },
            ),
            optional(hf::FAN_PLACEMENT, "Fan Placement", Text),
            optional(
                hf::SUPPLY_AIR_FAN_OPERATING_MODE_SCHEDULE,
                "Supply Air Fan Operating Mode Schedule Name",
                FieldKind::Schedule {
                    display_name: "Supply Air Fan Operating Mode",
                },
            ),
            optional(
                hf::HEATING_COIL,
                "Heating Coil Name",
                Component {
                    type_field: Some("Heating Coil Object Type"),
                },
            ),
            optional(
                hf::COOLING_COIL,
                "Cooling Coil Name",
                Component {
                    type_field: Some("Cooling Coil Object Type"),
                },
            ),
            optional(
                hf::SUPPLEMENTAL_HEATING_COIL,
                "Supplemental Heating Coil Name",
                Component {
                    type_field: Some("Supplemental Heating Coil Object Type"),
                },
            ),
            optional(
                hf::COOLING_SUPPLY_AIR_FLOW_RATE,
                "Cooling Supply Air Flow Rate",
                Autosizable,
            ),
            optional(
                hf::HEATING_SUPPLY_AIR_FLOW_RATE,
                "Heating Supply Air Flow Rate",
                Autosizable,
            ),
            optional(
                hf::MAXIMUM_SUPPLY_AIR_TEMPERATURE,
                "Maximum Supply Air Temperature",
                Autosizable,
            ),
        ],
        copy_extensible: false,
        stitch: Some(Stitch::UnitarySystem),
    },
];

/// Every supported mapping.
pub fn mappings() -> &'static [ComponentMapping] {
    MAPPINGS
}

pub fn mapping_for_class(class_name: &str) -> Option<&'static ComponentMapping> {
    MAPPINGS.iter().find(|m| m.class_name == class_name)
}

/// Mapping of an IDF type (case-insensitive).
pub fn mapping_for_idf_type(idf_type: &str) -> Option<&'static ComponentMapping> {
    MAPPINGS
        .iter()
        .find(|m| m.idf_type.eq_ignore_ascii_case(idf_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idf::schema_for;
    use crate::schedule_types::ScheduleTypeCatalog;

    #[test]
    fn test_every_target_field_exists_in_schema() {
        for mapping in mappings() {
            let Some(schema) = schema_for(mapping.idf_type) else {
                panic!("no schema for {}", mapping.idf_type);
            };
            for rule in mapping.rules {
                assert!(
                    schema.field_index(rule.target).is_some(),
                    "{}: {}",
                    mapping.idf_type,
                    rule.target
                );
                if let FieldKind::Component {
                    type_field: Some(type_field),
                } = rule.kind
                {
                    assert!(schema.field_index(type_field).is_some(), "{type_field}");
                }
            }
            assert_eq!(mapping.copy_extensible, schema.extensible.is_some());
        }
    }

    #[test]
    fn test_schedule_rules_are_in_catalog() -> anyhow::Result<()> {
        let catalog = ScheduleTypeCatalog::builtin()?;
        for mapping in mappings() {
            for rule in mapping.rules {
                if let FieldKind::Schedule { display_name } = rule.kind {
                    catalog.get_schedule_type(mapping.class_name, display_name)?;
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_lookup_both_directions() {
        let m = mapping_for_class(hvac::COIL_HEATING_GAS);
        assert_eq!(m.map(|m| m.idf_type), Some(idf::COIL_HEATING_FUEL));
        let m = mapping_for_idf_type("coil:heating:fuel");
        assert_eq!(m.map(|m| m.class_name), Some(hvac::COIL_HEATING_GAS));
        assert!(mapping_for_class(schedule::SCHEDULE_RULESET).is_none());
    }
}
