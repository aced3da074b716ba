//! Field layouts of the supported IDF object types.
//!
//! Only the fields the translators read or write are listed. The name field,
//! when present, is not part of `fields`: it is stored on the record itself.

/// Kind of value an IDF field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdfFieldKind {
    Alpha,
    /// Numeric; `Autosize` is accepted as text.
    Real,
    /// Name of a record of one of the listed types.
    ObjectRef(&'static [&'static str]),
    /// Name of a `Node`.
    NodeRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdfField {
    pub name: &'static str,
    pub kind: IdfFieldKind,
}

#[derive(Debug, PartialEq, Eq)]
pub struct IdfObjectSchema {
    pub name: &'static str,
    pub has_name: bool,
    pub fields: &'static [IdfField],
    pub extensible: Option<IdfFieldKind>,
    /// Implicit records exist in the graph but are not written to IDF text.
    pub implicit: bool,
}

impl IdfObjectSchema {
    /// Position of a field in `fields` (case-insensitive).
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(field))
    }
}

pub const SCHEDULE_TYPE_LIMITS: &str = "ScheduleTypeLimits";
pub const SCHEDULE_CONSTANT: &str = "Schedule:Constant";
pub const SCHEDULE_COMPACT: &str = "Schedule:Compact";
pub const NODE: &str = "Node";
pub const OUTDOOR_AIR_NODE_LIST: &str = "OutdoorAir:NodeList";
pub const FAN_ON_OFF: &str = "Fan:OnOff";
pub const FAN_CONSTANT_VOLUME: &str = "Fan:ConstantVolume";
pub const FAN_VARIABLE_VOLUME: &str = "Fan:VariableVolume";
pub const HEAT_EXCHANGER_AIR_TO_AIR: &str = "HeatExchanger:AirToAir:SensibleAndLatent";
pub const ERV: &str = "ZoneHVAC:EnergyRecoveryVentilator";
pub const ERV_CONTROLLER: &str = "ZoneHVAC:EnergyRecoveryVentilator:Controller";
pub const UNITARY_SYSTEM: &str = "AirLoopHVAC:UnitarySystem";
pub const COIL_COOLING_DX_SINGLE_SPEED: &str = "Coil:Cooling:DX:SingleSpeed";
pub const COIL_HEATING_ELECTRIC: &str = "Coil:Heating:Electric";
pub const COIL_HEATING_FUEL: &str = "Coil:Heating:Fuel";

pub const SCHEDULES: &[&str] = &[SCHEDULE_CONSTANT, SCHEDULE_COMPACT];
pub const FANS: &[&str] = &[FAN_ON_OFF, FAN_CONSTANT_VOLUME, FAN_VARIABLE_VOLUME];
pub const HEATING_COILS: &[&str] = &[COIL_HEATING_ELECTRIC, COIL_HEATING_FUEL];
pub const COOLING_COILS: &[&str] = &[COIL_COOLING_DX_SINGLE_SPEED];

/// Types that share one name space because a single reference field accepts
/// any of them.
pub const NAME_GROUPS: &[&[&str]] = &[SCHEDULES, FANS, HEATING_COILS, COOLING_COILS];

use IdfFieldKind::{Alpha, NodeRef, ObjectRef, Real};

const fn field(name: &'static str, kind: IdfFieldKind) -> IdfField {
    IdfField { name, kind }
}

const AVAILABILITY: IdfField = field("Availability Schedule Name", ObjectRef(SCHEDULES));
const AIR_INLET: IdfField = field("Air Inlet Node Name", NodeRef);
const AIR_OUTLET: IdfField = field("Air Outlet Node Name", NodeRef);

/// Schema of the implicit `Node` records.
pub static NODE_SCHEMA: IdfObjectSchema = IdfObjectSchema {
    name: NODE,
    has_name: true,
    fields: &[],
    extensible: None,
    implicit: true,
};

static SCHEMAS: &[IdfObjectSchema] = &[
    IdfObjectSchema {
        name: SCHEDULE_TYPE_LIMITS,
        has_name: true,
        fields: &[
            field("Lower Limit Value", Real),
            field("Upper Limit Value", Real),
            field("Numeric Type", Alpha),
            field("Unit Type", Alpha),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: SCHEDULE_CONSTANT,
        has_name: true,
        fields: &[
            field("Schedule Type Limits Name", ObjectRef(&[SCHEDULE_TYPE_LIMITS])),
            field("Hourly Value", Real),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: SCHEDULE_COMPACT,
        has_name: true,
        fields: &[field(
            "Schedule Type Limits Name",
            ObjectRef(&[SCHEDULE_TYPE_LIMITS]),
        )],
        extensible: Some(Alpha),
        implicit: false,
    },
    IdfObjectSchema {
        name: OUTDOOR_AIR_NODE_LIST,
        has_name: false,
        fields: &[],
        extensible: Some(NodeRef),
        implicit: false,
    },
    IdfObjectSchema {
        name: FAN_ON_OFF,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Fan Total Efficiency", Real),
            field("Pressure Rise", Real),
            field("Maximum Flow Rate", Real),
            field("Motor Efficiency", Real),
            field("Motor In Airstream Fraction", Real),
            AIR_INLET,
            AIR_OUTLET,
            field("End-Use Subcategory", Alpha),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: FAN_CONSTANT_VOLUME,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Fan Total Efficiency", Real),
            field("Pressure Rise", Real),
            field("Maximum Flow Rate", Real),
            field("Motor Efficiency", Real),
            field("Motor In Airstream Fraction", Real),
            AIR_INLET,
            AIR_OUTLET,
            field("End-Use Subcategory", Alpha),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: FAN_VARIABLE_VOLUME,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Fan Total Efficiency", Real),
            field("Pressure Rise", Real),
            field("Maximum Flow Rate", Real),
            field("Fan Power Minimum Flow Rate Input Method", Alpha),
            field("Fan Power Minimum Flow Fraction", Real),
            field("Motor Efficiency", Real),
            field("Motor In Airstream Fraction", Real),
            AIR_INLET,
            AIR_OUTLET,
            field("End-Use Subcategory", Alpha),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: HEAT_EXCHANGER_AIR_TO_AIR,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Nominal Supply Air Flow Rate", Real),
            field("Sensible Effectiveness at 100% Heating Air Flow", Real),
            field("Latent Effectiveness at 100% Heating Air Flow", Real),
            field("Sensible Effectiveness at 100% Cooling Air Flow", Real),
            field("Latent Effectiveness at 100% Cooling Air Flow", Real),
            field("Supply Air Inlet Node Name", NodeRef),
            field("Supply Air Outlet Node Name", NodeRef),
            field("Exhaust Air Inlet Node Name", NodeRef),
            field("Exhaust Air Outlet Node Name", NodeRef),
            field("Nominal Electric Power", Real),
            field("Supply Air Outlet Temperature Control", Alpha),
            field("Heat Exchanger Type", Alpha),
            field("Frost Control Type", Alpha),
            field("Threshold Temperature", Real),
            field("Economizer Lockout", Alpha),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: ERV_CONTROLLER,
        has_name: true,
        fields: &[
            field("Temperature High Limit", Real),
            field("Temperature Low Limit", Real),
            field("Enthalpy High Limit", Real),
            field("Exhaust Air Temperature Limit", Alpha),
            field("Exhaust Air Enthalpy Limit", Alpha),
            field(
                "Time of Day Economizer Flow Control Schedule Name",
                ObjectRef(SCHEDULES),
            ),
            field("High Humidity Control Flag", Alpha),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: ERV,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Heat Exchanger Name", ObjectRef(&[HEAT_EXCHANGER_AIR_TO_AIR])),
            field("Supply Air Flow Rate", Real),
            field("Exhaust Air Flow Rate", Real),
            field("Supply Air Fan Name", ObjectRef(FANS)),
            field("Exhaust Air Fan Name", ObjectRef(FANS)),
            field("Controller Name", ObjectRef(&[ERV_CONTROLLER])),
            field("Ventilation Rate per Unit Floor Area", Real),
            field("Ventilation Rate per Occupant", Real),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: UNITARY_SYSTEM,
        has_name: true,
        fields: &[
            field("Control Type", Alpha),
            field("Dehumidification Control Type", Alpha),
            AVAILABILITY,
            AIR_INLET,
            AIR_OUTLET,
            field("Supply Fan Object Type", Alpha),
            field("Supply Fan Name", ObjectRef(FANS)),
            field("Fan Placement", Alpha),
            field("Supply Air Fan Operating Mode Schedule Name", ObjectRef(SCHEDULES)),
            field("Heating Coil Object Type", Alpha),
            field("Heating Coil Name", ObjectRef(HEATING_COILS)),
            field("Cooling Coil Object Type", Alpha),
            field("Cooling Coil Name", ObjectRef(COOLING_COILS)),
            field("Supplemental Heating Coil Object Type", Alpha),
            field("Supplemental Heating Coil Name", ObjectRef(HEATING_COILS)),
            field("Cooling Supply Air Flow Rate", Real),
            field("Heating Supply Air Flow Rate", Real),
            field("Maximum Supply Air Temperature", Real),
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: COIL_COOLING_DX_SINGLE_SPEED,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Gross Rated Total Cooling Capacity", Real),
            field("Gross Rated Sensible Heat Ratio", Real),
            field("Gross Rated Cooling COP", Real),
            field("Rated Air Flow Rate", Real),
            AIR_INLET,
            AIR_OUTLET,
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: COIL_HEATING_ELECTRIC,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Efficiency", Real),
            field("Nominal Capacity", Real),
            AIR_INLET,
            AIR_OUTLET,
        ],
        extensible: None,
        implicit: false,
    },
    IdfObjectSchema {
        name: COIL_HEATING_FUEL,
        has_name: true,
        fields: &[
            AVAILABILITY,
            field("Fuel Type", Alpha),
            field("Burner Efficiency", Real),
            field("Nominal Capacity", Real),
            AIR_INLET,
            AIR_OUTLET,
        ],
        extensible: None,
        implicit: false,
    },
];

/// Looks up the schema of an object type (case-insensitive).
pub fn schema_for(type_name: &str) -> Option<&'static IdfObjectSchema> {
    schemas().find(|s| s.name.eq_ignore_ascii_case(type_name))
}

/// Name space of a schema: the first type of its group in [`NAME_GROUPS`], or
/// the type itself.
pub fn name_group(schema: &'static IdfObjectSchema) -> &'static str {
    NAME_GROUPS
        .iter()
        .find(|group| group.contains(&schema.name))
        .and_then(|group| group.first().copied())
        .unwrap_or(schema.name)
}

/// All supported object types.
pub fn schemas() -> impl Iterator<Item = &'static IdfObjectSchema> {
    std::iter::once(&NODE_SCHEMA).chain(SCHEMAS.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup_case_insensitive() {
        let s = schema_for("fan:onoff");
        assert_eq!(s.map(|s| s.name), Some(FAN_ON_OFF));
        assert!(schema_for("Fan:SystemModel").is_none());
    }

    #[test]
    fn test_field_index() {
        let Some(hx) = schema_for(HEAT_EXCHANGER_AIR_TO_AIR) else {
            panic!("missing schema");
        };
        assert_eq!(hx.field_index("supply air inlet node name"), Some(6));
        assert_eq!(hx.field_index("Name"), None);
    }

    #[test]
    fn test_name_groups() {
        let group = |t: &str| schema_for(t).map(name_group);
        assert_eq!(group(SCHEDULE_COMPACT), Some(SCHEDULE_CONSTANT));
        assert_eq!(group(FAN_VARIABLE_VOLUME), Some(FAN_ON_OFF));
        assert_eq!(group(ERV), Some(ERV));
        assert_ne!(group(COIL_HEATING_FUEL), group(COIL_COOLING_DX_SINGLE_SPEED));
    }

    #[test]
    fn test_schema_names_unique() {
        let names: Vec<&str> = schemas().map(|s| s.name).collect();
        for (i, a) in names.iter().enumerate() {
            assert!(!names[i + 1..].contains(a), "{a}");
        }
        assert!(schema_for(NODE).is_some_and(|s| s.implicit));
    }
}
