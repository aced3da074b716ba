//! HVAC component constructors.
//!
//! Each constructor creates the object with the field defaults of the
//! corresponding model class. Schedules are not assigned here: fields whose
//! schedule is left unset fall back to an always-on schedule at translation
//! time, and schedules are attached with
//! [`set_schedule`](crate::schedule_types::set_schedule).

use super::{FieldValue, Model, ObjectStore};
use crate::Handle;
use crate::error::ModelError;

pub const NODE: &str = "Node";
pub const FAN_ON_OFF: &str = "FanOnOff";
pub const FAN_CONSTANT_VOLUME: &str = "FanConstantVolume";
pub const FAN_VARIABLE_VOLUME: &str = "FanVariableVolume";
pub const HEAT_EXCHANGER_AIR_TO_AIR: &str = "HeatExchangerAirToAirSensibleAndLatent";
pub const ERV: &str = "ZoneHVACEnergyRecoveryVentilator";
pub const ERV_CONTROLLER: &str = "ZoneHVACEnergyRecoveryVentilatorController";
pub const UNITARY_SYSTEM: &str = "AirLoopHVACUnitarySystem";
pub const COIL_COOLING_DX_SINGLE_SPEED: &str = "CoilCoolingDXSingleSpeed";
pub const COIL_HEATING_ELECTRIC: &str = "CoilHeatingElectric";
pub const COIL_HEATING_GAS: &str = "CoilHeatingGas";

/// Field keys shared by the HVAC classes.
pub mod fields {
    pub const AVAILABILITY_SCHEDULE: &str = "Availability Schedule";
    pub const INLET_NODE: &str = "Inlet Node";
    pub const OUTLET_NODE: &str = "Outlet Node";

    pub const FAN_TOTAL_EFFICIENCY: &str = "Fan Total Efficiency";
    pub const PRESSURE_RISE: &str = "Pressure Rise";
    pub const MAXIMUM_FLOW_RATE: &str = "Maximum Flow Rate";
    pub const MOTOR_EFFICIENCY: &str = "Motor Efficiency";
    pub const MOTOR_IN_AIRSTREAM_FRACTION: &str = "Motor In Airstream Fraction";
    pub const END_USE_SUBCATEGORY: &str = "End-Use Subcategory";
    pub const FAN_POWER_MINIMUM_FLOW_RATE_INPUT_METHOD: &str =
        "Fan Power Minimum Flow Rate Input Method";
    pub const FAN_POWER_MINIMUM_FLOW_FRACTION: &str = "Fan Power Minimum Flow Fraction";

    pub const NOMINAL_SUPPLY_AIR_FLOW_RATE: &str = "Nominal Supply Air Flow Rate";
    pub const SENSIBLE_EFFECTIVENESS_100_HEATING: &str =
        "Sensible Effectiveness at 100% Heating Air Flow";
    pub const LATENT_EFFECTIVENESS_100_HEATING: &str =
        "Latent Effectiveness at 100% Heating Air Flow";
    pub const SENSIBLE_EFFECTIVENESS_100_COOLING: &str =
        "Sensible Effectiveness at 100% Cooling Air Flow";
    pub const LATENT_EFFECTIVENESS_100_COOLING: &str =
        "Latent Effectiveness at 100% Cooling Air Flow";
    pub const NOMINAL_ELECTRIC_POWER: &str = "Nominal Electric Power";
    pub const SUPPLY_AIR_OUTLET_TEMPERATURE_CONTROL: &str = "Supply Air Outlet Temperature Control";
    pub const HEAT_EXCHANGER_TYPE: &str = "Heat Exchanger Type";
    pub const FROST_CONTROL_TYPE: &str = "Frost Control Type";
    pub const THRESHOLD_TEMPERATURE: &str = "Threshold Temperature";
    pub const ECONOMIZER_LOCKOUT: &str = "Economizer Lockout";

    pub const HEAT_EXCHANGER: &str = "Heat Exchanger";
    pub const SUPPLY_AIR_FLOW_RATE: &str = "Supply Air Flow Rate";
    pub const EXHAUST_AIR_FLOW_RATE: &str = "Exhaust Air Flow Rate";
    pub const SUPPLY_AIR_FAN: &str = "Supply Air Fan";
    pub const EXHAUST_AIR_FAN: &str = "Exhaust Air Fan";
    pub const CONTROLLER: &str = "Controller";
    pub const VENTILATION_RATE_PER_UNIT_FLOOR_AREA: &str = "Ventilation Rate per Unit Floor Area";
    pub const VENTILATION_RATE_PER_OCCUPANT: &str = "Ventilation Rate per Occupant";

    pub const TEMPERATURE_HIGH_LIMIT: &str = "Temperature High Limit";
    pub const TEMPERATURE_LOW_LIMIT: &str = "Temperature Low Limit";
    pub const ENTHALPY_HIGH_LIMIT: &str = "Enthalpy High Limit";
    pub const EXHAUST_AIR_TEMPERATURE_LIMIT: &str = "Exhaust Air Temperature Limit";
    pub const EXHAUST_AIR_ENTHALPY_LIMIT: &str = "Exhaust Air Enthalpy Limit";
    pub const TIME_OF_DAY_ECONOMIZER_FLOW_CONTROL_SCHEDULE: &str =
        "Time of Day Economizer Flow Control Schedule";
    pub const HIGH_HUMIDITY_CONTROL_FLAG: &str = "High Humidity Control Flag";

    pub const CONTROL_TYPE: &str = "Control Type";
    pub const DEHUMIDIFICATION_CONTROL_TYPE: &str = "Dehumidification Control Type";
    pub const SUPPLY_FAN: &str = "Supply Fan";
    pub const FAN_PLACEMENT: &str = "Fan Placement";
    pub const SUPPLY_AIR_FAN_OPERATING_MODE_SCHEDULE: &str =
        "Supply Air Fan Operating Mode Schedule";
    pub const HEATING_COIL: &str = "Heating Coil";
    pub const COOLING_COIL: &str = "Cooling Coil";
    pub const SUPPLEMENTAL_HEATING_COIL: &str = "Supplemental Heating Coil";
    pub const COOLING_SUPPLY_AIR_FLOW_RATE: &str = "Supply Air Flow Rate During Cooling Operation";
    pub const HEATING_SUPPLY_AIR_FLOW_RATE: &str = "Supply Air Flow Rate During Heating Operation";
    pub const MAXIMUM_SUPPLY_AIR_TEMPERATURE: &str = "Maximum Supply Air Temperature";

    pub const GROSS_RATED_TOTAL_COOLING_CAPACITY: &str = "Gross Rated Total Cooling Capacity";
    pub const GROSS_RATED_SENSIBLE_HEAT_RATIO: &str = "Gross Rated Sensible Heat Ratio";
    pub const GROSS_RATED_COOLING_COP: &str = "Gross Rated Cooling COP";
    pub const RATED_AIR_FLOW_RATE: &str = "Rated Air Flow Rate";
    pub const EFFICIENCY: &str = "Efficiency";
    pub const NOMINAL_CAPACITY: &str = "Nominal Capacity";
    pub const FUEL_TYPE: &str = "Fuel Type";
}

/// Fan placement of a unitary system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanPlacement {
    BlowThrough,
    DrawThrough,
}

impl FanPlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanPlacement::BlowThrough => "BlowThrough",
            FanPlacement::DrawThrough => "DrawThrough",
        }
    }
}

impl Model {
    fn set_defaults(&mut self, handle: &Handle, values: Vec<(&str, FieldValue)>) {
        if let Some(obj) = self.objects.get_mut(handle) {
            for (key, value) in values {
                obj.fields.insert(key.to_string(), value);
            }
        }
    }

    /// Returns the node with this exact name, creating it if needed.
    pub fn get_or_add_node(&mut self, name: &str) -> Handle {
        match self.objects_by_class_and_name(NODE, name).first() {
            Some(node) => node.handle.clone(),
            None => self.add_object(NODE, Some(name)),
        }
    }

    pub fn add_node(&mut self, name: &str) -> Handle {
        self.add_object(NODE, Some(name))
    }

    fn add_fan(&mut self, class_name: &str, name: &str, pressure_rise: f64) -> Handle {
        let h = self.add_object(class_name, Some(name));
        self.set_defaults(
            &h,
            vec![
                (fields::FAN_TOTAL_EFFICIENCY, FieldValue::Real(0.6)),
                (fields::PRESSURE_RISE, FieldValue::Real(pressure_rise)),
                (fields::MAXIMUM_FLOW_RATE, FieldValue::Autosize),
                (fields::MOTOR_EFFICIENCY, FieldValue::Real(0.8)),
                (fields::MOTOR_IN_AIRSTREAM_FRACTION, FieldValue::Real(1.0)),
                (fields::END_USE_SUBCATEGORY, FieldValue::from("")),
            ],
        );
        h
    }

    pub fn add_fan_on_off(&mut self, name: &str) -> Handle {
        self.add_fan(FAN_ON_OFF, name, 300.0)
    }

    pub fn add_fan_constant_volume(&mut self, name: &str) -> Handle {
        self.add_fan(FAN_CONSTANT_VOLUME, name, 250.0)
    }

    pub fn add_fan_variable_volume(&mut self, name: &str) -> Handle {
        let h = self.add_fan(FAN_VARIABLE_VOLUME, name, 250.0);
        self.set_defaults(
            &h,
            vec![
                (
                    fields::FAN_POWER_MINIMUM_FLOW_RATE_INPUT_METHOD,
                    FieldValue::from("Fraction"),
                ),
                (fields::FAN_POWER_MINIMUM_FLOW_FRACTION, FieldValue::Real(0.25)),
            ],
        );
        h
    }

    pub fn add_heat_exchanger_air_to_air(&mut self, name: &str) -> Handle {
        let h = self.add_object(HEAT_EXCHANGER_AIR_TO_AIR, Some(name));
        self.set_defaults(
            &h,
            vec![
                (fields::NOMINAL_SUPPLY_AIR_FLOW_RATE, FieldValue::Autosize),
                (fields::SENSIBLE_EFFECTIVENESS_100_HEATING, FieldValue::Real(0.76)),
                (fields::LATENT_EFFECTIVENESS_100_HEATING, FieldValue::Real(0.68)),
                (fields::SENSIBLE_EFFECTIVENESS_100_COOLING, FieldValue::Real(0.76)),
                (fields::LATENT_EFFECTIVENESS_100_COOLING, FieldValue::Real(0.68)),
                (fields::NOMINAL_ELECTRIC_POWER, FieldValue::Real(0.0)),
                (fields::SUPPLY_AIR_OUTLET_TEMPERATURE_CONTROL, FieldValue::from("Yes")),
                (fields::HEAT_EXCHANGER_TYPE, FieldValue::from("Plate")),
                (fields::FROST_CONTROL_TYPE, FieldValue::from("None")),
                (fields::THRESHOLD_TEMPERATURE, FieldValue::Real(1.7)),
                (fields::ECONOMIZER_LOCKOUT, FieldValue::from("Yes")),
            ],
        );
        h
    }

    pub fn add_erv_controller(&mut self, name: &str) -> Handle {
        let h = self.add_object(ERV_CONTROLLER, Some(name));
        self.set_defaults(
            &h,
            vec![(fields::HIGH_HUMIDITY_CONTROL_FLAG, FieldValue::from("No"))],
        );
        h
    }

    /// Adds an energy recovery ventilator built from existing sub-components.
    pub fn add_energy_recovery_ventilator(
        &mut self,
        name: &str,
        heat_exchanger: &Handle,
        supply_fan: &Handle,
        exhaust_fan: &Handle,
    ) -> Result<Handle, ModelError> {
        self.require_class(heat_exchanger, HEAT_EXCHANGER_AIR_TO_AIR)?;
        self.require(supply_fan)?;
        self.require(exhaust_fan)?;
        let h = self.add_object(ERV, Some(name));
        self.set_field(&h, fields::HEAT_EXCHANGER, heat_exchanger.clone().into())?;
        self.set_field(&h, fields::SUPPLY_AIR_FAN, supply_fan.clone().into())?;
        self.set_field(&h, fields::EXHAUST_AIR_FAN, exhaust_fan.clone().into())?;
        self.set_defaults(
            &h,
            vec![
                (fields::SUPPLY_AIR_FLOW_RATE, FieldValue::Autosize),
                (fields::EXHAUST_AIR_FLOW_RATE, FieldValue::Autosize),
                (fields::VENTILATION_RATE_PER_UNIT_FLOOR_AREA, FieldValue::Real(0.000508)),
                (fields::VENTILATION_RATE_PER_OCCUPANT, FieldValue::Real(0.00236)),
            ],
        );
        Ok(h)
    }

    /// Connects a zone equipment object to its zone: `exhaust_node` feeds the
    /// equipment, `inlet_node` receives its supply air.
    pub fn connect_zone_equipment(
        &mut self,
        equipment: &Handle,
        exhaust_node: &Handle,
        inlet_node: &Handle,
    ) -> Result<(), ModelError> {
        self.require_class(exhaust_node, NODE)?;
        self.require_class(inlet_node, NODE)?;
        self.set_field(equipment, fields::INLET_NODE, exhaust_node.clone().into())?;
        self.set_field(equipment, fields::OUTLET_NODE, inlet_node.clone().into())
    }

    pub fn add_unitary_system(&mut self, name: &str) -> Handle {
        let h = self.add_object(UNITARY_SYSTEM, Some(name));
        self.set_defaults(
            &h,
            vec![
                (fields::CONTROL_TYPE, FieldValue::from("Load")),
                (fields::DEHUMIDIFICATION_CONTROL_TYPE, FieldValue::from("None")),
                (fields::COOLING_SUPPLY_AIR_FLOW_RATE, FieldValue::Autosize),
                (fields::HEATING_SUPPLY_AIR_FLOW_RATE, FieldValue::Autosize),
                (fields::MAXIMUM_SUPPLY_AIR_TEMPERATURE, FieldValue::Real(80.0)),
            ],
        );
        h
    }

    pub fn set_supply_fan(
        &mut self,
        unitary: &Handle,
        fan: &Handle,
        placement: FanPlacement,
    ) -> Result<(), ModelError> {
        self.require_class(unitary, UNITARY_SYSTEM)?;
        self.set_field(unitary, fields::SUPPLY_FAN, fan.clone().into())?;
        self.set_field(unitary, fields::FAN_PLACEMENT, placement.as_str().into())
    }

    /// Places the unitary system between two air loop nodes.
    pub fn connect_air_loop(
        &mut self,
        component: &Handle,
        inlet_node: &Handle,
        outlet_node: &Handle,
    ) -> Result<(), ModelError> {
        self.require_class(inlet_node, NODE)?;
        self.require_class(outlet_node, NODE)?;
        self.set_field(component, fields::INLET_NODE, inlet_node.clone().into())?;
        self.set_field(component, fields::OUTLET_NODE, outlet_node.clone().into())
    }

    pub fn add_coil_cooling_dx_single_speed(&mut self, name: &str) -> Handle {
        let h = self.add_object(COIL_COOLING_DX_SINGLE_SPEED, Some(name));
        self.set_defaults(
            &h,
            vec![
                (fields::GROSS_RATED_TOTAL_COOLING_CAPACITY, FieldValue::Autosize),
                (fields::GROSS_RATED_SENSIBLE_HEAT_RATIO, FieldValue::Autosize),
                (fields::GROSS_RATED_COOLING_COP, FieldValue::Real(3.0)),
                (fields::RATED_AIR_FLOW_RATE, FieldValue::Autosize),
            ],
        );
        h
    }

    pub fn add_coil_heating_electric(&mut self, name: &str) -> Handle {
        let h = self.add_object(COIL_HEATING_ELECTRIC, Some(name));
        self.set_defaults(
            &h,
            vec![
                (fields::EFFICIENCY, FieldValue::Real(1.0)),
                (fields::NOMINAL_CAPACITY, FieldValue::Autosize),
            ],
        );
        h
    }

    pub fn add_coil_heating_gas(&mut self, name: &str) -> Handle {
        let h = self.add_object(COIL_HEATING_GAS, Some(name));
        self.set_defaults(
            &h,
            vec![
                (fields::FUEL_TYPE, FieldValue::from("NaturalGas")),
                (fields::EFFICIENCY, FieldValue::Real(0.8)),
                (fields::NOMINAL_CAPACITY, FieldValue::Autosize),
            ],
        );
        h
    }
}
