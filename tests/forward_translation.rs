use anyhow::{Result, anyhow};
use eplus_bridge::idf::schema as idf;
use eplus_bridge::io::to_idf_string;
use eplus_bridge::model::hvac::{self, FanPlacement, fields as hf};
use eplus_bridge::translator::LogLevel;
use eplus_bridge::{FieldValue, ForwardTranslator, IdfRecord, Model, ObjectStore, Workspace};

fn record<'w>(ws: &'w Workspace, type_name: &str, name: &str) -> Result<&'w IdfRecord> {
    ws.find(type_name, name)
        .and_then(|id| ws.record(id))
        .ok_or_else(|| anyhow!("{type_name} '{name}' not emitted"))
}

fn erv_model() -> Result<Model> {
    let mut model = Model::new();
    let hx = model.add_heat_exchanger_air_to_air("ERV1 Heat Exchanger");
    let supply_fan = model.add_fan_on_off("ERV1 Supply Fan");
    let exhaust_fan = model.add_fan_on_off("ERV1 Exhaust Fan");
    let erv = model.add_energy_recovery_ventilator("ERV1", &hx, &supply_fan, &exhaust_fan)?;
    let exhaust = model.add_node("Zone1 Exhaust Node");
    let inlet = model.add_node("Zone1 Inlet Node");
    model.connect_zone_equipment(&erv, &exhaust, &inlet)?;
    Ok(model)
}

#[test]
fn test_erv_nodes_are_stitched() -> Result<()> {
    let model = erv_model()?;
    let mut translator = ForwardTranslator::default();
    let ws = translator.translate_model(&model)?;

    let hx = record(&ws, idf::HEAT_EXCHANGER_AIR_TO_AIR, "ERV1 Heat Exchanger")?;
    assert_eq!(hx.get_text("Supply Air Inlet Node Name"), Some("ERV1 OA Node"));
    assert_eq!(hx.get_text("Supply Air Outlet Node Name"), Some("ERV1 Supply Fan Inlet Node"));
    assert_eq!(hx.get_text("Exhaust Air Inlet Node Name"), Some("Zone1 Exhaust Node"));
    assert_eq!(hx.get_text("Exhaust Air Outlet Node Name"), Some("ERV1 Exhaust Fan Inlet Node"));

    let supply = record(&ws, idf::FAN_ON_OFF, "ERV1 Supply Fan")?;
    assert_eq!(supply.get_text("Air Inlet Node Name"), Some("ERV1 Supply Fan Inlet Node"));
    assert_eq!(supply.get_text("Air Outlet Node Name"), Some("Zone1 Inlet Node"));
    let exhaust = record(&ws, idf::FAN_ON_OFF, "ERV1 Exhaust Fan")?;
    assert_eq!(exhaust.get_text("Air Inlet Node Name"), Some("ERV1 Exhaust Fan Inlet Node"));
    assert_eq!(exhaust.get_text("Air Outlet Node Name"), Some("ERV1 Exhaust Fan Outlet Node"));

    for node in [
        "ERV1 OA Node",
        "ERV1 Supply Fan Inlet Node",
        "ERV1 Exhaust Fan Inlet Node",
        "ERV1 Exhaust Fan Outlet Node",
        "Zone1 Exhaust Node",
        "Zone1 Inlet Node",
    ] {
        assert!(ws.find(idf::NODE, node).is_some(), "missing node {node}");
    }

    let oa_lists: Vec<&IdfRecord> = ws
        .records_of_type(idf::OUTDOOR_AIR_NODE_LIST)
        .map(|(_, r)| r)
        .collect();
    assert_eq!(oa_lists.len(), 1);
    assert_eq!(oa_lists[0].extensible()[0].as_text(), Some("ERV1 OA Node"));

    let erv = record(&ws, idf::ERV, "ERV1")?;
    assert_eq!(erv.get_text("Heat Exchanger Name"), Some("ERV1 Heat Exchanger"));
    assert!(translator.errors().is_empty());
    Ok(())
}

#[test]
fn test_erv_forces_outlet_temperature_control_off() -> Result<()> {
    let mut model = erv_model()?;
    let hx = model
        .objects_by_class_and_name(hvac::HEAT_EXCHANGER_AIR_TO_AIR, "ERV1 Heat Exchanger")
        .first()
        .map(|o| o.handle.clone())
        .ok_or_else(|| anyhow!("heat exchanger missing"))?;
    model.set_field(&hx, hf::SUPPLY_AIR_OUTLET_TEMPERATURE_CONTROL, FieldValue::from("Yes"))?;

    let mut translator = ForwardTranslator::default();
    let ws = translator.translate_model(&model)?;
    let hx = record(&ws, idf::HEAT_EXCHANGER_AIR_TO_AIR, "ERV1 Heat Exchanger")?;
    assert_eq!(hx.get_text("Supply Air Outlet Temperature Control"), Some("No"));

    let warnings = translator.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, LogLevel::Warn);
    assert!(warnings[0].message.contains("Supply Air Outlet Temperature Control"));
    Ok(())
}

#[test]
fn test_shared_children_are_emitted_once() -> Result<()> {
    let model = erv_model()?;
    let ws = ForwardTranslator::default().translate_model(&model)?;
    assert_eq!(ws.records_of_type(idf::FAN_ON_OFF).count(), 2);
    assert_eq!(ws.records_of_type(idf::HEAT_EXCHANGER_AIR_TO_AIR).count(), 1);
    assert_eq!(ws.records_of_type(idf::SCHEDULE_CONSTANT).count(), 1);
    assert_eq!(ws.records_of_type(idf::NODE).count(), 6);
    Ok(())
}

#[test]
fn test_fresh_passes_are_deterministic() -> Result<()> {
    let model = erv_model()?;
    let mut translator = ForwardTranslator::default();
    let first = to_idf_string(&translator.translate_model(&model)?);
    let second = to_idf_string(&translator.translate_model(&model)?);
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_translate_object_pulls_in_references_only() -> Result<()> {
    let mut model = erv_model()?;
    let lone = model.add_fan_on_off("Unrelated Fan");
    let ws = ForwardTranslator::default().translate_object(&model, &lone)?;
    assert!(ws.find(idf::FAN_ON_OFF, "Unrelated Fan").is_some());
    assert!(ws.find(idf::ERV, "ERV1").is_none());
    assert!(ws.find(idf::SCHEDULE_CONSTANT, "Always On Discrete").is_some());
    Ok(())
}

#[test]
fn test_erv_without_zone_is_dropped() -> Result<()> {
    let mut model = Model::new();
    let hx = model.add_heat_exchanger_air_to_air("HX");
    let supply_fan = model.add_fan_on_off("Supply");
    let exhaust_fan = model.add_fan_on_off("Exhaust");
    model.add_energy_recovery_ventilator("Loose ERV", &hx, &supply_fan, &exhaust_fan)?;

    let mut translator = ForwardTranslator::default();
    let ws = translator.translate_model(&model)?;
    assert!(ws.find(idf::ERV, "Loose ERV").is_none());
    assert!(ws.find(idf::FAN_ON_OFF, "Supply").is_some());
    assert_eq!(translator.errors().len(), 1);
    Ok(())
}

#[test]
fn test_unitary_blow_through_chain() -> Result<()> {
    let mut model = Model::new();
    let unitary = model.add_unitary_system("AHU");
    let fan = model.add_fan_constant_volume("AHU Fan");
    let cooling = model.add_coil_cooling_dx_single_speed("AHU DX");
    let heating = model.add_coil_heating_gas("AHU Furnace");
    let inlet = model.add_node("Mixed Air Node");
    let outlet = model.add_node("Supply Outlet Node");
    model.connect_air_loop(&unitary, &inlet, &outlet)?;
    model.set_supply_fan(&unitary, &fan, FanPlacement::BlowThrough)?;
    model.set_field(&unitary, hf::COOLING_COIL, cooling.into())?;
    model.set_field(&unitary, hf::HEATING_COIL, heating.into())?;

    let mut translator = ForwardTranslator::default();
    let ws = translator.translate_model(&model)?;

    let ahu = record(&ws, idf::UNITARY_SYSTEM, "AHU")?;
    assert_eq!(ahu.get_text("Supply Fan Object Type"), Some(idf::FAN_CONSTANT_VOLUME));
    assert_eq!(ahu.get_text("Heating Coil Object Type"), Some(idf::COIL_HEATING_FUEL));
    assert_eq!(ahu.get_text("Fan Placement"), Some("BlowThrough"));

    let fan = record(&ws, idf::FAN_CONSTANT_VOLUME, "AHU Fan")?;
    assert_eq!(fan.get_text("Air Inlet Node Name"), Some("Mixed Air Node"));
    assert_eq!(fan.get_text("Air Outlet Node Name"), Some("AHU Fan - Cooling Coil Node"));
    let dx = record(&ws, idf::COIL_COOLING_DX_SINGLE_SPEED, "AHU DX")?;
    assert_eq!(dx.get_text("Air Inlet Node Name"), Some("AHU Fan - Cooling Coil Node"));
    assert_eq!(dx.get_text("Air Outlet Node Name"), Some("AHU Cooling Coil - Heating Coil Node"));
    let furnace = record(&ws, idf::COIL_HEATING_FUEL, "AHU Furnace")?;
    assert_eq!(furnace.get_text("Air Inlet Node Name"), Some("AHU Cooling Coil - Heating Coil Node"));
    assert_eq!(furnace.get_text("Air Outlet Node Name"), Some("Supply Outlet Node"));

    assert!(translator.errors().is_empty());
    Ok(())
}

#[test]
fn test_unitary_without_air_loop_is_dropped() -> Result<()> {
    let mut model = Model::new();
    model.add_unitary_system("Floating");
    let mut translator = ForwardTranslator::default();
    let ws = translator.translate_model(&model)?;
    assert!(ws.find(idf::UNITARY_SYSTEM, "Floating").is_none());
    let errors = translator.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Object not attached to AirLoopHVAC");
    Ok(())
}

#[test]
fn test_schedules_sharing_a_name_stay_distinct() -> Result<()> {
    let mut model = Model::new();
    let constant = model.add_schedule_constant("On", 1.0);
    model.add_schedule_compact("On", &["Through: 12/31", "For: AllDays", "Until: 24:00", "1"]);
    let fan = model.add_fan_on_off("Fan");
    model.set_field(&fan, hf::AVAILABILITY_SCHEDULE, constant.into())?;

    let mut translator = ForwardTranslator::default();
    let ws = translator.translate_model(&model)?;
    assert!(translator.errors().is_empty());

    let constant_name = ws
        .records_of_type(idf::SCHEDULE_CONSTANT)
        .find_map(|(_, r)| r.name().map(str::to_string))
        .ok_or_else(|| anyhow!("constant schedule not emitted"))?;
    let compact_name = ws
        .records_of_type(idf::SCHEDULE_COMPACT)
        .find_map(|(_, r)| r.name().map(str::to_string))
        .ok_or_else(|| anyhow!("compact schedule not emitted"))?;
    assert_ne!(constant_name.to_lowercase(), compact_name.to_lowercase());

    let fan = record(&ws, idf::FAN_ON_OFF, "Fan")?;
    assert_eq!(fan.get_text("Availability Schedule Name"), Some(constant_name.as_str()));
    Ok(())
}

#[test]
fn test_self_referencing_controller_is_a_logged_cycle() -> Result<()> {
    let mut model = erv_model()?;
    let erv = model
        .objects_by_class_and_name(hvac::ERV, "ERV1")
        .first()
        .map(|o| o.handle.clone())
        .ok_or_else(|| anyhow!("ERV missing"))?;
    model.set_field(&erv, hf::CONTROLLER, erv.clone().into())?;

    let mut translator = ForwardTranslator::default();
    let ws = translator.translate_model(&model)?;

    let errors = translator.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Reference cycle detected at ZoneHVACEnergyRecoveryVentilator 'ERV1'"
    );
    let erv = record(&ws, idf::ERV, "ERV1")?;
    assert_eq!(erv.get_text("Controller Name"), None);
    assert_eq!(ws.records_of_type(idf::ERV).count(), 1);
    Ok(())
}
