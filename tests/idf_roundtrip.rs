use anyhow::{Result, anyhow};
use eplus_bridge::idf::schema as idf;
use eplus_bridge::io::{from_idf_string, read_idf, to_idf_string, write_idf};
use eplus_bridge::model::hvac::{self, fields as hf};
use eplus_bridge::{ForwardTranslator, Handle, Model, ObjectStore, ReverseTranslator, ScheduleTypeCatalog};
use tempfile::tempdir;

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

fn only(model: &Model, class_name: &str, name: &str) -> Result<Handle> {
    let found = model.objects_by_class_and_name(class_name, name);
    match found.as_slice() {
        [one] => Ok(one.handle.clone()),
        _ => Err(anyhow!("expected one {class_name} '{name}', found {}", found.len())),
    }
}

#[test]
fn test_idf_text_survives_reparse() -> Result<()> {
    let ws = ForwardTranslator::default().translate_model(&erv_model()?)?;
    let text = to_idf_string(&ws);
    let reparsed = from_idf_string(&text)?;
    assert_eq!(reparsed.len(), ws.len());
    assert_eq!(to_idf_string(&reparsed), text);
    Ok(())
}

#[test]
fn test_idf_file_roundtrip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("erv.idf");
    let ws = ForwardTranslator::default().translate_model(&erv_model()?)?;
    write_idf(&path, &ws)?;
    let loaded = read_idf(&path)?;
    assert_eq!(loaded.records_of_type(idf::OUTDOOR_AIR_NODE_LIST).count(), 1);
    assert!(loaded.find(idf::NODE, "ERV1 OA Node").is_some());
    Ok(())
}

#[test]
fn test_reverse_recovers_erv_zone_connections() -> Result<()> {
    let catalog = ScheduleTypeCatalog::builtin()?;
    let text = to_idf_string(&ForwardTranslator::default().translate_model(&erv_model()?)?);
    let ws = from_idf_string(&text)?;

    let mut reverse = ReverseTranslator::new(&catalog);
    let model = reverse.translate_workspace(&ws)?;
    assert!(reverse.errors().is_empty());

    let erv = only(&model, hvac::ERV, "ERV1")?;
    let exhaust = model
        .get_target(&erv, hf::INLET_NODE)
        .ok_or_else(|| anyhow!("exhaust node not connected"))?;
    let inlet = model
        .get_target(&erv, hf::OUTLET_NODE)
        .ok_or_else(|| anyhow!("inlet node not connected"))?;
    assert_eq!(model.name(&exhaust), Some("Zone1 Exhaust Node"));
    assert_eq!(model.name(&inlet), Some("Zone1 Inlet Node"));

    // Internal nodes are rebuilt on the next forward pass, not stored
    assert_eq!(model.objects_by_class(hvac::NODE).len(), 2);
    let supply_fan = only(&model, hvac::FAN_ON_OFF, "ERV1 Supply Fan")?;
    assert_eq!(model.get_target(&supply_fan, hf::INLET_NODE), None);

    // Fans, heat exchanger and ERV share the always-on schedule
    let schedule = model
        .get_target(&supply_fan, hf::AVAILABILITY_SCHEDULE)
        .ok_or_else(|| anyhow!("availability not assigned"))?;
    let limits = model
        .schedule_type_limits_of(&schedule)
        .ok_or_else(|| anyhow!("limits not assigned"))?;
    assert_eq!(model.name(&limits), Some("OnOff"));
    assert_eq!(model.schedule_usages_of(&schedule).len(), 4);
    Ok(())
}

#[test]
fn test_second_forward_pass_matches_first() -> Result<()> {
    let catalog = ScheduleTypeCatalog::builtin()?;
    let first = ForwardTranslator::default().translate_model(&erv_model()?)?;
    let model = ReverseTranslator::new(&catalog).translate_workspace(&first)?;
    let second = ForwardTranslator::default().translate_model(&model)?;

    let nodes = |ws: &eplus_bridge::Workspace| {
        let mut names: Vec<String> = ws
            .records_of_type(idf::NODE)
            .filter_map(|(_, r)| r.name().map(str::to_string))
            .collect();
        names.sort();
        names
    };
    assert_eq!(nodes(&first), nodes(&second));
    assert_eq!(first.len(), second.len());
    Ok(())
}
