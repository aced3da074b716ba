use anyhow::{Context, Result};
use eplus_bridge::io::{read_model, to_idf_string, write_idf};
use eplus_bridge::{ForwardTranslator, Model};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Zone energy recovery ventilator with default fans and heat exchanger.
fn demo_model() -> Result<Model> {
    let mut model = Model::new();
    let hx = model.add_heat_exchanger_air_to_air("ERV1 Heat Exchanger");
    let supply_fan = model.add_fan_on_off("ERV1 Supply Fan");
    let exhaust_fan = model.add_fan_on_off("ERV1 Exhaust Fan");
    let erv = model.add_energy_recovery_ventilator("ERV1", &hx, &supply_fan, &exhaust_fan)?;

    let exhaust_node = model.add_node("Zone1 Exhaust Node");
    let inlet_node = model.add_node("Zone1 Inlet Node");
    model.connect_zone_equipment(&erv, &exhaust_node, &inlet_node)?;
    Ok(model)
}

/// Usage: `eplus_bridge [model.json [out.idf]]`
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let model = match args.get(1) {
        Some(path) => read_model(Path::new(path))?,
        None => demo_model()?,
    };
    info!(objects = model.len(), "Loaded model");

    let mut translator = ForwardTranslator::default();
    let workspace = translator
        .translate_model(&model)
        .context("Forward translation failed")?;
    for message in translator.messages() {
        println!("! {message}");
    }

    match args.get(2) {
        Some(out) => {
            write_idf(Path::new(out), &workspace)?;
            info!(records = workspace.len(), path = %out, "Wrote IDF");
        }
        None => print!("{}", to_idf_string(&workspace)),
    }
    Ok(())
}
