//! Model persistence as JSON.
//!
//! A model file holds the objects in insertion order, each with its handle,
//! followed by the recorded schedule usages. Target fields store handles, so
//! loading checks that every target names an object of the same file.

use crate::Model;
use crate::error::ModelError;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::debug;

/// Saves `model` to `path`, replacing any existing file.
///
/// # Example
/// ```no_run
/// use eplus_bridge::Model;
/// use eplus_bridge::io::write_model;
/// use std::path::Path;
///
/// let mut model = Model::new();
/// model.add_fan_on_off("Supply Fan");
/// write_model(Path::new("model.json"), &model)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn write_model(path: &Path, model: &Model) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Cannot create model file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), model)
        .with_context(|| format!("Cannot write {} objects to {}", model.len(), path.display()))?;
    debug!(objects = model.len(), path = %path.display(), "Saved model");
    Ok(())
}

/// Loads a model saved by [`write_model`].
pub fn read_model(path: &Path) -> Result<Model> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open model file {}", path.display()))?;
    let model: Model = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a valid model file", path.display()))?;
    check_targets(&model).with_context(|| format!("Broken reference in {}", path.display()))?;
    debug!(objects = model.len(), path = %path.display(), "Loaded model");
    Ok(model)
}

pub fn to_json_string(model: &Model) -> Result<String> {
    serde_json::to_string_pretty(model).context("Cannot serialize model")
}

pub fn from_json_string(json: &str) -> Result<Model> {
    let model: Model = serde_json::from_str(json).context("Not a valid model document")?;
    check_targets(&model)?;
    Ok(model)
}

/// Every target field must point at an object of the model.
fn check_targets(model: &Model) -> Result<(), ModelError> {
    for obj in model.objects() {
        if let Some(missing) = obj.targets().find(|t| !model.contains(t)) {
            return Err(ModelError::DanglingTarget {
                object: obj.brief_description(),
                target: missing.clone(),
            });
        }
    }
    Ok(())
}
