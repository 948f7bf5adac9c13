// External imports
use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Internal imports
use super::step_4_mgu_cell::{GatedRecurrentCell, MguConfig};
use crate::built_info;
use crate::constants::{METADATA_SUFFIX, MODEL_FILE_EXTENSION};

/// # Cell Metadata
///
/// Saved next to the parameter record so the cell can be rebuilt with the
/// right layout before the weights are loaded into it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CellMetadata {
    /// Configuration the cell was built from
    pub config: MguConfig,

    /// Version of this crate that wrote the files
    pub crate_version: String,

    /// Unix timestamp when the cell was saved
    pub timestamp: i64,

    /// Free-form description
    pub description: String,
}

impl CellMetadata {
    pub fn new(config: &MguConfig, description: &str) -> Self {
        Self {
            config: config.clone(),
            crate_version: built_info::PKG_VERSION.to_string(),
            timestamp: Utc::now().timestamp(),
            description: description.to_string(),
        }
    }

    /// Saved time as a UTC datetime
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0)
    }
}

/// Path of the metadata file belonging to a record path
fn metadata_path_for(model_path: &Path) -> Result<PathBuf> {
    let stem = model_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Invalid model path")?;
    let parent = model_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!("{}{}", stem, METADATA_SUFFIX)))
}

/// # Save Cell
///
/// Writes the cell parameters and its metadata to disk. The hidden state is
/// runtime memory and is not saved.
///
/// ## File Format
///
/// 1. `{stem}.bin` - parameter record (`BinFileRecorder`, full precision)
/// 2. `{stem}_meta.json` - `CellMetadata` as JSON
///
/// # Arguments
///
/// * `cell` - The cell to save
/// * `path` - Target path; the extension is replaced with `.bin`
/// * `description` - Stored in the metadata
///
/// # Returns
///
/// The path of the parameter record
pub fn save_cell<B: Backend>(
    cell: &GatedRecurrentCell<B>,
    path: &Path,
    description: &str,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let model_path = path.with_extension(MODEL_FILE_EXTENSION);
    let metadata_path = metadata_path_for(&model_path)?;

    cell.params()
        .clone()
        .save_file::<BinFileRecorder<FullPrecisionSettings>, _>(&model_path, &Default::default())
        .context(format!(
            "Failed to save cell parameters to {}",
            model_path.display()
        ))?;

    let metadata = CellMetadata::new(cell.config(), description);
    let metadata_json = serde_json::to_string_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json).context(format!(
        "Failed to write metadata to {}",
        metadata_path.display()
    ))?;

    info!(
        "Saved cell to {} with metadata at {}",
        model_path.display(),
        metadata_path.display()
    );

    Ok(model_path)
}

/// # Load Cell
///
/// Rebuilds a cell from its metadata and loads the saved parameters into it.
/// The returned cell starts with an unset hidden state.
///
/// # Arguments
///
/// * `path` - Path of the parameter record (with or without `.bin`)
/// * `device` - Device to load the parameters onto
///
/// # Returns
///
/// The restored cell together with its metadata
pub fn load_cell<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(GatedRecurrentCell<B>, CellMetadata)> {
    let model_path = if path.extension().map_or(false, |ext| ext == MODEL_FILE_EXTENSION) {
        path.to_path_buf()
    } else {
        path.with_extension(MODEL_FILE_EXTENSION)
    };

    if !model_path.exists() {
        return Err(anyhow::anyhow!(
            "Cell file not found: {}",
            model_path.display()
        ));
    }

    let metadata_path = metadata_path_for(&model_path)?;
    let metadata_json = fs::read_to_string(&metadata_path).context(format!(
        "Failed to read metadata from {}",
        metadata_path.display()
    ))?;
    let metadata: CellMetadata = serde_json::from_str(&metadata_json)?;

    let cell = metadata.config.init::<B>(device)?;
    let params = cell
        .params()
        .clone()
        .load_file::<BinFileRecorder<FullPrecisionSettings>, _>(
            &model_path,
            &Default::default(),
            device,
        )
        .context(format!(
            "Failed to load cell parameters from {}",
            model_path.display()
        ))?;
    let cell = cell.with_params(params)?;

    info!(
        "Loaded {:?} cell (input_size={}, hidden_size={}) written by version {}",
        metadata.config.forget_gate_inputs,
        metadata.config.input_size,
        metadata.config.hidden_size,
        metadata.crate_version
    );

    Ok((cell, metadata))
}

/// Save a cell configuration as pretty-printed JSON
pub fn save_model_config<P: AsRef<Path>>(config: &MguConfig, path: P) -> Result<()> {
    let config_json = serde_json::to_string_pretty(config)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, config_json)?;

    Ok(())
}

/// Load a cell configuration from JSON
pub fn load_model_config<P: AsRef<Path>>(path: P) -> Result<MguConfig> {
    let config_json = fs::read_to_string(path)?;
    let config: MguConfig = serde_json::from_str(&config_json)?;
    config.validate()?;

    Ok(config)
}
