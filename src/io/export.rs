//! Model JSON and spectrum CSV exports.
//!
//! Model JSON is the portable representation of a built model:
//! - every sub-model with its bounded parameters
//! - a generation timestamp
//! - the model evaluated on the observation grid for quick inspection
//!
//! The schema is defined by `ModelFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::domain::Observations;
use crate::error::AppError;
use crate::models::CompositeModel;

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    /// RFC 3339 timestamp of the export.
    pub generated: String,
    /// Science pack the model was built from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,
    pub model: CompositeModel,
    pub grid: ModelGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ModelFile {
    pub fn new(model: &CompositeModel, x: &[f64], pack: Option<&str>) -> Self {
        Self {
            tool: "pahfit".to_string(),
            generated: Local::now().to_rfc3339(),
            pack: pack.map(str::to_string),
            model: model.clone(),
            grid: ModelGrid {
                x: x.to_vec(),
                y: model.evaluate(x),
            },
        }
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, file: &ModelFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let model: ModelFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    Ok(model)
}

/// Write a spectrum as `wavelength,flux[,unc]` CSV.
pub fn write_spectrum_csv(path: &Path, obs: &Observations) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create spectrum CSV '{}': {e}", path.display())))?;
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write spectrum CSV: {e}"));

    match &obs.unc {
        Some(unc) => {
            writer.write_record(["wavelength", "flux", "unc"]).map_err(write_err)?;
            for ((x, y), u) in obs.x.iter().zip(&obs.y).zip(unc) {
                writer
                    .write_record([x.to_string(), y.to_string(), u.to_string()])
                    .map_err(write_err)?;
            }
        }
        None => {
            writer.write_record(["wavelength", "flux"]).map_err(write_err)?;
            for (x, y) in obs.x.iter().zip(&obs.y) {
                writer
                    .write_record([x.to_string(), y.to_string()])
                    .map_err(write_err)?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write spectrum CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundedParam, ProfileInfo};
    use crate::io::ingest::load_spectrum;
    use crate::models::Component;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pahfit_export_{}_{name}", std::process::id()))
    }

    #[test]
    fn model_json_reloads_and_evaluates_identically() {
        let model = CompositeModel::from_components([Component::Drude(ProfileInfo {
            name: "PAH_11.3".to_string(),
            x_0: BoundedParam::fixed(11.33),
            fwhm: BoundedParam::fixed(0.36),
            amplitude: BoundedParam::free(4.0).with_bounds(Some(0.0), None),
        })]);
        let x = [10.0, 11.33, 12.0];
        let path = temp_path("model.json");

        write_model_json(&path, &ModelFile::new(&model, &x, Some("test_pack"))).unwrap();
        let loaded = read_model_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.model, model);
        assert_eq!(loaded.pack.as_deref(), Some("test_pack"));
        for (a, b) in loaded.grid.y.iter().zip(model.evaluate(&x)) {
            assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0));
        }
    }

    #[test]
    fn spectrum_csv_is_readable_by_ingest() {
        let obs = Observations::new(vec![5.0, 6.0], vec![1.5, 2.5], Some(vec![0.1, 0.2])).unwrap();
        let path = temp_path("spectrum.csv");

        write_spectrum_csv(&path, &obs).unwrap();
        let back = load_spectrum(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.observations, obs);
    }
}
