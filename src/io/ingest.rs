//! Observed spectrum CSV ingest.
//!
//! Turns a spectrum CSV into clean `Observations`:
//! - **Strict schema** for required columns (wavelength and flux)
//! - **Row-level validation**: bad rows are skipped and reported
//! - rows are sorted by wavelength

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Observations;
use crate::error::AppError;

const X_COLUMNS: [&str; 4] = ["wavelength", "x", "lambda", "wave"];
const Y_COLUMNS: [&str; 3] = ["flux", "y", "intensity"];
const UNC_COLUMNS: [&str; 4] = ["unc", "uncertainty", "error", "flux_unc"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: observations plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedSpectrum {
    pub observations: Observations,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load an observed spectrum from a CSV file.
pub fn load_spectrum(path: &Path) -> Result<IngestedSpectrum, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open spectrum '{}': {e}", path.display()))
    })?;
    read_spectrum(file)
}

/// Load an observed spectrum from any CSV reader.
pub fn read_spectrum<R: std::io::Read>(reader: R) -> Result<IngestedSpectrum, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read spectrum headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let x_idx = find_column(&header_map, &X_COLUMNS).ok_or_else(|| {
        AppError::new(2, "Missing required column: `wavelength` (or `x`, `lambda`, `wave`)")
    })?;
    let y_idx = find_column(&header_map, &Y_COLUMNS)
        .ok_or_else(|| AppError::new(2, "Missing required column: `flux` (or `y`, `intensity`)"))?;
    let unc_idx = find_column(&header_map, &UNC_COLUMNS);

    let mut points: Vec<(f64, f64, Option<f64>)> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header line.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, x_idx, y_idx, unc_idx) {
            Ok(p) => points.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    for e in &row_errors {
        log::warn!("skipping spectrum line {}: {}", e.line, e.message);
    }

    if points.is_empty() {
        return Err(AppError::new(3, "No valid spectrum rows remain after validation."));
    }

    points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    // Uncertainties are only used when every kept row has one.
    let unc: Option<Vec<f64>> = points.iter().map(|p| p.2).collect();
    let x = points.iter().map(|p| p.0).collect();
    let y = points.iter().map(|p| p.1).collect();

    let observations = Observations::new(x, y, unc)?;
    Ok(IngestedSpectrum {
        observations,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM some tools put in front of the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn parse_row(
    record: &StringRecord,
    x_idx: usize,
    y_idx: usize,
    unc_idx: Option<usize>,
) -> Result<(f64, f64, Option<f64>), String> {
    let x = parse_cell(record, x_idx).ok_or_else(|| "Missing/invalid wavelength.".to_string())?;
    if x <= 0.0 {
        return Err("Wavelength must be > 0.".to_string());
    }
    let y = parse_cell(record, y_idx).ok_or_else(|| "Missing/invalid flux.".to_string())?;
    let unc = match unc_idx {
        None => None,
        Some(i) => match parse_cell(record, i) {
            Some(u) if u > 0.0 => Some(u),
            Some(_) => return Err("Uncertainty must be > 0.".to_string()),
            None => None,
        },
    };
    Ok((x, y, unc))
}

fn parse_cell(record: &StringRecord, idx: usize) -> Option<f64> {
    let v = record.get(idx)?.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
