//! Shared "build pipeline" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! pack lookup -> table read -> form exclusion -> parse -> observations -> build -> refine
//!
//! The subcommand handlers can then focus on presentation and exports.

use std::path::PathBuf;

use crate::data::ramp_observations;
use crate::domain::{BuildConfig, ComponentKind, Observations, SpectrumSource};
use crate::error::AppError;
use crate::fit::{AmplitudeFit, refine_amplitudes};
use crate::io::{PackTable, find_packfile, load_spectrum, read_pack_table};
use crate::models::{CompositeModel, build_model};
use crate::pack::parse_table;

/// A resolved and filtered science pack.
#[derive(Debug, Clone)]
pub struct LoadedPack {
    pub path: PathBuf,
    pub table: PackTable,
}

/// All computed outputs of a single `pahfit build` run.
#[derive(Debug, Clone)]
pub struct BuildRun {
    pub pack: LoadedPack,
    pub observations: Observations,
    /// Spectrum rows skipped during ingest (0 for ramps).
    pub skipped_rows: usize,
    pub model: CompositeModel,
    pub refinement: Option<AmplitudeFit>,
}

/// Resolve a pack and drop the excluded forms.
pub fn load_pack(name: &str, exclude: &[ComponentKind]) -> Result<LoadedPack, AppError> {
    let path = find_packfile(name)?;
    log::info!("using science pack {}", path.display());

    let mut table = read_pack_table(&path)?;
    for kind in exclude {
        let before = table.len();
        table = table.without_form(kind.form());
        log::info!("excluded {} {} rows", before - table.len(), kind.form());
    }
    Ok(LoadedPack { path, table })
}

/// Load observations from a CSV file or generate a ramp.
///
/// Returns the observations and the number of skipped input rows.
pub fn load_observations(source: &SpectrumSource) -> Result<(Observations, usize), AppError> {
    match source {
        SpectrumSource::File(path) => {
            let ingested = load_spectrum(path)?;
            log::info!(
                "read {} of {} spectrum rows from {}",
                ingested.observations.len(),
                ingested.rows_read,
                path.display()
            );
            Ok((ingested.observations, ingested.row_errors.len()))
        }
        SpectrumSource::Ramp {
            points,
            x_min,
            x_max,
        } => Ok((ramp_observations(*points, *x_min, *x_max)?, 0)),
    }
}

/// Execute the full build pipeline and return the computed outputs.
pub fn run_build(config: &BuildConfig) -> Result<BuildRun, AppError> {
    // 1) Resolve and read the pack.
    let pack = load_pack(&config.pack, &config.exclude)?;

    // 2) Parse rows into per-kind groups.
    let info = parse_table(&pack.table)?;
    log::debug!("pack provides {:?}", info.present_kinds());

    // 3) Observations.
    let (observations, skipped_rows) = load_observations(&config.spectrum)?;

    // 4) Build, then optionally refine amplitudes.
    let mut model = build_model(&observations, &info, &config.options)?;
    let refinement = if config.refine {
        Some(refine_amplitudes(&mut model, &observations)?)
    } else {
        None
    };

    Ok(BuildRun {
        pack,
        observations,
        skipped_rows,
        model,
        refinement,
    })
}
