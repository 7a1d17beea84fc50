//! Command-line parsing for the PAHFIT model builder.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ComponentKind, SpectrumSource};

/// Science pack used when `--pack` is not given.
pub const DEFAULT_PACK: &str = "scipack_ExGal_SpitzerIRSSLLL";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pahfit", version, about = "Build PAHFIT spectral models from science packs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a model from a science pack and print its summary.
    Build(BuildArgs),
    /// Build the pack with each component form removed and check every case.
    TrimCheck(TrimArgs),
    /// Evaluate a pack's model on a grid, add noise, and write a spectrum CSV.
    Simulate(SimulateArgs),
    /// Evaluate a previously exported model JSON.
    Eval(EvalArgs),
}

/// Where observations come from: a CSV file or an evenly spaced ramp.
#[derive(Debug, Args, Clone)]
pub struct SpectrumArgs {
    /// Observed spectrum CSV (`wavelength,flux[,unc]`). Without it a ramp is used.
    #[arg(long, value_name = "CSV")]
    pub spectrum: Option<PathBuf>,

    /// Number of ramp samples.
    #[arg(long, default_value_t = 100)]
    pub points: usize,

    /// Ramp start wavelength (micron).
    #[arg(long, default_value_t = 1.0)]
    pub x_min: f64,

    /// Ramp end wavelength (micron).
    #[arg(long, default_value_t = 30.0)]
    pub x_max: f64,
}

impl SpectrumArgs {
    pub fn source(&self) -> SpectrumSource {
        match &self.spectrum {
            Some(path) => SpectrumSource::File(path.clone()),
            None => SpectrumSource::Ramp {
                points: self.points,
                x_min: self.x_min,
                x_max: self.x_max,
            },
        }
    }
}

/// Options for `build`.
#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    /// Science pack name or path.
    #[arg(long, default_value = DEFAULT_PACK)]
    pub pack: String,

    #[command(flatten)]
    pub spectrum: SpectrumArgs,

    /// Keep the pack's starting amplitudes instead of estimating them.
    #[arg(long)]
    pub no_estimate: bool,

    /// Solve for free amplitudes after building.
    #[arg(long)]
    pub refine: bool,

    /// Fail if no sub-models are constructed.
    #[arg(long)]
    pub require_components: bool,

    /// Drop every row of this form before parsing (repeatable).
    #[arg(long, value_name = "FORM")]
    pub exclude: Vec<ComponentKind>,

    /// Print one line per sub-model.
    #[arg(long)]
    pub components: bool,

    /// Show the N largest residuals.
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Export the model (parameters + evaluated grid) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options for `trim-check`.
#[derive(Debug, Args, Clone)]
pub struct TrimArgs {
    /// Science pack name or path.
    #[arg(long, default_value = DEFAULT_PACK)]
    pub pack: String,

    #[command(flatten)]
    pub spectrum: SpectrumArgs,

    /// Keep the pack's starting amplitudes instead of estimating them.
    #[arg(long)]
    pub no_estimate: bool,
}

/// Options for `simulate`.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Science pack name or path.
    #[arg(long, default_value = DEFAULT_PACK)]
    pub pack: String,

    /// Wavelength grid (taken from `--spectrum` if given, otherwise a ramp).
    #[command(flatten)]
    pub spectrum: SpectrumArgs,

    /// Drop every row of this form before parsing (repeatable).
    #[arg(long, value_name = "FORM")]
    pub exclude: Vec<ComponentKind>,

    /// Relative Gaussian noise level.
    #[arg(long, default_value_t = 0.02)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output spectrum CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

/// Options for `eval`.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    /// Model JSON produced by `pahfit build --export`.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    #[command(flatten)]
    pub spectrum: SpectrumArgs,

    /// Write the evaluated spectrum to CSV instead of printing it.
    #[arg(long, value_name = "CSV")]
    pub out: Option<PathBuf>,
}
