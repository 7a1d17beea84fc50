//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves and reads science packs
//! - builds, checks, simulates or evaluates models
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{BuildArgs, Command, EvalArgs, SimulateArgs, TrimArgs};
use crate::domain::{BuildConfig, BuildOptions};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pahfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::TrimCheck(args) => handle_trim_check(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Eval(args) => handle_eval(args),
    }
}

fn handle_build(args: BuildArgs) -> Result<(), AppError> {
    let config = build_config_from_args(&args);
    let run = pipeline::run_build(&config)?;

    if run.skipped_rows > 0 {
        eprintln!("Skipped {} invalid spectrum rows.", run.skipped_rows);
    }

    let pack_label = run.pack.path.display().to_string();
    println!(
        "{}",
        crate::report::format_model_summary(
            &pack_label,
            &run.observations,
            &run.model,
            run.refinement.as_ref()
        )
    );

    if args.components {
        println!("{}", crate::report::format_components(&run.model));
    }

    if args.top > 0 {
        let residuals = crate::report::compute_residuals(&run.observations, &run.model)?;
        let top = crate::report::largest_residuals(&residuals, args.top);
        println!("{}", crate::report::format_residuals(&top));
    }

    if let Some(path) = &config.export_model {
        let file = crate::io::ModelFile::new(&run.model, &run.observations.x, Some(config.pack.as_str()));
        crate::io::write_model_json(path, &file)?;
        log::info!("wrote model JSON to {}", path.display());
    }

    Ok(())
}

fn handle_trim_check(args: TrimArgs) -> Result<(), AppError> {
    let pack = pipeline::load_pack(&args.pack, &[])?;
    let (obs, _) = pipeline::load_observations(&args.spectrum.source())?;
    let options = BuildOptions {
        estimate_start: !args.no_estimate,
        require_components: false,
    };

    let outcomes = crate::fit::check_trimming(&pack.table, &obs, &options);
    println!("{}", crate::report::format_trim_report(&outcomes));

    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    if failed > 0 {
        return Err(AppError::new(
            4,
            format!("{failed} component removal cases failed."),
        ));
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let pack = pipeline::load_pack(&args.pack, &args.exclude)?;
    let info = crate::pack::parse_table(&pack.table)?;
    let (grid, _) = pipeline::load_observations(&args.spectrum.source())?;

    // The pack's own amplitudes define the simulated source.
    let options = BuildOptions {
        estimate_start: false,
        require_components: true,
    };
    let model = crate::models::build_model(&grid, &info, &options)?;
    let simulated = crate::data::simulate_spectrum(&model, &grid.x, args.noise, args.seed)?;

    crate::io::write_spectrum_csv(&args.out, &simulated)?;
    println!(
        "Wrote {} simulated points from {} sub-models to {}",
        simulated.len(),
        model.len(),
        args.out.display()
    );
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let file = crate::io::read_model_json(&args.model)?;
    let (grid, _) = pipeline::load_observations(&args.spectrum.source())?;

    let y = file.model.evaluate(&grid.x);
    if y.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Model produced non-finite values."));
    }
    let evaluated = crate::domain::Observations::new(grid.x.clone(), y, None)?;

    match &args.out {
        Some(path) => {
            crate::io::write_spectrum_csv(path, &evaluated)?;
            println!("Wrote {} model points to {}", evaluated.len(), path.display());
        }
        None => {
            println!("wavelength,flux");
            for (x, y) in evaluated.x.iter().zip(&evaluated.y) {
                println!("{x},{y}");
            }
        }
    }
    Ok(())
}

pub fn build_config_from_args(args: &BuildArgs) -> BuildConfig {
    BuildConfig {
        pack: args.pack.clone(),
        spectrum: args.spectrum.source(),
        options: BuildOptions {
            estimate_start: !args.no_estimate,
            require_components: args.require_components,
        },
        exclude: args.exclude.clone(),
        refine: args.refine,
        export_model: args.export.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{ComponentKind, SpectrumSource};

    #[test]
    fn build_flags_map_to_config() {
        let cli = Cli::parse_from([
            "pahfit",
            "build",
            "--no-estimate",
            "--require-components",
            "--refine",
            "--exclude",
            "Gaussian1D",
            "--points",
            "50",
            "--export",
            "model.json",
        ]);
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        let config = build_config_from_args(&args);
        assert!(!config.options.estimate_start);
        assert!(config.options.require_components);
        assert!(config.refine);
        assert_eq!(config.exclude, vec![ComponentKind::Gaussian]);
        assert_eq!(
            config.spectrum,
            SpectrumSource::Ramp {
                points: 50,
                x_min: 1.0,
                x_max: 30.0
            }
        );
        assert_eq!(config.export_model.as_deref(), Some(std::path::Path::new("model.json")));
    }
}
