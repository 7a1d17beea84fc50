//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - component kinds and bounded parameters (`ComponentKind`, `BoundedParam`)
//! - the per-kind parameter grouping parsed from a pack (`ParameterInfo`)
//! - observed spectra and run configuration (`Observations`, `BuildConfig`)

pub mod types;

pub use types::*;
