//! `pahfit-model` library crate.
//!
//! Builds composite spectral models (continuum, line, dust feature and
//! attenuation sub-models) from PAHFIT science pack tables.
//!
//! The binary (`pahfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the builder can be driven directly by external fitters

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod pack;
pub mod report;
