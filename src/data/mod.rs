//! Synthetic spectra.
//!
//! Used by the CLI when no observed spectrum is given, and by tests.

pub mod synthetic;

pub use synthetic::*;
