//! Fitting support.
//!
//! - `amplitudes`: linear refinement of free additive amplitudes
//! - `trim`: component-removal regression runner (parallel)

pub mod amplitudes;
pub mod trim;

pub use amplitudes::*;
pub use trim::*;
