//! Science pack interpretation.
//!
//! - `parse`: pack rows → per-kind parameter groups
//! - `estimate`: starting amplitudes from an observed spectrum

pub mod estimate;
pub mod parse;

pub use estimate::*;
pub use parse::*;
