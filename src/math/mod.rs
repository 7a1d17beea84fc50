//! Mathematical utilities: interpolation and weighted least squares.

pub mod interp;
pub mod ols;

pub use interp::*;
pub use ols::*;
