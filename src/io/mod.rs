//! Input/output helpers.
//!
//! - science pack lookup (`packs`) and table reading (`table`)
//! - observed spectrum CSV ingest (`ingest`)
//! - model JSON and spectrum CSV exports (`export`)

pub mod export;
pub mod ingest;
pub mod packs;
pub mod table;

pub use export::*;
pub use ingest::*;
pub use packs::*;
pub use table::*;
