//! Spectral model implementations.
//!
//! - `profiles`: pure line-shape / continuum functions
//! - `component`: one sub-model per pack row
//! - `composite`: the summed and attenuated model
//! - `builder`: parameter grouping → composite model

pub mod builder;
pub mod component;
pub mod composite;
pub mod profiles;

pub use builder::*;
pub use component::*;
pub use composite::*;
