//! Model construction from a parameter grouping.
//!
//! The builder walks every known kind in assembly order, turns each non-empty
//! group into sub-models, and skips empty groups entirely. A missing category
//! is never an error; only the caller's `require_components` policy can turn
//! an empty result into one.

use crate::domain::{BuildOptions, ComponentKind, Observations, ParameterInfo};
use crate::error::ModelError;
use crate::models::{Component, CompositeModel};
use crate::pack::estimate_start;

/// Build a composite model from observations and a parameter grouping.
///
/// When `options.estimate_start` is set, free amplitudes are first estimated
/// from the observed spectrum (see [`crate::pack::estimate_start`]).
pub fn build_model(
    obs: &Observations,
    info: &ParameterInfo,
    options: &BuildOptions,
) -> Result<CompositeModel, ModelError> {
    obs.validate()?;

    let estimated;
    let info = if options.estimate_start {
        estimated = estimate_start(obs, info);
        &estimated
    } else {
        info
    };

    let mut model = CompositeModel::default();
    for kind in ComponentKind::ALL {
        let components = components_for(kind, info);
        if components.is_empty() {
            log::debug!("no {} components; skipping", kind.form());
            continue;
        }
        log::debug!("adding {} {} components", components.len(), kind.form());
        for c in components {
            model.push(c);
        }
    }

    if model.is_empty() {
        if options.require_components {
            return Err(ModelError::EmptyModel);
        }
        log::warn!("no sub-models constructed; returning a zero model");
    }

    Ok(model)
}

/// Sub-models for one kind, in table order.
pub fn components_for(kind: ComponentKind, info: &ParameterInfo) -> Vec<Component> {
    match kind {
        ComponentKind::BlackBody => info.blackbody.iter().cloned().map(Component::BlackBody).collect(),
        ComponentKind::ModifiedBlackBody => info
            .modified_blackbody
            .iter()
            .cloned()
            .map(Component::ModifiedBlackBody)
            .collect(),
        ComponentKind::Gaussian => info.gaussian.iter().cloned().map(Component::Gaussian).collect(),
        ComponentKind::Drude => info.drude.iter().cloned().map(Component::Drude).collect(),
        ComponentKind::Attenuation => info
            .attenuation
            .iter()
            .cloned()
            .map(Component::Attenuation)
            .collect(),
        ComponentKind::AttDrude => info.att_drude.iter().cloned().map(Component::AttDrude).collect(),
    }
}
