//! Component-removal regression runner.
//!
//! Builds the model from the full pack and from the pack with each known
//! component form removed, and checks that every case still yields a model
//! that evaluates finitely over the observations.

use rayon::prelude::*;

use crate::domain::{BuildOptions, ComponentKind, Observations};
use crate::io::PackTable;
use crate::models::build_model;
use crate::pack::parse_table;

/// One trimming case and how it went.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimOutcome {
    /// Form removed from the table (`None` for the full table).
    pub removed: Option<ComponentKind>,
    /// Number of table rows left after removal.
    pub rows: usize,
    /// Sub-model count per kind, in `ComponentKind::ALL` order, or the build error.
    pub result: Result<Vec<(ComponentKind, usize)>, String>,
    /// Whether the model evaluated to finite values at every wavelength.
    pub finite: bool,
}

impl TrimOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok() && self.finite
    }

    /// Total sub-models built (0 on failure).
    pub fn total(&self) -> usize {
        match &self.result {
            Ok(counts) => counts.iter().map(|(_, n)| n).sum(),
            Err(_) => 0,
        }
    }

    pub fn label(&self) -> String {
        match self.removed {
            None => "full table".to_string(),
            Some(kind) => format!("without {kind}"),
        }
    }
}

/// Run the full table plus one case per removed kind.
///
/// Cases are evaluated in parallel; the output order is always the full
/// table first, then `ComponentKind::ALL` order.
pub fn check_trimming(
    table: &PackTable,
    obs: &Observations,
    options: &BuildOptions,
) -> Vec<TrimOutcome> {
    let cases: Vec<Option<ComponentKind>> = std::iter::once(None)
        .chain(ComponentKind::ALL.into_iter().map(Some))
        .collect();

    cases
        .par_iter()
        .map(|&removed| run_case(table, obs, options, removed))
        .collect()
}

fn run_case(
    table: &PackTable,
    obs: &Observations,
    options: &BuildOptions,
    removed: Option<ComponentKind>,
) -> TrimOutcome {
    let table = match removed {
        Some(kind) => table.without_form(kind.form()),
        None => table.clone(),
    };

    let built = parse_table(&table).and_then(|info| build_model(obs, &info, options));
    match built {
        Ok(model) => {
            let finite = obs.x.iter().all(|&x| model.evaluate_at(x).is_finite());
            if !finite {
                log::warn!("trim case {:?}: model is not finite over the observations", removed);
            }
            let counts = ComponentKind::ALL
                .into_iter()
                .map(|kind| (kind, model.count(kind)))
                .collect();
            TrimOutcome {
                removed,
                rows: table.len(),
                result: Ok(counts),
                finite,
            }
        }
        Err(e) => TrimOutcome {
            removed,
            rows: table.len(),
            result: Err(e.to_string()),
            finite: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ramp_observations;
    use crate::io::{PackRow, PackTable};

    fn table() -> PackTable {
        let columns = ["Name", "Form", "temp", "amp", "x_0", "fwhm"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let rows = vec![
            PackRow::new(2)
                .with("Name", "BB300")
                .with("Form", "BlackBody1D")
                .with("temp", "300")
                .with("amp", "0"),
            PackRow::new(3)
                .with("Name", "NeII")
                .with("Form", "Gaussian1D")
                .with("x_0", "12.813")
                .with("fwhm", "0.1")
                .with("amp", "1"),
            PackRow::new(4)
                .with("Name", "PAH_11.3")
                .with("Form", "Drude1D")
                .with("x_0", "11.33")
                .with("fwhm", "0.36")
                .with("amp", "1"),
            PackRow::new(5)
                .with("Name", "S07_att")
                .with("Form", "S07_attenuation")
                .with("amp", "0.5"),
        ];
        PackTable::new(columns, rows)
    }

    #[test]
    fn every_removal_case_passes_in_order() {
        let obs = ramp_observations(100, 1.0, 30.0).unwrap();
        let outcomes = check_trimming(&table(), &obs, &BuildOptions::default());

        assert_eq!(outcomes.len(), ComponentKind::ALL.len() + 1);
        assert_eq!(outcomes[0].removed, None);
        assert_eq!(outcomes[0].total(), 4);
        for (outcome, kind) in outcomes[1..].iter().zip(ComponentKind::ALL) {
            assert_eq!(outcome.removed, Some(kind));
            assert!(outcome.passed(), "{}: {:?}", outcome.label(), outcome.result);
        }

        let no_drude = &outcomes[1 + 3];
        assert_eq!(no_drude.removed, Some(ComponentKind::Drude));
        assert_eq!(no_drude.rows, 3);
        assert_eq!(no_drude.total(), 3);
    }

    #[test]
    fn build_errors_are_recorded_not_raised() {
        let mut t = table();
        let mut rows = t.rows().to_vec();
        rows.push(PackRow::new(6).with("Name", "odd").with("Form", "Lorentz1D"));
        t = PackTable::new(t.columns().to_vec(), rows);

        let obs = ramp_observations(10, 1.0, 30.0).unwrap();
        let outcomes = check_trimming(&t, &obs, &BuildOptions::default());
        assert!(outcomes.iter().all(|o| !o.passed()));
        assert!(outcomes[0].result.as_ref().unwrap_err().contains("Lorentz1D"));
    }
}
