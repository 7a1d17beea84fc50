//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model and pack code stays free of presentation concerns
//! - output changes are localized

use crate::domain::{BoundedParam, ComponentKind, Observations};
use crate::fit::{AmplitudeFit, TrimOutcome};
use crate::models::CompositeModel;
use crate::report::SpectrumResidual;

/// Format the build summary (inputs, per-kind counts, optional refinement).
pub fn format_model_summary(
    pack: &str,
    obs: &Observations,
    model: &CompositeModel,
    refinement: Option<&AmplitudeFit>,
) -> String {
    let mut out = String::new();

    out.push_str("=== pahfit - model build ===\n");
    out.push_str(&format!("Pack: {pack}\n"));
    let (lo, hi) = obs.x_range();
    out.push_str(&format!(
        "Spectrum: n={} | wavelength=[{lo:.3}, {hi:.3}]um | unc={}\n",
        obs.len(),
        if obs.unc.is_some() { "yes" } else { "no" },
    ));

    out.push_str("\nSub-models:\n");
    for kind in ComponentKind::ALL {
        let n = model.count(kind);
        let count = if n == 0 { "-".to_string() } else { n.to_string() };
        out.push_str(&format!(
            "  {:<20} {:<28} {count}\n",
            kind.form(),
            kind.display_name()
        ));
    }
    out.push_str(&format!(
        "  total={} | free parameters={}\n",
        model.len(),
        model.free_parameters().len()
    ));
    if model.is_degenerate() {
        out.push_str("  (no additive sub-models: model is zero everywhere)\n");
    }

    if let Some(fit) = refinement {
        out.push_str("\nAmplitude refinement:\n");
        out.push_str(&format!(
            "  free amplitudes={} at bound={} SSE={:.4e} RMSE={:.4e} (start {:.4e})\n",
            fit.n_free, fit.n_at_bound, fit.sse, fit.rmse, fit.start_rmse
        ));
        if fit.kept_start {
            out.push_str("  (solution did not improve the fit; starting amplitudes kept)\n");
        }
    }
    out.push('\n');

    out
}

/// Format one line per sub-model with its parameters.
pub fn format_components(model: &CompositeModel) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<16} {:<20} {}", "name", "form", "parameters").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<16} {:-<20} {:-<10}", "", "", ""));
    out.push('\n');

    for c in model.components() {
        let params: Vec<String> = c
            .parameters()
            .into_iter()
            .map(|(name, p)| format!("{name}={}", fmt_param(p)))
            .collect();
        out.push_str(
            format!(
                "{:<16} {:<20} {}",
                truncate(c.name(), 16),
                c.kind().form(),
                params.join(" ")
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the trimming regression table.
pub fn format_trim_report(outcomes: &[TrimOutcome]) -> String {
    let mut out = String::new();

    out.push_str("=== pahfit - component removal check ===\n");
    out.push_str(
        format!("{:<30} {:>6} {:>8} {:<6} {}", "case", "rows", "models", "status", "detail").trim_end(),
    );
    out.push('\n');
    out.push_str(&format!("{:-<30} {:-<6} {:-<8} {:-<6} {:-<10}", "", "", "", "", ""));
    out.push('\n');

    for o in outcomes {
        let status = if o.passed() { "ok" } else { "FAIL" };
        let detail = match &o.result {
            Ok(_) if !o.finite => "non-finite model values".to_string(),
            Ok(counts) => fmt_counts(counts),
            Err(e) => e.clone(),
        };
        out.push_str(
            format!(
                "{:<30} {:>6} {:>8} {:<6} {}",
                o.label(),
                o.rows,
                o.total(),
                status,
                detail
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    out.push_str(&format!("\n{} cases, {failed} failed\n", outcomes.len()));
    out
}

/// Format the largest residuals.
pub fn format_residuals(rows: &[SpectrumResidual]) -> String {
    let mut out = String::new();
    out.push_str("Largest residuals:\n");
    out.push_str(&format!("{:>10} {:>12} {:>12} {:>12}\n", "x", "y_obs", "y_model", "residual"));
    out.push_str(&format!("{:->10} {:->12} {:->12} {:->12}\n", "", "", "", ""));
    for r in rows {
        out.push_str(&format!(
            "{:>10.4} {:>12.4e} {:>12.4e} {:>12.4e}\n",
            r.x, r.y_obs, r.y_model, r.residual
        ));
    }
    out
}

fn fmt_counts(counts: &[(ComponentKind, usize)]) -> String {
    let parts: Vec<String> = counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(k, n)| format!("{}={n}", k.form()))
        .collect();
    if parts.is_empty() {
        "empty model".to_string()
    } else {
        parts.join(" ")
    }
}

fn fmt_param(p: &BoundedParam) -> String {
    if p.fixed {
        format!("{:.4}(fixed)", p.value)
    } else {
        format!("{:.4}", p.value)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProfileInfo;
    use crate::models::Component;

    fn model() -> CompositeModel {
        CompositeModel::from_components([Component::Drude(ProfileInfo {
            name: "PAH_11.3_complex_long_name".to_string(),
            x_0: BoundedParam::fixed(11.33),
            fwhm: BoundedParam::fixed(0.36),
            amplitude: BoundedParam::free(2.5),
        })])
    }

    #[test]
    fn summary_lists_every_kind() {
        let obs = Observations::new(vec![5.0, 20.0], vec![1.0, 2.0], None).unwrap();
        let s = format_model_summary("scipack", &obs, &model(), None);
        for kind in ComponentKind::ALL {
            assert!(s.contains(kind.form()), "missing {kind}");
        }
        assert!(s.contains("total=1 | free parameters=1"));
        assert!(!s.contains("refinement"));
    }

    #[test]
    fn components_table_truncates_names_and_marks_fixed() {
        let s = format_components(&model());
        assert!(s.contains("PAH_11.3_comple."));
        assert!(s.contains("x_0=11.3300(fixed)"));
        assert!(s.contains("amplitude=2.5000"));
    }

    #[test]
    fn trim_report_counts_failures() {
        let outcomes = vec![
            TrimOutcome {
                removed: None,
                rows: 3,
                result: Ok(vec![(ComponentKind::Drude, 3)]),
                finite: true,
            },
            TrimOutcome {
                removed: Some(ComponentKind::Drude),
                rows: 0,
                result: Err("boom".to_string()),
                finite: false,
            },
        ];
        let s = format_trim_report(&outcomes);
        assert!(s.contains("full table"));
        assert!(s.contains("without Drude1D"));
        assert!(s.contains("Drude1D=3"));
        assert!(s.contains("boom"));
        assert!(s.contains("2 cases, 1 failed"));
    }
}
