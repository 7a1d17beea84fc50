//! Pack rows → `ParameterInfo`.
//!
//! Each row's `Form` selects a kind; the kind decides which parameter columns
//! are required. A parameter `p` is read from the column group
//! `p`, `p_min`, `p_max`, `p_fixed`:
//!
//! - the value must be present and finite
//! - missing or non-finite bounds are open
//! - a missing fixed flag means free

use crate::domain::{
    AttenuationInfo, BoundedParam, ComponentKind, ContinuumInfo, ParameterInfo, ProfileInfo,
};
use crate::error::ModelError;
use crate::io::table::{PackRow, PackTable};

/// Parse a whole table, checking the required `Form` column first.
pub fn parse_table(table: &PackTable) -> Result<ParameterInfo, ModelError> {
    if !table.has_column("Form") {
        return Err(ModelError::MissingColumn("Form".to_string()));
    }
    parse_specification(table.rows())
}

/// Group rows by component kind.
///
/// Unknown forms abort with `UnrecognizedComponentKind`; kinds without rows
/// end up as empty groups.
pub fn parse_specification(rows: &[PackRow]) -> Result<ParameterInfo, ModelError> {
    let mut info = ParameterInfo::default();

    for row in rows {
        let form = row.form().unwrap_or("");
        let kind = ComponentKind::from_form(form).ok_or_else(|| {
            ModelError::UnrecognizedComponentKind {
                line: row.line,
                name: row.name(),
                form: form.to_string(),
            }
        })?;

        let reader = RowReader { row, kind };
        match kind {
            ComponentKind::BlackBody => info.blackbody.push(reader.continuum()?),
            ComponentKind::ModifiedBlackBody => info.modified_blackbody.push(reader.continuum()?),
            ComponentKind::Gaussian => info.gaussian.push(reader.profile()?),
            ComponentKind::Drude => info.drude.push(reader.profile()?),
            ComponentKind::Attenuation => info.attenuation.push(reader.attenuation()?),
            ComponentKind::AttDrude => {
                let p = reader.profile()?;
                reader.check(p.amplitude.value >= 0.0, "amp", "optical depth must be >= 0")?;
                info.att_drude.push(p);
            }
        }
    }

    log::debug!(
        "parsed {} rows: {}",
        rows.len(),
        info.counts()
            .iter()
            .map(|(k, n)| format!("{}={n}", k.form()))
            .collect::<Vec<_>>()
            .join(" ")
    );

    Ok(info)
}

struct RowReader<'a> {
    row: &'a PackRow,
    kind: ComponentKind,
}

impl RowReader<'_> {
    fn continuum(&self) -> Result<ContinuumInfo, ModelError> {
        let temperature = self.param("temp")?;
        self.check(temperature.value > 0.0, "temp", "temperature must be > 0")?;
        Ok(ContinuumInfo {
            name: self.row.name(),
            temperature,
            amplitude: self.param("amp")?,
        })
    }

    fn profile(&self) -> Result<ProfileInfo, ModelError> {
        let x_0 = self.param("x_0")?;
        self.check(x_0.value > 0.0, "x_0", "center must be > 0")?;
        let fwhm = self.param("fwhm")?;
        self.check(fwhm.value > 0.0, "fwhm", "width must be > 0")?;
        Ok(ProfileInfo {
            name: self.row.name(),
            x_0,
            fwhm,
            amplitude: self.param("amp")?,
        })
    }

    fn attenuation(&self) -> Result<AttenuationInfo, ModelError> {
        let tau_sil = self.param("amp")?;
        self.check(tau_sil.value >= 0.0, "amp", "optical depth must be >= 0")?;
        Ok(AttenuationInfo {
            name: self.row.name(),
            tau_sil,
        })
    }

    fn param(&self, field: &str) -> Result<BoundedParam, ModelError> {
        let raw = self
            .row
            .get(field)
            .ok_or_else(|| self.malformed(field, "missing value"))?;
        let value = parse_f64(raw).ok_or_else(|| self.malformed(field, &format!("'{raw}' is not a number")))?;
        if !value.is_finite() {
            return Err(self.malformed(field, "value must be finite"));
        }

        let min = self.bound(&format!("{field}_min"))?;
        let max = self.bound(&format!("{field}_max"))?;
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(self.malformed(field, &format!("bounds are inverted ({lo} > {hi})")));
            }
        }

        let fixed_col = format!("{field}_fixed");
        let fixed = match self.row.get(&fixed_col) {
            None => false,
            Some(s) => parse_bool(s)
                .ok_or_else(|| self.malformed(&fixed_col, &format!("'{s}' is not a boolean")))?,
        };

        let param = BoundedParam {
            value,
            min,
            max,
            fixed,
        };
        if !param.contains(value) {
            return Err(self.malformed(field, &format!("value {value} lies outside its bounds")));
        }
        Ok(param)
    }

    fn bound(&self, column: &str) -> Result<Option<f64>, ModelError> {
        match self.row.get(column) {
            None => Ok(None),
            Some(raw) => {
                let v = parse_f64(raw)
                    .ok_or_else(|| self.malformed(column, &format!("'{raw}' is not a number")))?;
                Ok(v.is_finite().then_some(v))
            }
        }
    }

    fn check(&self, ok: bool, field: &str, reason: &str) -> Result<(), ModelError> {
        if ok { Ok(()) } else { Err(self.malformed(field, reason)) }
    }

    fn malformed(&self, field: &str, reason: &str) -> ModelError {
        ModelError::MalformedParameterRow {
            line: self.row.line,
            name: self.row.name(),
            kind: self.kind,
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(line: usize, name: &str, temp: &str) -> PackRow {
        PackRow::new(line)
            .with("Name", name)
            .with("Form", "BlackBody1D")
            .with("temp", temp)
            .with("temp_fixed", "True")
            .with("amp", "0.0")
            .with("amp_min", "0.0")
            .with("amp_max", "null-ish")
    }

    fn drude(line: usize, name: &str, x_0: &str) -> PackRow {
        PackRow::new(line)
            .with("Name", name)
            .with("Form", "Drude1D")
            .with("x_0", x_0)
            .with("x_0_min", "6.1")
            .with("x_0_max", "6.3")
            .with("fwhm", "0.19")
            .with("fwhm_fixed", "True")
            .with("amp", "1.0")
            .with("amp_min", "0")
            .with("amp_max", "nan")
    }

    #[test]
    fn groups_rows_by_form_with_empty_groups_present() {
        let rows = vec![drude(2, "PAH_6.2", "6.22")];
        let info = parse_specification(&rows).unwrap();
        assert_eq!(info.count(ComponentKind::Drude), 1);
        assert!(info.gaussian.is_empty());
        assert!(info.blackbody.is_empty());

        let p = &info.drude[0];
        assert_eq!(p.x_0, BoundedParam::free(6.22).with_bounds(Some(6.1), Some(6.3)));
        assert!(p.fwhm.fixed);
        assert_eq!(p.amplitude.min, Some(0.0));
        assert_eq!(p.amplitude.max, None, "nan bound is open");
    }

    #[test]
    fn unknown_form_is_rejected_with_row_identity() {
        let rows = vec![
            drude(2, "PAH_6.2", "6.22"),
            PackRow::new(3).with("Name", "L1").with("Form", "Lorentz1D"),
        ];
        let err = parse_specification(&rows).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnrecognizedComponentKind {
                line: 3,
                name: "L1".to_string(),
                form: "Lorentz1D".to_string(),
            }
        );
    }

    #[test]
    fn malformed_rows_name_the_field() {
        let err = parse_specification(&[drude(4, "PAH_bad", "abc")]).unwrap_err();
        match err {
            ModelError::MalformedParameterRow { line, kind, field, .. } => {
                assert_eq!(line, 4);
                assert_eq!(kind, ComponentKind::Drude);
                assert_eq!(field, "x_0");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let missing_temp = PackRow::new(5)
            .with("Name", "BB")
            .with("Form", "BlackBody1D")
            .with("amp", "1");
        assert!(matches!(
            parse_specification(&[missing_temp]),
            Err(ModelError::MalformedParameterRow { ref field, .. }) if field == "temp"
        ));

        let out_of_bounds = drude(6, "PAH_far", "7.0");
        assert!(matches!(
            parse_specification(&[out_of_bounds]),
            Err(ModelError::MalformedParameterRow { .. })
        ));
    }

    #[test]
    fn non_numeric_bound_is_malformed() {
        let err = parse_specification(&[bb(2, "BB300", "300")]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::MalformedParameterRow { ref field, .. } if field == "amp_max"
        ));
    }

    #[test]
    fn attenuation_reads_tau_from_amp() {
        let row = PackRow::new(2)
            .with("Name", "S07_att")
            .with("Form", "S07_attenuation")
            .with("amp", "0.5")
            .with("amp_min", "0")
            .with("amp_max", "10");
        let info = parse_specification(&[row]).unwrap();
        assert_eq!(info.attenuation[0].tau_sil.value, 0.5);
        assert_eq!(info.attenuation[0].tau_sil.max, Some(10.0));
    }

    #[test]
    fn nan_fixed_flag_means_free() {
        let table = crate::io::table::parse_ipac(
            "\
| Name     | Form        | x_0    | fwhm   | amp    | amp_fixed |
  PAH_6.2    Drude1D       6.22     0.19     1.0      nan
",
        )
        .unwrap();
        let info = parse_table(&table).unwrap();
        assert!(!info.drude[0].amplitude.fixed);
        assert_eq!(info.drude[0].amplitude.value, 1.0);
    }

    #[test]
    fn missing_form_column_is_reported() {
        let table = PackTable::new(vec!["Name".to_string()], Vec::new());
        assert_eq!(
            parse_table(&table).unwrap_err(),
            ModelError::MissingColumn("Form".to_string())
        );
    }
}
