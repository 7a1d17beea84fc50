//! Science pack table reader.
//!
//! Two encodings are supported:
//! - **IPAC** text tables (`.ipac`, `.tbl`): `|`-delimited header lines define
//!   column names and boundaries; data lines are sliced at those boundaries.
//! - **CSV** (`.csv`): a header row with the same column names.
//!
//! Blank cells, `nan` and the IPAC null token of a column are stored as
//! missing, so consumers only ever see `Option<&str>`.
//!
//! IPAC column boundaries are character positions, not byte offsets.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use crate::error::AppError;

/// Default IPAC null token when the header does not declare one.
const IPAC_DEFAULT_NULL: &str = "null";

/// One row of a pack table.
#[derive(Debug, Clone, PartialEq)]
pub struct PackRow {
    /// 1-based line number in the source file.
    pub line: usize,
    cells: BTreeMap<String, String>,
}

impl PackRow {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            cells: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and synthetic packs.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.set(column, value);
        self
    }

    /// Store a cell; blank and `nan` values are treated as missing.
    pub fn set(&mut self, column: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("nan") {
            self.cells.remove(column);
        } else {
            self.cells.insert(column.to_string(), value.to_string());
        }
    }

    /// Non-missing cell value.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// The `Form` discriminator, if present.
    pub fn form(&self) -> Option<&str> {
        self.get("Form")
    }

    /// The row's `Name`, falling back to `row<line>`.
    pub fn name(&self) -> String {
        self.get("Name")
            .map(str::to_string)
            .unwrap_or_else(|| format!("row{}", self.line))
    }
}

/// A parsed pack table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackTable {
    columns: Vec<String>,
    rows: Vec<PackRow>,
}

impl PackTable {
    pub fn new(columns: Vec<String>, rows: Vec<PackRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[PackRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct `Form` values present in the table.
    pub fn forms(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter_map(|r| r.form().map(str::to_string))
            .collect()
    }

    /// Copy of the table keeping only rows for which `keep` returns true.
    pub fn filtered(&self, keep: impl Fn(&PackRow) -> bool) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Copy of the table without rows whose `Form` equals `form`.
    pub fn without_form(&self, form: &str) -> Self {
        self.filtered(|r| r.form() != Some(form))
    }

    /// Copy of the table keeping only rows whose `Form` is in `forms`.
    pub fn retain_forms(&self, forms: &[&str]) -> Self {
        self.filtered(|r| r.form().is_some_and(|f| forms.contains(&f)))
    }
}

/// Read a pack table, dispatching on the file extension.
pub fn read_pack_table(path: &Path) -> Result<PackTable, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "ipac" | "tbl" => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                AppError::new(2, format!("Failed to read pack '{}': {e}", path.display()))
            })?;
            parse_ipac(&text)
                .map_err(|e| AppError::new(2, format!("Invalid IPAC table '{}': {e}", path.display())))
        }
        "csv" => {
            let file = File::open(path).map_err(|e| {
                AppError::new(2, format!("Failed to open pack '{}': {e}", path.display()))
            })?;
            parse_csv(file)
                .map_err(|e| AppError::new(2, format!("Invalid CSV pack '{}': {e}", path.display())))
        }
        other => Err(AppError::new(
            2,
            format!("Unsupported pack table extension: .{other} (expected .ipac, .tbl or .csv)"),
        )),
    }
}

/// Parse an IPAC text table.
pub fn parse_ipac(text: &str) -> Result<PackTable, String> {
    let mut columns: Vec<String> = Vec::new();
    let mut bounds: Vec<usize> = Vec::new();
    let mut nulls: Vec<String> = Vec::new();
    let mut header_lines = 0usize;
    let mut rows = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');

        if line.trim().is_empty() || line.starts_with('\\') {
            continue;
        }

        if line.starts_with('|') {
            if !rows.is_empty() {
                return Err(format!("line {line_no}: header line after data"));
            }
            match header_lines {
                0 => {
                    bounds = line
                        .chars()
                        .enumerate()
                        .filter(|(_, c)| *c == '|')
                        .map(|(i, _)| i)
                        .collect();
                    if bounds.len() < 2 {
                        return Err(format!("line {line_no}: header defines no columns"));
                    }
                    columns = header_segments(line, &bounds);
                    ensure_unique(&columns)?;
                    nulls = vec![IPAC_DEFAULT_NULL.to_string(); columns.len()];
                }
                // Types and units are not needed to read the pack.
                1 | 2 => {}
                3 => {
                    for (slot, token) in nulls.iter_mut().zip(header_segments(line, &bounds)) {
                        if !token.is_empty() {
                            *slot = token;
                        }
                    }
                }
                _ => return Err(format!("line {line_no}: too many header lines")),
            }
            header_lines += 1;
            continue;
        }

        if columns.is_empty() {
            return Err(format!("line {line_no}: data before the column header"));
        }

        let mut row = PackRow::new(line_no);
        for (i, column) in columns.iter().enumerate() {
            let cell = data_cell(line, &bounds, i);
            if cell == nulls[i] {
                continue;
            }
            row.set(column, &cell);
        }
        rows.push(row);
    }

    if columns.is_empty() {
        return Err("no column header found".to_string());
    }

    Ok(PackTable::new(columns, rows))
}

/// Parse a CSV pack table from any reader.
pub fn parse_csv<R: std::io::Read>(reader: R) -> Result<PackTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| format!("failed to read header: {e}"))?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    ensure_unique(&columns)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        let record = result.map_err(|e| format!("line {line}: {e}"))?;
        let mut row = PackRow::new(line);
        for (column, value) in columns.iter().zip(record.iter()) {
            row.set(column, value);
        }
        rows.push(row);
    }

    Ok(PackTable::new(columns, rows))
}

fn header_segments(line: &str, bounds: &[usize]) -> Vec<String> {
    bounds
        .windows(2)
        .map(|w| slice_chars(line, w[0] + 1, w[1]).trim().to_string())
        .collect()
}

fn data_cell(line: &str, bounds: &[usize], col: usize) -> String {
    let start = bounds[col];
    // The last column runs to the end of the line, even past its header.
    let end = if col + 2 == bounds.len() {
        line.chars().count().max(bounds[col + 1])
    } else {
        bounds[col + 1]
    };
    slice_chars(line, start, end).trim().to_string()
}

/// Characters `[start, end)` of `line`; positions past the end are empty.
fn slice_chars(line: &str, start: usize, end: usize) -> String {
    if start >= end {
        return String::new();
    }
    line.chars().skip(start).take(end - start).collect()
}

fn ensure_unique(columns: &[String]) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for c in columns {
        if c.is_empty() {
            return Err("empty column name".to_string());
        }
        if !seen.insert(c.as_str()) {
            return Err(format!("duplicate column `{c}`"));
        }
    }
    Ok(())
}
