//! Table preparation: `RawTable → PreparedTable`.
//!
//! [`prepare_table`] is the only transition. It
//!
//! 1. trims column labels and rejects duplicates ([`IngestionError::ColumnLabelConflict`])
//! 2. replaces blank string cells with nulls
//! 3. runs the numeric classifier over every column (label order)
//! 4. runs the temporal classifier over the columns left
//! 5. runs the text classifier over the rest
//! 6. appends derived month/year/quarter/month-name columns for each temporal column
//!
//! Columns named with a derived suffix (see [`crate::inference::DERIVED_SUFFIXES`]) are never
//! classified, so preparing already-prepared data yields the same derived columns.
//!
//! ```rust
//! use rust_data_consolidation::prepare::prepare_table;
//! use rust_data_consolidation::types::{Cell, ColumnRole, RawTable};
//!
//! # fn main() -> Result<(), rust_data_consolidation::IngestionError> {
//! let raw = RawTable::new(
//!     "vendas.csv",
//!     vec!["Data".to_string(), "Quantidade".to_string()],
//!     vec![
//!         vec![Cell::text("15/01/2024"), Cell::text("2")],
//!         vec![Cell::text("20/01/2024"), Cell::text("3")],
//!     ],
//! );
//! let prepared = prepare_table(raw)?;
//! assert_eq!(prepared.role("Data"), Some(ColumnRole::Temporal));
//! assert_eq!(prepared.role("Quantidade"), Some(ColumnRole::Numeric));
//! assert_eq!(prepared.role("Data_MonthName"), Some(ColumnRole::Text));
//! # Ok(())
//! # }
//! ```

pub mod derive;

use std::collections::HashSet;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{IngestionError, IngestionResult};
use crate::inference::temporal::{self, ParseStage, TemporalSeries};
use crate::inference::{self, is_derived_label, numeric, InferenceOptions};
use crate::types::{Cell, ColumnRole, RawTable, Series};

pub use derive::{derive_temporal_columns, month_name, quarter, DerivedColumn};

/// Audit record of how one column's role was decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    /// Final role, if any.
    pub role: Option<ColumnRole>,
    /// Non-null cells in the column.
    pub non_null: usize,
    /// Coverage threshold applied to this column.
    pub threshold: usize,
    /// Cells the numeric classifier parsed.
    pub numeric_parsed: usize,
    /// Cascade stage the temporal classifier settled on.
    pub temporal_stage: Option<ParseStage>,
    /// Cells the temporal classifier parsed.
    pub temporal_parsed: usize,
    /// Dates nulled by the plausibility filter.
    pub invalid_dates_removed: usize,
    /// Temporal source column for derived columns.
    pub derived_from: Option<String>,
}

impl ColumnReport {
    fn new(non_null: usize, threshold: usize) -> Self {
        Self {
            role: None,
            non_null,
            threshold,
            numeric_parsed: 0,
            temporal_stage: None,
            temporal_parsed: 0,
            invalid_dates_removed: 0,
            derived_from: None,
        }
    }
}

/// A source table after classification and temporal derivation.
///
/// Immutable once built: every accessor borrows.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTable {
    table: RawTable,
    roles: IndexMap<String, ColumnRole>,
    numeric: IndexMap<String, Series<f64>>,
    temporal: IndexMap<String, TemporalSeries>,
    derived_columns: Vec<String>,
    reports: IndexMap<String, ColumnReport>,
}

impl PreparedTable {
    /// Table name.
    pub fn name(&self) -> &str {
        &self.table.name
    }

    /// Normalized table data (trimmed labels, nulled blanks, derived columns appended).
    pub fn table(&self) -> &RawTable {
        &self.table
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// All columns in order, source columns first, then derived ones.
    pub fn columns(&self) -> &[String] {
        &self.table.columns
    }

    /// Role of `column`, if it has one.
    pub fn role(&self, column: &str) -> Option<ColumnRole> {
        self.roles.get(column).copied()
    }

    /// Role map in column order.
    pub fn roles(&self) -> &IndexMap<String, ColumnRole> {
        &self.roles
    }

    /// Columns carrying `role`, in column order.
    pub fn columns_with_role(&self, role: ColumnRole) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter(move |(_, r)| **r == role)
            .map(|(c, _)| c.as_str())
    }

    /// Normalized numeric values of a numeric-role column.
    pub fn numeric_series(&self, column: &str) -> Option<&Series<f64>> {
        self.numeric.get(column)
    }

    /// Parsed dates of a temporal-role column.
    pub fn temporal_series(&self, column: &str) -> Option<&TemporalSeries> {
        self.temporal.get(column)
    }

    /// All temporal series keyed by column.
    pub fn temporal(&self) -> &IndexMap<String, TemporalSeries> {
        &self.temporal
    }

    /// Derived columns created by this preparation, in creation order.
    pub fn derived_columns(&self) -> &[String] {
        &self.derived_columns
    }

    /// Per-column classification reports.
    pub fn reports(&self) -> &IndexMap<String, ColumnReport> {
        &self.reports
    }

    /// Total dates discarded by the plausibility filter across all temporal columns.
    pub fn invalid_dates_removed(&self) -> usize {
        self.temporal.values().map(|s| s.invalid_dates_removed).sum()
    }

    /// Cell at (`row`, `col`) as seen through the column's role: numeric columns yield
    /// `Float64`, temporal columns yield `Date`, anything else the stored cell.
    pub fn typed_cell(&self, row: usize, col: usize) -> Cell {
        let Some(label) = self.table.columns.get(col) else {
            return Cell::Null;
        };
        match self.roles.get(label) {
            Some(ColumnRole::Numeric) => self
                .numeric
                .get(label)
                .and_then(|s| s.get(row).copied().flatten())
                .map(Cell::Float64)
                .unwrap_or(Cell::Null),
            Some(ColumnRole::Temporal) => self
                .temporal
                .get(label)
                .and_then(|s| s.values.get(row).copied().flatten())
                .map(Cell::Date)
                .unwrap_or(Cell::Null),
            _ => self
                .table
                .rows
                .get(row)
                .and_then(|r| r.get(col))
                .cloned()
                .unwrap_or(Cell::Null),
        }
    }

    /// Earliest and latest valid dates over all temporal columns.
    pub fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let start = self.temporal.values().filter_map(TemporalSeries::min).min();
        let end = self.temporal.values().filter_map(TemporalSeries::max).max();
        (start, end)
    }
}

/// Prepare a table with the default [`InferenceOptions`].
pub fn prepare_table(raw: RawTable) -> IngestionResult<PreparedTable> {
    prepare_table_with(raw, &InferenceOptions::default())
}

/// Prepare a table: classify every column once and derive temporal attributes.
///
/// Only duplicate labels (after trimming) raise; classification is best-effort.
pub fn prepare_table_with(
    mut raw: RawTable,
    options: &InferenceOptions,
) -> IngestionResult<PreparedTable> {
    normalize_labels(&mut raw)?;
    null_blank_cells(&mut raw);

    let mut roles: IndexMap<String, ColumnRole> = IndexMap::new();
    let mut numeric: IndexMap<String, Series<f64>> = IndexMap::new();
    let mut temporal: IndexMap<String, TemporalSeries> = IndexMap::new();
    let mut reports: IndexMap<String, ColumnReport> = IndexMap::new();

    let candidates: Vec<usize> = (0..raw.columns.len())
        .filter(|&idx| !is_derived_label(&raw.columns[idx]))
        .collect();

    for (idx, label) in raw.columns.iter().enumerate() {
        let cells = raw.column(idx);
        let non_null = cells.iter().filter(|c| !c.is_null()).count();
        reports.insert(label.clone(), ColumnReport::new(non_null, options.threshold(cells.len())));
    }

    // Numeric pass.
    for &idx in &candidates {
        let label = &raw.columns[idx];
        let inspection = numeric::inspect(&raw.column(idx), options);
        if let Some(report) = reports.get_mut(label) {
            report.numeric_parsed = inspection.parsed;
        }
        if let Some(series) = inspection.into_accepted() {
            numeric.insert(label.clone(), series);
            roles.insert(label.clone(), ColumnRole::Numeric);
        }
    }

    // Temporal pass over what is left.
    for &idx in &candidates {
        let label = &raw.columns[idx];
        if roles.contains_key(label) {
            continue;
        }
        let inspection = temporal::inspect(&raw.column(idx), options);
        if let Some(report) = reports.get_mut(label) {
            report.temporal_stage = inspection.stage;
            report.temporal_parsed = inspection.parsed;
        }
        if let Some(series) = inspection.into_accepted(options) {
            if let Some(report) = reports.get_mut(label) {
                report.invalid_dates_removed = series.invalid_dates_removed;
            }
            temporal.insert(label.clone(), series);
            roles.insert(label.clone(), ColumnRole::Temporal);
        }
    }

    // Text pass over the rest.
    for &idx in &candidates {
        let label = &raw.columns[idx];
        if !roles.contains_key(label) && inference::classify_text(&raw.column(idx)) {
            roles.insert(label.clone(), ColumnRole::Text);
        }
    }

    // Derivation.
    let mut derived_columns = Vec::new();
    let sources: Vec<(String, Series<NaiveDate>)> = temporal
        .iter()
        .map(|(label, series)| (label.clone(), series.values.clone()))
        .collect();
    for (source, dates) in sources {
        for derived in derive_temporal_columns(&source, &dates) {
            let DerivedColumn {
                label,
                role,
                cells,
                numeric: values,
            } = derived;
            write_column(&mut raw, &label, cells);
            if let Some(values) = values {
                numeric.insert(label.clone(), values);
            }
            roles.insert(label.clone(), role);
            let report = reports
                .entry(label.clone())
                .or_insert_with(|| ColumnReport::new(0, 0));
            report.role = Some(role);
            report.derived_from = Some(source.clone());
            report.non_null = dates.iter().flatten().count();
            derived_columns.push(label);
        }
    }

    // Roles in column order, reports completed.
    let roles: IndexMap<String, ColumnRole> = raw
        .columns
        .iter()
        .filter_map(|c| roles.get(c).map(|r| (c.clone(), *r)))
        .collect();
    for (label, report) in reports.iter_mut() {
        report.role = roles.get(label).copied();
        debug!(table = %raw.name, column = %label, role = ?report.role, "column classified");
    }

    info!(
        table = %raw.name,
        rows = raw.row_count(),
        numeric = numeric.len(),
        temporal = temporal.len(),
        derived = derived_columns.len(),
        "table prepared"
    );

    Ok(PreparedTable {
        table: raw,
        roles,
        numeric,
        temporal,
        derived_columns,
        reports,
    })
}

fn normalize_labels(raw: &mut RawTable) -> IngestionResult<()> {
    let mut seen = HashSet::with_capacity(raw.columns.len());
    for label in raw.columns.iter_mut() {
        let trimmed = label.trim();
        if trimmed.len() != label.len() {
            *label = trimmed.to_string();
        }
        if !seen.insert(label.clone()) {
            return Err(IngestionError::ColumnLabelConflict {
                table: raw.name.clone(),
                label: label.clone(),
            });
        }
    }
    Ok(())
}

fn null_blank_cells(raw: &mut RawTable) {
    let width = raw.columns.len();
    for row in raw.rows.iter_mut() {
        row.resize(width, Cell::Null);
        for cell in row.iter_mut() {
            if matches!(cell, Cell::Utf8(s) if s.trim().is_empty()) {
                *cell = Cell::Null;
            }
        }
    }
}

/// Overwrite column `label` in place if it exists, otherwise append it.
fn write_column(raw: &mut RawTable, label: &str, cells: Vec<Cell>) {
    match raw.index_of(label) {
        Some(idx) => {
            for (row, cell) in raw.rows.iter_mut().zip(cells) {
                row[idx] = cell;
            }
        }
        None => {
            raw.columns.push(label.to_string());
            for (row, cell) in raw.rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(columns: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable::new(
            "t",
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    fn t(s: &str) -> Cell {
        Cell::Utf8(s.to_string())
    }

    #[test]
    fn workbook_boolean_column_is_numeric() {
        let table = raw(
            &["Produto", "Ativo"],
            vec![
                vec![t("Caneta"), Cell::Bool(true)],
                vec![t("Lápis"), Cell::Bool(false)],
                vec![t("Borracha"), Cell::Bool(true)],
            ],
        );
        let p = prepare_table(table).unwrap();
        assert_eq!(p.role("Ativo"), Some(ColumnRole::Numeric));
        assert_eq!(
            p.numeric_series("Ativo"),
            Some(&vec![Some(1.0), Some(0.0), Some(1.0)])
        );
        assert_eq!(p.typed_cell(1, 1), Cell::Float64(0.0));
    }

    #[test]
    fn roles_are_exclusive_and_ordered() {
        let table = raw(
            &["Data", "Produto", "Quantidade", "Vazio"],
            vec![
                vec![t("2024-01-05"), t("Caneta"), t("2"), Cell::Null],
                vec![t("2024-01-06"), t("Lápis"), t("1,5"), t("  ")],
            ],
        );
        let p = prepare_table(table).unwrap();
        assert_eq!(p.role("Data"), Some(ColumnRole::Temporal));
        assert_eq!(p.role("Produto"), Some(ColumnRole::Text));
        assert_eq!(p.role("Quantidade"), Some(ColumnRole::Numeric));
        assert_eq!(p.role("Vazio"), None);
        assert_eq!(p.numeric_series("Quantidade"), Some(&vec![Some(2.0), Some(1.5)]));

        let roles: Vec<&str> = p.roles().keys().map(String::as_str).collect();
        assert_eq!(
            roles,
            vec![
                "Data",
                "Produto",
                "Quantidade",
                "Data_Month",
                "Data_Year",
                "Data_Quarter",
                "Data_MonthName"
            ]
        );
    }

    #[test]
    fn numeric_columns_are_never_dates() {
        // Small integers must not fall through to the date cascade.
        let table = raw(
            &["Quantidade"],
            vec![vec![Cell::Int64(2)], vec![Cell::Int64(1)], vec![Cell::Int64(3)]],
        );
        let p = prepare_table(table).unwrap();
        assert_eq!(p.role("Quantidade"), Some(ColumnRole::Numeric));
        assert!(p.temporal().is_empty());
        assert!(p.derived_columns().is_empty());
    }

    #[test]
    fn labels_are_trimmed_and_must_be_unique() {
        let table = raw(&[" Valor ", "Cliente"], vec![vec![t("1"), t("a")]]);
        let p = prepare_table(table).unwrap();
        assert_eq!(p.columns(), &["Valor".to_string(), "Cliente".to_string()]);

        let table = raw(&["Valor", "Valor "], vec![vec![t("1"), t("2")]]);
        let err = prepare_table(table).unwrap_err();
        assert!(matches!(
            err,
            IngestionError::ColumnLabelConflict { ref label, .. } if label == "Valor"
        ));
    }

    #[test]
    fn derived_columns_follow_naming_convention() {
        let table = raw(&["Data"], vec![vec![t("15/03/2024")], vec![Cell::Null]]);
        let p = prepare_table(table).unwrap();
        assert_eq!(
            p.derived_columns(),
            &[
                "Data_Month".to_string(),
                "Data_Year".to_string(),
                "Data_Quarter".to_string(),
                "Data_MonthName".to_string()
            ]
        );
        let month_idx = p.table().index_of("Data_Month").unwrap();
        assert_eq!(p.table().rows[0][month_idx], Cell::Int64(3));
        assert_eq!(p.table().rows[1][month_idx], Cell::Null);
        assert_eq!(p.typed_cell(0, p.table().index_of("Data_MonthName").unwrap()), t("março"));
        assert_eq!(p.reports()["Data_Quarter"].derived_from.as_deref(), Some("Data"));
    }

    #[test]
    fn preparation_is_idempotent() {
        let table = raw(
            &["Data", "Valor"],
            vec![
                vec![t("2024-01-15"), t("10")],
                vec![t("2024-02-20"), t("20")],
            ],
        );
        let first = prepare_table(table.clone()).unwrap();
        let second = prepare_table(table).unwrap();
        assert_eq!(first.derived_columns(), second.derived_columns());

        let again = prepare_table(first.table().clone()).unwrap();
        assert_eq!(again.derived_columns(), first.derived_columns());
        assert_eq!(again.columns(), first.columns());
        assert_eq!(again.roles(), first.roles());
        assert!(again.columns().iter().all(|c| !c.contains("_Month_Month")));
    }

    #[test]
    fn epoch_dates_are_reported() {
        let table = raw(
            &["Data"],
            vec![vec![t("1970-01-01")], vec![t("2024-01-02")], vec![t("2024-01-03")]],
        );
        let p = prepare_table(table).unwrap();
        assert_eq!(p.invalid_dates_removed(), 1);
        assert_eq!(p.reports()["Data"].invalid_dates_removed, 1);
        assert_eq!(p.typed_cell(0, 0), Cell::Null);
        assert_eq!(
            p.date_range(),
            (NaiveDate::from_ymd_opt(2024, 1, 2), NaiveDate::from_ymd_opt(2024, 1, 3))
        );
    }
}
