//! Consolidation of prepared tables into one dataset.
//!
//! Columns are the outer union of every table's columns in first-appearance order; rows are
//! concatenated in the order tables are supplied. Each table contributes its own typed values
//! (see [`PreparedTable::typed_cell`]); when the same label carries different roles in
//! different tables nothing is reconciled, the conflict is recorded in
//! [`ConsolidatedDataset::role_conflicts`] and logged.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{IngestionError, IngestionResult};
use crate::prepare::PreparedTable;
use crate::types::{Cell, ColumnRole};

/// Options controlling consolidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidateOptions {
    /// Remove exact full-row duplicates (first occurrence kept).
    pub drop_duplicates: bool,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            drop_duplicates: true,
        }
    }
}

/// A column whose role differs between source tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleConflict {
    /// Column label.
    pub column: String,
    /// `(table name, role)` for every table that assigned the column a role.
    pub roles: Vec<(String, ColumnRole)>,
}

/// Outer union of all prepared tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedDataset {
    /// Column labels in first-appearance order.
    pub columns: Vec<String>,
    /// Row-major storage, aligned with `columns`.
    pub rows: Vec<Vec<Cell>>,
    /// Names of the source tables, in consolidation order.
    pub source_tables: Vec<String>,
    /// Rows dropped by duplicate removal.
    pub duplicates_removed: usize,
    /// Columns typed differently across tables.
    pub role_conflicts: Vec<RoleConflict>,
}

impl ConsolidatedDataset {
    /// Number of rows (after duplicate removal).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of a column by label, if present.
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Iterate the cells of `column`, top to bottom.
    pub fn column(&self, column: &str) -> Option<impl Iterator<Item = &Cell>> {
        let idx = self.index_of(column)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Number of exact duplicate rows still present (occurrences beyond the first).
    pub fn duplicate_rows(&self) -> usize {
        duplicate_mask(&self.rows).iter().filter(|dup| **dup).count()
    }
}

/// Merge prepared tables into one dataset.
///
/// Fails with [`IngestionError::EmptyInput`] if `tables` is empty.
pub fn consolidate(
    tables: &[PreparedTable],
    options: &ConsolidateOptions,
) -> IngestionResult<ConsolidatedDataset> {
    if tables.is_empty() {
        return Err(IngestionError::EmptyInput {
            message: "no tables to consolidate".to_string(),
        });
    }

    let mut columns: IndexMap<String, ()> = IndexMap::new();
    for table in tables {
        for c in table.columns() {
            columns.entry(c.clone()).or_insert(());
        }
    }
    let columns: Vec<String> = columns.into_keys().collect();

    let total_rows: usize = tables.iter().map(PreparedTable::row_count).sum();
    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(total_rows);
    for table in tables {
        let projection: Vec<Option<usize>> = columns
            .iter()
            .map(|c| table.columns().iter().position(|tc| tc == c))
            .collect();
        for row in 0..table.row_count() {
            rows.push(
                projection
                    .iter()
                    .map(|idx| idx.map(|i| table.typed_cell(row, i)).unwrap_or(Cell::Null))
                    .collect(),
            );
        }
    }

    let role_conflicts = find_role_conflicts(tables, &columns);
    for conflict in &role_conflicts {
        warn!(
            column = %conflict.column,
            roles = ?conflict.roles,
            "column role differs across tables; values kept as typed per table"
        );
    }

    let mut duplicates_removed = 0;
    if options.drop_duplicates {
        let mask = duplicate_mask(&rows);
        duplicates_removed = mask.iter().filter(|dup| **dup).count();
        if duplicates_removed > 0 {
            rows = rows
                .into_iter()
                .zip(mask)
                .filter_map(|(row, dup)| (!dup).then_some(row))
                .collect();
        }
    }

    info!(
        tables = tables.len(),
        columns = columns.len(),
        rows = rows.len(),
        duplicates_removed,
        "tables consolidated"
    );

    Ok(ConsolidatedDataset {
        columns,
        rows,
        source_tables: tables.iter().map(|t| t.name().to_string()).collect(),
        duplicates_removed,
        role_conflicts,
    })
}

fn find_role_conflicts(tables: &[PreparedTable], columns: &[String]) -> Vec<RoleConflict> {
    columns
        .iter()
        .filter_map(|column| {
            let roles: Vec<(String, ColumnRole)> = tables
                .iter()
                .filter_map(|t| t.role(column).map(|r| (t.name().to_string(), r)))
                .collect();
            let first = roles.first()?.1;
            roles.iter().any(|(_, r)| *r != first).then(|| RoleConflict {
                column: column.clone(),
                roles,
            })
        })
        .collect()
}

/// Hashable view of a cell; floats compare by bit pattern with `-0.0 == 0.0`.
#[derive(PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Text(&'a str),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl<'a> From<&'a Cell> for CellKey<'a> {
    fn from(cell: &'a Cell) -> Self {
        match cell {
            Cell::Null => CellKey::Null,
            Cell::Int64(v) => CellKey::Int(*v),
            Cell::Float64(v) if v.is_nan() => CellKey::Null,
            Cell::Float64(v) if *v == 0.0 => CellKey::Float(0.0f64.to_bits()),
            Cell::Float64(v) => CellKey::Float(v.to_bits()),
            Cell::Bool(v) => CellKey::Bool(*v),
            Cell::Utf8(s) => CellKey::Text(s),
            Cell::Date(d) => CellKey::Date(*d),
            Cell::DateTime(dt) => CellKey::DateTime(*dt),
        }
    }
}

/// `true` for every row that repeats an earlier row exactly.
fn duplicate_mask(rows: &[Vec<Cell>]) -> Vec<bool> {
    let mut seen: HashSet<Vec<CellKey<'_>>> = HashSet::with_capacity(rows.len());
    rows.iter()
        .map(|row| !seen.insert(row.iter().map(CellKey::from).collect()))
        .collect()
}
