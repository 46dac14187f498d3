//! Core data model types.
//!
//! Ingestion produces [`RawTable`]s whose cells are untyped [`Cell`]s: no schema is declared
//! up front. Column roles ([`ColumnRole`]) are inferred later by [`crate::prepare`].

use std::borrow::Cow;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A column of optional, normalized values (one entry per row).
pub type Series<T> = Vec<Option<T>>;

/// A single scalar value of unknown origin type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without a timezone.
    DateTime(NaiveDateTime),
}

pub(crate) static NULL_CELL: Cell = Cell::Null;

impl Cell {
    /// Build a text cell, mapping blank strings (empty after trim) to [`Cell::Null`].
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() { Cell::Null } else { Cell::Utf8(s) }
    }

    /// `true` for [`Cell::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// `true` for nulls and for strings that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Utf8(s) => s.trim().is_empty(),
            Cell::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric value of `Int64`/`Float64`/`Bool` cells (`true` is 1, `false` is 0). NaN maps
    /// to `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int64(v) => Some(*v as f64),
            Cell::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Cell::Float64(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    /// Textual rendering used by the string-sniffing classifiers. `None` for nulls.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Null => None,
            Cell::Utf8(s) => Some(Cow::Borrowed(s.as_str())),
            Cell::Float64(v) if v.is_nan() => None,
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int64(v) => write!(f, "{v}"),
            Cell::Float64(v) => write!(f, "{v}"),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Utf8(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Physical storage of a column, derived from the variants of its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStorage {
    /// Every cell is null.
    Empty,
    /// Every non-null cell is `Int64`, `Float64` or `Bool`.
    Numeric,
    /// Every non-null cell is `Date` or `DateTime`.
    Temporal,
    /// Every non-null cell is `Utf8`.
    Text,
    /// Anything else (mixed variants).
    Mixed,
}

impl ColumnStorage {
    /// Inspect a column's cells.
    pub fn of(cells: &[&Cell]) -> Self {
        let mut storage = ColumnStorage::Empty;
        for cell in cells {
            let this = match cell {
                Cell::Null => continue,
                Cell::Float64(v) if v.is_nan() => continue,
                Cell::Int64(_) | Cell::Float64(_) | Cell::Bool(_) => ColumnStorage::Numeric,
                Cell::Date(_) | Cell::DateTime(_) => ColumnStorage::Temporal,
                Cell::Utf8(_) => ColumnStorage::Text,
            };
            storage = match storage {
                ColumnStorage::Empty => this,
                s if s == this => s,
                _ => return ColumnStorage::Mixed,
            };
        }
        storage
    }
}

/// Inferred semantic role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    /// Quantities that can be summed/averaged.
    Numeric,
    /// Calendar dates.
    Temporal,
    /// Categorical/free text.
    Text,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnRole::Numeric => "numeric",
            ColumnRole::Temporal => "temporal",
            ColumnRole::Text => "text",
        })
    }
}

/// A named table as read from a file or sheet, before any inference.
///
/// Rows are stored as `Vec<Vec<Cell>>` in the same order as [`RawTable::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Table name (`"<file>"` or `"<file> - <sheet>"`).
    pub name: String,
    /// Ordered column labels.
    pub columns: Vec<String>,
    /// Row-major cell storage.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create a table from labels and rows.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the index of a column by label, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Borrow every cell of column `idx`, top to bottom. Short rows read as null.
    pub fn column(&self, idx: usize) -> Vec<&Cell> {
        self.rows
            .iter()
            .map(|row| row.get(idx).unwrap_or(&NULL_CELL))
            .collect()
    }

    /// Create a new table containing only rows whose mask entry is `true`.
    pub fn filter_rows(&self, mask: &[bool]) -> Self {
        let rows = self
            .rows
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();
        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_become_null() {
        assert_eq!(Cell::text("   "), Cell::Null);
        assert_eq!(Cell::text(" a "), Cell::Utf8(" a ".to_string()));
    }

    #[test]
    fn storage_classification() {
        let a = Cell::Int64(1);
        let b = Cell::Float64(2.5);
        let n = Cell::Null;
        let s = Cell::Utf8("x".to_string());
        let d = Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert_eq!(ColumnStorage::of(&[&a, &n, &b]), ColumnStorage::Numeric);
        assert_eq!(ColumnStorage::of(&[&n, &n]), ColumnStorage::Empty);
        assert_eq!(ColumnStorage::of(&[&d, &n]), ColumnStorage::Temporal);
        assert_eq!(ColumnStorage::of(&[&s, &a]), ColumnStorage::Mixed);
        assert_eq!(ColumnStorage::of(&[&Cell::Bool(true), &a]), ColumnStorage::Numeric);
        assert_eq!(ColumnStorage::of(&[&Cell::Bool(true), &s]), ColumnStorage::Mixed);
    }

    #[test]
    fn booleans_read_as_one_and_zero() {
        assert_eq!(Cell::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Cell::Bool(false).as_f64(), Some(0.0));
    }

    #[test]
    fn column_reads_short_rows_as_null() {
        let t = RawTable::new(
            "t",
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Int64(1)], vec![Cell::Int64(2), Cell::Int64(3)]],
        );
        assert_eq!(t.column(1), vec![&Cell::Null, &Cell::Int64(3)]);
    }

    #[test]
    fn text_rendering_of_dates() {
        let d = Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(d.as_text().as_deref(), Some("2024-03-09"));
        assert_eq!(Cell::Null.as_text(), None);
    }
}
