//! Reductions and column profiles for [`ConsolidatedDataset`].

use std::collections::HashSet;

use serde::Serialize;

use crate::consolidate::{CellKey, ConsolidatedDataset};
use crate::types::{Cell, ColumnStorage};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
    /// Arithmetic mean of numeric values, ignoring nulls.
    Mean,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the dataset.
/// - For `Sum`/`Min`/`Max`/`Mean`, returns `Some(Cell::Null)` if there are no numeric values.
///   Non-numeric cells are skipped.
/// - For `Count`, always returns `Some(Cell::Int64(row_count))`.
pub fn reduce(dataset: &ConsolidatedDataset, column: &str, op: ReduceOp) -> Option<Cell> {
    let values = dataset.column(column)?.filter_map(Cell::as_f64);

    let out = match op {
        ReduceOp::Count => return Some(Cell::Int64(dataset.row_count() as i64)),
        ReduceOp::Sum => values.fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v)),
        ReduceOp::Min => values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v)))),
        ReduceOp::Max => values.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v)))),
        ReduceOp::Mean => {
            let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            (n > 0).then(|| sum / n as f64)
        }
    };
    Some(out.map(Cell::Float64).unwrap_or(Cell::Null))
}

/// Summary statistics of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericProfile {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Profile of one consolidated column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Non-null cells.
    pub count: usize,
    pub null_count: usize,
    /// Distinct non-null values.
    pub unique_count: usize,
    /// Present when every non-null cell is numeric and there is at least one.
    pub numeric: Option<NumericProfile>,
}

/// Profile `column`, or `None` if the dataset has no such column.
pub fn column_info(dataset: &ConsolidatedDataset, column: &str) -> Option<ColumnInfo> {
    let cells: Vec<&Cell> = dataset.column(column)?.collect();
    let non_null: Vec<&Cell> = cells.iter().copied().filter(|c| !c.is_blank()).collect();
    let unique: HashSet<CellKey<'_>> = non_null.iter().map(|c| CellKey::from(*c)).collect();

    let numeric = match ColumnStorage::of(&cells) {
        ColumnStorage::Numeric => numeric_profile(non_null.iter().filter_map(|c| c.as_f64()).collect()),
        _ => None,
    };

    Some(ColumnInfo {
        name: column.to_string(),
        count: non_null.len(),
        null_count: cells.len() - non_null.len(),
        unique_count: unique.len(),
        numeric,
    })
}

fn numeric_profile(mut values: Vec<f64>) -> Option<NumericProfile> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    let median = if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    };
    Some(NumericProfile {
        min: values[0],
        max: values[n - 1],
        mean: values.iter().sum::<f64>() / n as f64,
        median,
    })
}
