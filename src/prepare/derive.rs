//! Derived temporal attributes.
//!
//! For every temporal column `<col>` the preparer appends `<col>_Month`, `<col>_Year`,
//! `<col>_Quarter` (numeric) and `<col>_MonthName` (text, lower-case Brazilian Portuguese).

use chrono::{Datelike, NaiveDate};

use crate::types::{Cell, ColumnRole, Series};

const MONTH_NAMES_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Lower-case Portuguese name of month `1..=12`.
pub fn month_name(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES_PT.get(idx).copied()
}

/// Quarter `1..=4` of month `1..=12`.
pub fn quarter(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

/// One synthesized column.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedColumn {
    /// Label, e.g. `Data_Quarter`.
    pub label: String,
    /// Role carried by the column.
    pub role: ColumnRole,
    /// Cells to store in the table.
    pub cells: Vec<Cell>,
    /// Numeric series for numeric-role columns.
    pub numeric: Option<Series<f64>>,
}

impl DerivedColumn {
    fn numeric(label: String, dates: &Series<NaiveDate>, f: impl Fn(NaiveDate) -> i64) -> Self {
        let values: Vec<Option<i64>> = dates.iter().map(|d| d.map(&f)).collect();
        Self {
            label,
            role: ColumnRole::Numeric,
            cells: values
                .iter()
                .map(|v| v.map(Cell::Int64).unwrap_or(Cell::Null))
                .collect(),
            numeric: Some(values.iter().map(|v| v.map(|n| n as f64)).collect()),
        }
    }
}

/// Build the four derived columns for temporal column `source`.
pub fn derive_temporal_columns(source: &str, dates: &Series<NaiveDate>) -> Vec<DerivedColumn> {
    let month_names = DerivedColumn {
        label: format!("{source}_MonthName"),
        role: ColumnRole::Text,
        cells: dates
            .iter()
            .map(|d| {
                d.and_then(|d| month_name(d.month()))
                    .map(|name| Cell::Utf8(name.to_string()))
                    .unwrap_or(Cell::Null)
            })
            .collect(),
        numeric: None,
    };

    vec![
        DerivedColumn::numeric(format!("{source}_Month"), dates, |d| i64::from(d.month())),
        DerivedColumn::numeric(format!("{source}_Year"), dates, |d| i64::from(d.year())),
        DerivedColumn::numeric(format!("{source}_Quarter"), dates, |d| {
            i64::from(quarter(d.month()))
        }),
        month_names,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarters() {
        assert_eq!(quarter(1), 1);
        assert_eq!(quarter(3), 1);
        assert_eq!(quarter(4), 2);
        assert_eq!(quarter(9), 3);
        assert_eq!(quarter(12), 4);
    }

    #[test]
    fn month_names_table() {
        assert_eq!(month_name(1), Some("janeiro"));
        assert_eq!(month_name(3), Some("março"));
        assert_eq!(month_name(12), Some("dezembro"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn derives_four_columns_with_nulls_preserved() {
        let dates = vec![NaiveDate::from_ymd_opt(2024, 5, 17), None];
        let derived = derive_temporal_columns("Data", &dates);
        let labels: Vec<&str> = derived.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Data_Month", "Data_Year", "Data_Quarter", "Data_MonthName"]);

        assert_eq!(derived[0].cells, vec![Cell::Int64(5), Cell::Null]);
        assert_eq!(derived[1].numeric, Some(vec![Some(2024.0), None]));
        assert_eq!(derived[2].cells[0], Cell::Int64(2));
        assert_eq!(derived[3].cells[0], Cell::Utf8("maio".to_string()));
        assert_eq!(derived[3].role, ColumnRole::Text);
        assert_eq!(derived[3].numeric, None);
    }
}
