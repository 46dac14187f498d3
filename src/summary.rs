//! Dataset-level summary over prepared tables.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::consolidate::{ConsolidatedDataset, RoleConflict};
use crate::ingestion::FileFailure;
use crate::prepare::PreparedTable;
use crate::types::ColumnRole;

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Analytic domain present in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Numeric,
    Categorical,
    Temporal,
}

/// Global temporal coverage. Both ends are `None` without temporal data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(serialize_with = "serialize_display_date")]
    pub start: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_display_date")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// `(start, end)` rendered as `DD/MM/YYYY`.
    pub fn formatted(&self) -> (Option<String>, Option<String>) {
        (self.start.map(display_date), self.end.map(display_date))
    }
}

fn display_date(d: NaiveDate) -> String {
    d.format(DISPLAY_DATE_FORMAT).to_string()
}

fn serialize_display_date<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => serializer.serialize_str(&display_date(*d)),
        None => serializer.serialize_none(),
    }
}

/// Summary of an analysed batch.
///
/// `total_records` is always the pre-deduplication row sum; the consolidated row count and the
/// number of removed duplicates are separate fields, filled by
/// [`DatasetSummary::with_consolidation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub files_ok: Vec<String>,
    pub files_failed: Vec<FileFailure>,
    pub total_records: usize,
    pub consolidated_records: Option<usize>,
    pub duplicates_removed: Option<usize>,
    /// Every column of every table, sorted.
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub temporal_columns: Vec<String>,
    pub date_range: DateRange,
    pub domains: Vec<Domain>,
    pub role_conflicts: Vec<RoleConflict>,
}

impl DatasetSummary {
    /// Attach the batch file lists.
    pub fn with_files(mut self, files_ok: Vec<String>, files_failed: Vec<FileFailure>) -> Self {
        self.files_ok = files_ok;
        self.files_failed = files_failed;
        self
    }

    /// Attach post-consolidation counts and role-conflict metadata.
    pub fn with_consolidation(mut self, dataset: &ConsolidatedDataset) -> Self {
        self.consolidated_records = Some(dataset.row_count());
        self.duplicates_removed = Some(dataset.duplicates_removed);
        self.role_conflicts = dataset.role_conflicts.clone();
        self
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Summarize prepared tables.
pub fn summarize(tables: &[PreparedTable]) -> DatasetSummary {
    let mut columns = BTreeSet::new();
    let mut numeric = BTreeSet::new();
    let mut text = BTreeSet::new();
    let mut temporal = BTreeSet::new();

    for table in tables {
        columns.extend(table.columns().iter().cloned());
        for (column, role) in table.roles() {
            let set = match role {
                ColumnRole::Numeric => &mut numeric,
                ColumnRole::Text => &mut text,
                ColumnRole::Temporal => &mut temporal,
            };
            set.insert(column.clone());
        }
    }

    let ranges: Vec<_> = tables.iter().map(PreparedTable::date_range).collect();
    let date_range = DateRange {
        start: ranges.iter().filter_map(|(s, _)| *s).min(),
        end: ranges.iter().filter_map(|(_, e)| *e).max(),
    };

    let mut domains = Vec::new();
    if !numeric.is_empty() {
        domains.push(Domain::Numeric);
    }
    if !text.is_empty() {
        domains.push(Domain::Categorical);
    }
    if !temporal.is_empty() {
        domains.push(Domain::Temporal);
    }

    DatasetSummary {
        total_records: tables.iter().map(PreparedTable::row_count).sum(),
        columns: columns.into_iter().collect(),
        numeric_columns: numeric.into_iter().collect(),
        text_columns: text.into_iter().collect(),
        temporal_columns: temporal.into_iter().collect(),
        date_range,
        domains,
        ..DatasetSummary::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::{ConsolidateOptions, consolidate};
    use crate::prepare::prepare_table;
    use crate::types::{Cell, RawTable};

    fn prepared(name: &str, columns: &[&str], rows: &[&[&str]]) -> PreparedTable {
        prepare_table(RawTable::new(
            name,
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| Cell::text(*v)).collect())
                .collect(),
        ))
        .unwrap()
    }

    #[test]
    fn summary_without_temporal_data() {
        let t = prepared("t", &["Produto", "Valor"], &[&["Caneta", "1,5"]]);
        let s = summarize(&[t]);
        assert_eq!(s.date_range, DateRange::default());
        assert_eq!(s.date_range.formatted(), (None, None));
        assert_eq!(s.domains, vec![Domain::Numeric, Domain::Categorical]);
        assert_eq!(s.numeric_columns, vec!["Valor"]);
        assert_eq!(s.text_columns, vec!["Produto"]);
        assert!(s.temporal_columns.is_empty());
    }

    #[test]
    fn sorted_unions_and_global_range() {
        let a = prepared("a", &["Data", "Valor"], &[&["2024-01-15", "1"], &["2024-01-03", "2"]]);
        let b = prepared("b", &["Data", "Regiao"], &[&["2024-02-28", "Sul"]]);
        let s = summarize(&[a, b]);

        assert_eq!(s.total_records, 3);
        assert_eq!(s.temporal_columns, vec!["Data"]);
        assert_eq!(
            s.numeric_columns,
            vec!["Data_Month", "Data_Quarter", "Data_Year", "Valor"]
        );
        assert_eq!(s.text_columns, vec!["Data_MonthName", "Regiao"]);
        assert_eq!(
            s.date_range.formatted(),
            (Some("03/01/2024".to_string()), Some("28/02/2024".to_string()))
        );
        assert_eq!(
            s.domains,
            vec![Domain::Numeric, Domain::Categorical, Domain::Temporal]
        );
    }

    #[test]
    fn consolidation_counts_stay_separate_from_total() {
        let a = prepared("a", &["Produto"], &[&["Caneta"], &["Lápis"]]);
        let b = prepared("b", &["Produto"], &[&["Caneta"]]);
        let tables = vec![a, b];
        let ds = consolidate(&tables, &ConsolidateOptions::default()).unwrap();
        let s = summarize(&tables).with_consolidation(&ds);

        assert_eq!(s.total_records, 3);
        assert_eq!(s.consolidated_records, Some(2));
        assert_eq!(s.duplicates_removed, Some(1));
    }

    #[test]
    fn json_renders_display_dates() {
        let t = prepared("t", &["Data"], &[&["05/03/2024"]]);
        let json = summarize(&[t]).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["date_range"]["start"], "05/03/2024");
        assert_eq!(value["domains"][0], "numeric");
        assert_eq!(value["files_failed"], serde_json::json!([]));
    }
}
