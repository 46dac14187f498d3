//! Column role inference.
//!
//! Each classifier looks at one column (a slice of borrowed [`crate::types::Cell`]s) and
//! either accepts it for its role or rejects it:
//!
//! - [`numeric`]: locale-aware decimal parsing via [`decimal::normalize`]
//! - [`temporal`]: a cascade of date parsers plus a plausibility filter
//! - [`text`]: the residual classifier
//!
//! Numeric and temporal acceptance is threshold-based: a column is accepted iff the number of
//! successfully parsed cells is at least `max(1, floor(ratio * total_cells))`, where the
//! total counts null cells too.
//!
//! ```rust
//! use rust_data_consolidation::inference::numeric::classify_numeric;
//! use rust_data_consolidation::types::Cell;
//!
//! let cells = vec![Cell::text("1.234,56"), Cell::text("R$ 10,00"), Cell::Null];
//! let column: Vec<&Cell> = cells.iter().collect();
//! let series = classify_numeric(&column).unwrap();
//! assert_eq!(series, vec![Some(1234.56), Some(10.0), None]);
//! ```

pub mod decimal;
pub mod numeric;
pub mod temporal;
pub mod text;

use chrono::NaiveDate;

pub use decimal::{normalize, normalize_str};
pub use numeric::classify_numeric;
pub use temporal::{classify_temporal, ParseStage, TemporalSeries};
pub use text::classify_text;

/// Suffixes appended by temporal derivation. Columns ending with any of these are never
/// classified, so re-preparing prepared data is idempotent.
pub const DERIVED_SUFFIXES: [&str; 4] = ["_Month", "_Year", "_Quarter", "_MonthName"];

/// Returns `true` if `label` follows the derived-column naming convention.
pub fn is_derived_label(label: &str) -> bool {
    DERIVED_SUFFIXES.iter().any(|suffix| label.ends_with(suffix))
}

/// Tunables for column classification.
///
/// Use [`Default`] for the canonical policy (30% coverage, plausible dates 1990–2030).
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOptions {
    /// Minimum fraction of parsed cells (over all cells, nulls included).
    pub coverage_ratio: f64,
    /// Earliest date kept after temporal acceptance.
    pub plausible_start: NaiveDate,
    /// Latest date kept after temporal acceptance.
    pub plausible_end: NaiveDate,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            coverage_ratio: 0.30,
            plausible_start: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN),
            plausible_end: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl InferenceOptions {
    /// Minimum number of parsed cells required to accept a column of `total_cells` cells.
    pub fn threshold(&self, total_cells: usize) -> usize {
        coverage_threshold(total_cells, self.coverage_ratio)
    }

    /// Returns `true` if `date` lies inside the plausible range (inclusive).
    pub fn is_plausible(&self, date: NaiveDate) -> bool {
        date >= self.plausible_start && date <= self.plausible_end
    }
}

/// `max(1, floor(ratio * total_cells))`.
pub fn coverage_threshold(total_cells: usize, ratio: f64) -> usize {
    let raw = (total_cells as f64 * ratio).floor();
    (raw.max(0.0) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_counts_whole_column() {
        assert_eq!(coverage_threshold(10, 0.30), 3);
        assert_eq!(coverage_threshold(3, 0.30), 1);
        assert_eq!(coverage_threshold(0, 0.30), 1);
        assert_eq!(coverage_threshold(100, 0.30), 30);
    }

    #[test]
    fn derived_labels_are_recognized() {
        assert!(is_derived_label("Data_Month"));
        assert!(is_derived_label("Data_MonthName"));
        assert!(is_derived_label("Data_Quarter"));
        assert!(is_derived_label("Data_Year"));
        assert!(!is_derived_label("Data"));
        assert!(!is_derived_label("Monthly"));
    }

    #[test]
    fn default_plausible_range() {
        let opts = InferenceOptions::default();
        assert!(!opts.is_plausible(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()));
        assert!(opts.is_plausible(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()));
        assert!(opts.is_plausible(NaiveDate::from_ymd_opt(2030, 12, 31).unwrap()));
        assert!(!opts.is_plausible(NaiveDate::from_ymd_opt(2031, 1, 1).unwrap()));
    }
}
