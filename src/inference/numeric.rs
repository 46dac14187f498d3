//! Numeric column classification.

use tracing::debug;

use crate::types::{Cell, ColumnStorage, Series};

use super::decimal::normalize;
use super::InferenceOptions;

/// Outcome of coercing one column to numbers, before the acceptance decision.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericInspection {
    /// Coerced values; cells that failed to parse are `None`.
    pub values: Series<f64>,
    /// Number of successfully parsed cells.
    pub parsed: usize,
    /// Minimum parsed count required for acceptance.
    pub threshold: usize,
}

impl NumericInspection {
    /// `true` when the column meets the coverage threshold.
    pub fn accepted(&self) -> bool {
        self.parsed >= self.threshold
    }

    /// The coerced series if accepted.
    pub fn into_accepted(self) -> Option<Series<f64>> {
        if self.accepted() { Some(self.values) } else { None }
    }
}

/// Classify a column as numeric using the default [`InferenceOptions`].
pub fn classify_numeric(cells: &[&Cell]) -> Option<Series<f64>> {
    inspect(cells, &InferenceOptions::default()).into_accepted()
}

/// Coerce a column to numbers and measure coverage.
pub fn inspect(cells: &[&Cell], options: &InferenceOptions) -> NumericInspection {
    let values = coerce_numeric(cells);
    let parsed = values.iter().flatten().count();
    let threshold = options.threshold(cells.len());
    debug!(parsed, threshold, total = cells.len(), "numeric coverage");
    NumericInspection {
        values,
        parsed,
        threshold,
    }
}

/// Coerce every cell to `f64`.
///
/// Columns whose storage is already numeric pass through; anything else is normalized with
/// [`normalize`] and strictly parsed with [`parse_decimal`].
pub fn coerce_numeric(cells: &[&Cell]) -> Series<f64> {
    if ColumnStorage::of(cells) == ColumnStorage::Numeric {
        return cells.iter().map(|c| c.as_f64()).collect();
    }
    cells
        .iter()
        .map(|c| normalize(c).and_then(|s| parse_decimal(&s)))
        .collect()
}

/// Strict decimal parse of an already-normalized token.
///
/// Accepts an optional sign, digits, one decimal point and an optional exponent. Words such
/// as `inf`/`nan` and non-finite results are rejected.
pub fn parse_decimal(token: &str) -> Option<f64> {
    let body = token.strip_prefix(['+', '-']).unwrap_or(token);
    if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[Option<&str>]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| v.map(Cell::text).unwrap_or(Cell::Null))
            .collect()
    }

    #[test]
    fn forty_percent_coverage_is_numeric() {
        let cells = column(&[
            Some("1"),
            Some("2,5"),
            Some("3"),
            Some("4"),
            None,
            None,
            None,
            None,
            None,
            None,
        ]);
        let refs: Vec<&Cell> = cells.iter().collect();
        let series = classify_numeric(&refs).unwrap();
        assert_eq!(series[1], Some(2.5));
        assert_eq!(series.iter().flatten().count(), 4);
    }

    #[test]
    fn twenty_percent_coverage_is_rejected() {
        let cells = column(&[
            Some("1"),
            Some("2"),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        ]);
        let refs: Vec<&Cell> = cells.iter().collect();
        let inspection = inspect(&refs, &InferenceOptions::default());
        assert_eq!(inspection.parsed, 2);
        assert_eq!(inspection.threshold, 3);
        assert!(classify_numeric(&refs).is_none());
    }

    #[test]
    fn numeric_storage_passes_through() {
        let cells = [Cell::Int64(2), Cell::Float64(1.5), Cell::Null];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            classify_numeric(&refs),
            Some(vec![Some(2.0), Some(1.5), None])
        );
    }

    #[test]
    fn boolean_column_is_numeric() {
        let cells = [Cell::Bool(true), Cell::Bool(false), Cell::Bool(true)];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            classify_numeric(&refs),
            Some(vec![Some(1.0), Some(0.0), Some(1.0)])
        );
    }

    #[test]
    fn booleans_mixed_with_integers_pass_through() {
        let cells = [Cell::Int64(3), Cell::Bool(true), Cell::Null, Cell::Bool(false)];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            coerce_numeric(&refs),
            vec![Some(3.0), Some(1.0), None, Some(0.0)]
        );
    }

    #[test]
    fn booleans_among_text_do_not_count() {
        let cells = [Cell::Bool(true), Cell::Utf8("x".to_string()), Cell::Utf8("y".to_string())];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(coerce_numeric(&refs), vec![None, None, None]);
    }

    #[test]
    fn text_with_digits_is_not_numeric() {
        let cells = column(&[Some("SKU-001"), Some("SKU-002"), Some("2024-01-15")]);
        let refs: Vec<&Cell> = cells.iter().collect();
        assert!(classify_numeric(&refs).is_none());
    }

    #[test]
    fn malformed_numerals_degrade_to_null() {
        let cells = column(&[Some("1,234,567"), Some("10"), Some("20")]);
        let refs: Vec<&Cell> = cells.iter().collect();
        assert_eq!(
            classify_numeric(&refs),
            Some(vec![None, Some(10.0), Some(20.0)])
        );
    }

    #[test]
    fn strict_parse_rejects_words() {
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("-infinity"), None);
        assert_eq!(parse_decimal("1.2.3"), None);
        assert_eq!(parse_decimal("-3.5"), Some(-3.5));
        assert_eq!(parse_decimal(".5"), Some(0.5));
        assert_eq!(parse_decimal("1e3"), Some(1000.0));
        assert_eq!(parse_decimal("1e400"), None);
    }

    #[test]
    fn all_null_column_is_rejected() {
        let cells = [Cell::Null, Cell::Null];
        let refs: Vec<&Cell> = cells.iter().collect();
        assert!(classify_numeric(&refs).is_none());
    }
}
