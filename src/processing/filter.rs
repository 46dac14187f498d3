//! Row filtering by calendar period.

use chrono::Datelike;

use crate::prepare::PreparedTable;
use crate::types::RawTable;

/// Rows of `table` whose date falls in the requested period.
///
/// Each temporal column contributes a mask (non-null date, matching `year` and `month` when
/// given); the masks are OR-ed together. Returns `None` when the table has no temporal columns.
pub fn temporal_mask(table: &PreparedTable, year: Option<i32>, month: Option<u32>) -> Option<Vec<bool>> {
    let mut combined: Option<Vec<bool>> = None;
    for series in table.temporal().values() {
        let mask = series.values.iter().map(|d| {
            d.is_some_and(|d| {
                year.is_none_or(|y| d.year() == y) && month.is_none_or(|m| d.month() == m)
            })
        });
        combined = Some(match combined {
            None => mask.collect(),
            Some(acc) => acc.into_iter().zip(mask).map(|(a, b)| a || b).collect(),
        });
    }
    combined
}

/// Returns a new [`RawTable`] containing only the rows whose mask entry is `true`.
///
/// This is a convenience wrapper around [`RawTable::filter_rows`].
pub fn filter_rows(table: &PreparedTable, mask: &[bool]) -> RawTable {
    table.table().filter_rows(mask)
}
