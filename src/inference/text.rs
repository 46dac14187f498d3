//! Residual text classification.

use crate::types::{Cell, ColumnStorage};

/// `true` if a column not claimed by another role should be treated as text: its storage is
/// string or mixed and at least one cell is non-blank after trimming.
pub fn classify_text(cells: &[&Cell]) -> bool {
    matches!(
        ColumnStorage::of(cells),
        ColumnStorage::Text | ColumnStorage::Mixed
    ) && cells.iter().any(|c| !c.is_blank())
}
