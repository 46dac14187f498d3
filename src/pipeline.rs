//! Single-call analysis: ingest → prepare → consolidate → summarize.

use tracing::info;

use crate::consolidate::{ConsolidateOptions, ConsolidatedDataset, consolidate};
use crate::error::IngestionResult;
use crate::ingestion::{Batch, IngestionOptions, ingest_batch};
use crate::summary::{DatasetSummary, summarize};

/// Everything produced by one [`analyze`] call.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Ingestion outcome, including the prepared tables.
    pub batch: Batch,
    /// Outer union of the prepared tables.
    pub consolidated: ConsolidatedDataset,
    /// Summary carrying file lists and consolidation counts.
    pub summary: DatasetSummary,
}

/// Run the whole engine over in-memory files.
///
/// Per-file failures end up in `summary.files_failed`; only an empty outcome is an error.
///
/// ```rust
/// use rust_data_consolidation::consolidate::ConsolidateOptions;
/// use rust_data_consolidation::ingestion::IngestionOptions;
/// use rust_data_consolidation::pipeline::analyze;
///
/// # fn main() -> Result<(), rust_data_consolidation::IngestionError> {
/// let files = vec![
///     (b"Data,Valor\n15/01/2024,10\n".to_vec(), "janeiro.csv"),
///     (b"not a table".to_vec(), "notas.txt"),
/// ];
/// let analysis = analyze(files, &IngestionOptions::default(), &ConsolidateOptions::default())?;
/// assert_eq!(analysis.summary.files_ok, vec!["janeiro.csv"]);
/// assert_eq!(analysis.summary.files_failed[0].name, "notas.txt");
/// assert_eq!(analysis.summary.date_range.formatted().0.as_deref(), Some("15/01/2024"));
/// # Ok(())
/// # }
/// ```
pub fn analyze<I, B, S>(
    files: I,
    ingestion: &IngestionOptions,
    consolidation: &ConsolidateOptions,
) -> IngestionResult<Analysis>
where
    I: IntoIterator<Item = (B, S)>,
    B: AsRef<[u8]>,
    S: AsRef<str>,
{
    let batch = ingest_batch(files, ingestion)?;
    let consolidated = consolidate(&batch.tables, consolidation)?;
    let summary = summarize(&batch.tables)
        .with_files(batch.files_ok.clone(), batch.files_failed.clone())
        .with_consolidation(&consolidated);

    info!(
        files_ok = summary.files_ok.len(),
        files_failed = summary.files_failed.len(),
        total_records = summary.total_records,
        consolidated_records = consolidated.row_count(),
        "analysis complete"
    );

    Ok(Analysis {
        batch,
        consolidated,
        summary,
    })
}
