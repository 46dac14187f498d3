//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_batch`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - reads each file into one or more [`crate::types::RawTable`]s and prepares them
//! - isolates failures per file and reports them to an optional [`IngestionObserver`]
//!
//! Format-specific readers are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity,
    IngestionStats, TracingObserver,
};
pub use unified::{
    Batch, FileFailure, IngestionFormat, IngestionOptions, ingest_batch, load_directory,
    load_from_bytes, load_from_path, read_tables_from_bytes, severity_for_error,
};
