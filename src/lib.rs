//! `rust-data-consolidation` infers column types in loosely formatted tabular files, normalizes
//! their values and consolidates them into one dataset with a summary.
//!
//! No schema is declared up front. Every column of every table is classified once as numeric,
//! temporal or text from its values, tolerating Brazilian and US decimal conventions, several
//! date layouts and Portuguese/English month names.
//!
//! ## What you can ingest
//!
//! **File formats (auto-detected by extension):**
//!
//! - **CSV**: `.csv`, one table named after the file
//! - **Excel/workbooks** (Cargo feature `excel`, on by default): `.xlsx`, `.xls`, one table per
//!   sheet named `"<file> - <sheet>"`
//!
//! Across formats, empty cells, whitespace-only strings and (for CSV) the usual NA spellings map
//! to [`types::Cell::Null`].
//!
//! ## Quick example: analyse a batch
//!
//! ```rust
//! use rust_data_consolidation::consolidate::ConsolidateOptions;
//! use rust_data_consolidation::ingestion::IngestionOptions;
//! use rust_data_consolidation::pipeline::analyze;
//! use rust_data_consolidation::processing::{reduce, ReduceOp};
//! use rust_data_consolidation::types::Cell;
//!
//! # fn main() -> Result<(), rust_data_consolidation::IngestionError> {
//! let january = b"Data,Produto,Valor\n05/01/2024,Caneta,\"1.234,50\"\n20/01/2024,Lapis,10\n";
//! let february = b"Data,Produto,Valor\n2024-02-03,Caneta,\"5,50\"\n";
//!
//! let analysis = analyze(
//!     vec![(&january[..], "janeiro.csv"), (&february[..], "fevereiro.csv")],
//!     &IngestionOptions::default(),
//!     &ConsolidateOptions::default(),
//! )?;
//!
//! assert_eq!(analysis.summary.total_records, 3);
//! assert_eq!(analysis.summary.temporal_columns, vec!["Data"]);
//! assert_eq!(
//!     reduce(&analysis.consolidated, "Valor", ReduceOp::Sum),
//!     Some(Cell::Float64(1250.0))
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV/workbook readers, batch and directory loading, observers
//! - [`types`]: cells, raw tables and column roles
//! - [`inference`]: decimal normalizer and the numeric/temporal/text classifiers
//! - [`prepare`]: table preparation and temporal derivation
//! - [`consolidate`]: outer union of prepared tables with duplicate removal
//! - [`summary`]: dataset summary (column lists, date range, record counts)
//! - [`processing`]: period filters, reductions and column profiles
//! - [`pipeline`]: the whole engine in one call
//! - [`error`]: error types
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod consolidate;
pub mod error;
pub mod inference;
pub mod ingestion;
pub mod pipeline;
pub mod prepare;
pub mod processing;
pub mod summary;
pub mod types;

pub use error::{IngestionError, IngestionResult, ReaderError};
