//! Unified ingestion entrypoints.
//!
//! Most callers should use [`ingest_batch`], which reads a list of `(bytes, file name)` pairs,
//! prepares every table and isolates failures per file:
//!
//! - The format is inferred from the file extension unless [`IngestionOptions::format`] is set.
//! - `.csv` yields one table named after the file; `.xlsx`/`.xls` yield one table per sheet,
//!   named `"<file> - <sheet>"`.
//! - A file that cannot be read lands in [`Batch::files_failed`] with a readable reason; the
//!   batch only fails as a whole when no table survives.
//! - If an [`IngestionObserver`] is provided, success/failure/alerts are reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{IngestionError, IngestionResult, ReaderError};
use crate::inference::InferenceOptions;
use crate::prepare::{PreparedTable, prepare_table_with};
use crate::types::RawTable;

use super::csv;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values (delimiter configurable).
    Csv,
    /// Spreadsheet workbooks, one table per sheet (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<IngestionFormat>,
    /// CSV field delimiter.
    pub csv_delimiter: u8,
    /// CSV values that read as missing.
    pub na_values: Vec<String>,
    /// Classification thresholds applied while preparing tables.
    pub inference: InferenceOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("csv_delimiter", &(self.csv_delimiter as char))
            .field("na_values", &self.na_values)
            .field("inference", &self.inference)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            csv_delimiter: b',',
            na_values: csv::DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            inference: InferenceOptions::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// A file that could not be used, with a readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// File name (or `"<file> - <sheet>"` for a rejected sheet).
    pub name: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome of ingesting several files.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Files that produced at least one prepared table, in input order.
    pub files_ok: Vec<String>,
    /// Files (or sheets) that were rejected.
    pub files_failed: Vec<FileFailure>,
    /// Prepared tables in input order.
    pub tables: Vec<PreparedTable>,
}

/// Read one file's tables without preparing them.
pub fn read_tables_from_bytes(
    bytes: &[u8],
    name: &str,
    options: &IngestionOptions,
) -> IngestionResult<Vec<RawTable>> {
    match resolve_format(name, options)? {
        IngestionFormat::Csv => {
            csv::read_csv_bytes(bytes, name, options.csv_delimiter, &options.na_values)
                .map(|t| vec![t])
        }
        IngestionFormat::Excel => read_workbook_dispatch(bytes, name),
    }
}

/// Read and prepare one in-memory file.
///
/// Unlike [`ingest_batch`], any failure (including a duplicate column label in one sheet)
/// fails the whole file.
///
/// ```rust
/// use rust_data_consolidation::ingestion::{load_from_bytes, IngestionOptions};
/// use rust_data_consolidation::types::ColumnRole;
///
/// # fn main() -> Result<(), rust_data_consolidation::IngestionError> {
/// let csv = b"Data,Valor\n2024-01-15,\"1.234,56\"\n2024-01-16,10\n";
/// let tables = load_from_bytes(csv, "vendas.csv", &IngestionOptions::default())?;
/// assert_eq!(tables[0].role("Valor"), Some(ColumnRole::Numeric));
/// assert_eq!(tables[0].numeric_series("Valor").unwrap()[0], Some(1234.56));
/// # Ok(())
/// # }
/// ```
pub fn load_from_bytes(
    bytes: &[u8],
    name: &str,
    options: &IngestionOptions,
) -> IngestionResult<Vec<PreparedTable>> {
    let ctx = context_for(name, options);
    let result = read_tables_from_bytes(bytes, name, options).and_then(|tables| {
        tables
            .into_iter()
            .map(|t| prepare_table_with(t, &options.inference))
            .collect::<IngestionResult<Vec<_>>>()
    });
    match &result {
        Ok(tables) => report_success(options, &ctx, tables),
        Err(e) => report_failure(options, &ctx, e),
    }
    result
}

/// Read and prepare a local file. Tables are named after the file name.
pub fn load_from_path(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> IngestionResult<Vec<PreparedTable>> {
    let path = path.as_ref();
    let name = file_name_of(path);
    match std::fs::read(path) {
        Ok(bytes) => load_from_bytes(&bytes, &name, options),
        Err(e) => {
            let err = IngestionError::file_read(&name, e);
            report_failure(options, &context_for(&name, options), &err);
            Err(err)
        }
    }
}

/// Ingest several in-memory files, isolating failures per file.
///
/// Fails with [`IngestionError::EmptyInput`] only when no table survives.
pub fn ingest_batch<I, B, S>(files: I, options: &IngestionOptions) -> IngestionResult<Batch>
where
    I: IntoIterator<Item = (B, S)>,
    B: AsRef<[u8]>,
    S: AsRef<str>,
{
    let mut builder = BatchBuilder::new(options);
    for (bytes, name) in files {
        builder.add_file(bytes.as_ref(), name.as_ref());
    }
    builder.finish()
}

/// Ingest every regular file directly inside `dir` (non-recursive, sorted by file name).
///
/// Unsupported or unreadable files are reported in [`Batch::files_failed`].
pub fn load_directory(dir: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Batch> {
    let dir = dir.as_ref();
    let mut builder = BatchBuilder::new(options);
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(IngestionError::file_read(
                    dir.display().to_string(),
                    std::io::Error::from(e),
                ));
            }
            Err(e) => {
                let name = e.path().map(file_name_of).unwrap_or_default();
                builder.add_failure(
                    &name,
                    None,
                    IngestionError::file_read(&name, std::io::Error::from(e)),
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match std::fs::read(entry.path()) {
            Ok(bytes) => builder.add_file(&bytes, &name),
            Err(e) => {
                let format = resolve_format(&name, options).ok();
                builder.add_failure(&name, format, IngestionError::file_read(&name, e));
            }
        }
    }
    builder.finish()
}

/// Severity assigned to an ingestion error for observer callbacks and alerting.
pub fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::FileRead { source, .. } => match source {
            ReaderError::Io(_) => IngestionSeverity::Critical,
            ReaderError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
                _ => IngestionSeverity::Error,
            },
            #[cfg(feature = "excel")]
            ReaderError::Excel(err) => {
                // Workbook errors wrap I/O in several places; look through the source chain.
                if error_chain_contains_io(err) {
                    IngestionSeverity::Critical
                } else {
                    IngestionSeverity::Error
                }
            }
            ReaderError::Malformed { .. } => IngestionSeverity::Error,
        },
        IngestionError::ColumnLabelConflict { .. } => IngestionSeverity::Error,
        IngestionError::UnsupportedFormat { .. } => IngestionSeverity::Warning,
        IngestionError::EmptyInput { .. } => IngestionSeverity::Critical,
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

struct BatchBuilder<'a> {
    options: &'a IngestionOptions,
    batch: Batch,
}

impl<'a> BatchBuilder<'a> {
    fn new(options: &'a IngestionOptions) -> Self {
        Self {
            options,
            batch: Batch::default(),
        }
    }

    fn add_file(&mut self, bytes: &[u8], name: &str) {
        let ctx = context_for(name, self.options);
        let raw_tables = match read_tables_from_bytes(bytes, name, self.options) {
            Ok(tables) => tables,
            Err(e) => {
                self.add_failure(name, ctx.format, e);
                return;
            }
        };
        if raw_tables.is_empty() {
            self.push_failure(name, "file contains no tables".to_string());
            return;
        }

        let mut prepared = Vec::with_capacity(raw_tables.len());
        for raw in raw_tables {
            let table_name = raw.name.clone();
            match prepare_table_with(raw, &self.options.inference) {
                Ok(table) => prepared.push(table),
                Err(e) => self.add_failure(&table_name, ctx.format, e),
            }
        }
        if prepared.is_empty() {
            return;
        }

        report_success(self.options, &ctx, &prepared);
        self.batch.files_ok.push(name.to_string());
        self.batch.tables.extend(prepared);
    }

    fn add_failure(&mut self, name: &str, format: Option<IngestionFormat>, error: IngestionError) {
        let ctx = IngestionContext {
            name: name.to_string(),
            format,
        };
        report_failure(self.options, &ctx, &error);
        self.push_failure(name, error.to_string());
    }

    fn push_failure(&mut self, name: &str, reason: String) {
        warn!(name, %reason, "file skipped");
        self.batch.files_failed.push(FileFailure {
            name: name.to_string(),
            reason,
        });
    }

    fn finish(self) -> IngestionResult<Batch> {
        let batch = self.batch;
        info!(
            files_ok = batch.files_ok.len(),
            files_failed = batch.files_failed.len(),
            tables = batch.tables.len(),
            "batch ingested"
        );
        if batch.tables.is_empty() {
            let message = if batch.files_failed.is_empty() {
                "no files supplied".to_string()
            } else {
                let reasons: Vec<String> = batch
                    .files_failed
                    .iter()
                    .map(|f| format!("{}: {}", f.name, f.reason))
                    .collect();
                format!("every file failed ({})", reasons.join("; "))
            };
            return Err(IngestionError::EmptyInput { message });
        }
        Ok(batch)
    }
}

fn resolve_format(name: &str, options: &IngestionOptions) -> IngestionResult<IngestionFormat> {
    if let Some(format) = options.format {
        return Ok(format);
    }
    let ext = Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::UnsupportedFormat {
        name: name.to_string(),
        extension: ext.to_string(),
    })
}

fn context_for(name: &str, options: &IngestionOptions) -> IngestionContext {
    IngestionContext {
        name: name.to_string(),
        format: resolve_format(name, options).ok(),
    }
}

fn report_success(options: &IngestionOptions, ctx: &IngestionContext, tables: &[PreparedTable]) {
    if let Some(obs) = options.observer.as_ref() {
        obs.on_success(
            ctx,
            IngestionStats {
                tables: tables.len(),
                rows: tables.iter().map(PreparedTable::row_count).sum(),
            },
        );
    }
}

fn report_failure(options: &IngestionOptions, ctx: &IngestionContext, error: &IngestionError) {
    if let Some(obs) = options.observer.as_ref() {
        let sev = severity_for_error(error);
        obs.on_failure(ctx, sev, error);
        if sev >= options.alert_at_or_above {
            obs.on_alert(ctx, sev, error);
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_workbook_dispatch(bytes: &[u8], name: &str) -> IngestionResult<Vec<RawTable>> {
    #[cfg(feature = "excel")]
    {
        super::excel::read_workbook_bytes(bytes, name)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = bytes;
        Err(IngestionError::file_read(
            name,
            ReaderError::Malformed {
                message: "workbook support not enabled (enable cargo feature 'excel')".to_string(),
            },
        ))
    }
}
