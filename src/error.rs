use thiserror::Error;

/// Convenience result type for ingestion, preparation and consolidation.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Failure raised by an underlying tabular reader while tokenizing a file.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizer error (invalid UTF-8, quoting problems, ...).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Workbook reader error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The bytes were readable but the table shape is unusable.
    #[error("{message}")]
    Malformed { message: String },
}

/// Error type shared across ingestion, preparation and consolidation.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The file extension is not one of `csv`, `xlsx`, `xls`.
    #[error("unsupported file format '.{extension}' for '{name}' (expected csv, xlsx or xls)")]
    UnsupportedFormat { name: String, extension: String },

    /// The tabular reader failed on this file; the reader's message is passed through.
    #[error("failed to read '{name}': {source}")]
    FileRead {
        name: String,
        #[source]
        source: ReaderError,
    },

    /// Two column labels of the same table collide after trimming.
    #[error("table '{table}' has duplicate column label '{label}' after trimming")]
    ColumnLabelConflict { table: String, label: String },

    /// Nothing usable survived ingestion, or consolidation was given no tables.
    #[error("no usable tables: {message}")]
    EmptyInput { message: String },
}

impl IngestionError {
    pub(crate) fn file_read(name: impl Into<String>, source: impl Into<ReaderError>) -> Self {
        IngestionError::FileRead {
            name: name.into(),
            source: source.into(),
        }
    }
}
