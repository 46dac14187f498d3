//! CSV ingestion implementation.

use std::io::Read;
use std::path::Path;

use crate::error::{IngestionError, IngestionResult, ReaderError};
use crate::types::{Cell, RawTable};

/// Spellings of "missing" that read as [`Cell::Null`] unless overridden.
pub const DEFAULT_NA_VALUES: [&str; 8] = ["NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A"];

/// Read CSV bytes into a [`RawTable`] named `name`.
///
/// Rules:
///
/// - The first record is the header; empty header cells become `Unnamed: <idx>`.
/// - Every value is kept as text. Blank values and `na_values` read as null.
/// - Short records are padded with nulls; a record wider than the header is malformed.
pub fn read_csv_bytes(
    bytes: &[u8],
    name: &str,
    delimiter: u8,
    na_values: &[String],
) -> IngestionResult<RawTable> {
    read_csv_from_reader(bytes, name, delimiter, na_values)
}

/// Read a local CSV file. The table is named after the file name.
pub fn read_csv_from_path(
    path: impl AsRef<Path>,
    delimiter: u8,
    na_values: &[String],
) -> IngestionResult<RawTable> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = std::fs::File::open(path).map_err(|e| IngestionError::file_read(&name, e))?;
    read_csv_from_reader(file, &name, delimiter, na_values)
}

/// Read CSV data from any reader.
pub fn read_csv_from_reader<R: Read>(
    reader: R,
    name: &str,
    delimiter: u8,
    na_values: &[String],
) -> IngestionResult<RawTable> {
    read_records(reader, name, delimiter, na_values).map_err(|e| IngestionError::file_read(name, e))
}

fn read_records<R: Read>(
    reader: R,
    name: &str,
    delimiter: u8,
    na_values: &[String],
) -> Result<RawTable, ReaderError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                h.to_string()
            }
        })
        .collect();
    let width = columns.len();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() > width {
            // 1-based, +1 for the header line.
            return Err(ReaderError::Malformed {
                message: format!(
                    "line {}: expected {width} fields, found {}",
                    row_idx0 + 2,
                    record.len()
                ),
            });
        }
        let mut row: Vec<Cell> = record.iter().map(|raw| to_cell(raw, na_values)).collect();
        row.resize(width, Cell::Null);
        rows.push(row);
    }

    Ok(RawTable::new(name, columns, rows))
}

fn to_cell(raw: &str, na_values: &[String]) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() || na_values.iter().any(|na| na == trimmed) {
        Cell::Null
    } else {
        Cell::Utf8(raw.to_string())
    }
}
