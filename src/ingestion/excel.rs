#![cfg(feature = "excel")]

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto, open_workbook_auto_from_rs};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Cell, RawTable};

/// Read every sheet of an in-memory workbook (`.xlsx`, `.xls`) into one [`RawTable`] per sheet.
///
/// Behavior:
/// - Tables are named `"<file_name> - <sheet>"`, in workbook order
/// - The first non-empty row of a sheet is its header row; blank header cells become
///   `Unnamed: <idx>`
/// - Entirely empty rows below the header are skipped
/// - An empty sheet yields a table with no columns and no rows
/// - Native date cells become [`Cell::Date`] (or [`Cell::DateTime`] when a time is present)
pub fn read_workbook_bytes(bytes: &[u8], file_name: &str) -> IngestionResult<Vec<RawTable>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IngestionError::file_read(file_name, e))?;
    let sheets = workbook.sheet_names();
    let mut tables = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| IngestionError::file_read(file_name, e))?;
        tables.push(sheet_to_table(&format!("{file_name} - {sheet}"), &range));
    }
    Ok(tables)
}

/// Read every sheet of a local workbook file. Tables are named after the file name.
pub fn read_workbook_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<RawTable>> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut workbook =
        open_workbook_auto(path).map_err(|e| IngestionError::file_read(&file_name, e))?;
    let mut tables = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| IngestionError::file_read(&file_name, e))?;
        tables.push(sheet_to_table(&format!("{file_name} - {sheet}"), &range));
    }
    Ok(tables)
}

fn sheet_to_table(name: &str, range: &Range<Data>) -> RawTable {
    let mut rows = range.rows().skip_while(|row| is_empty_row(row));
    let Some(header) = rows.next() else {
        return RawTable::new(name, Vec::new(), Vec::new());
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let label = header_label(c);
            if label.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                label
            }
        })
        .collect();

    let body = rows
        .filter(|row| !is_empty_row(row))
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(convert_cell).collect();
            cells.resize(columns.len(), Cell::Null);
            cells
        })
        .collect();

    RawTable::new(name, columns, body)
}

fn is_empty_row(row: &[Data]) -> bool {
    row.iter().all(|c| match c {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

fn header_label(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{f:.0}"),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::Int(i) => Cell::Int64(*i),
        Data::Float(f) if f.is_nan() => Cell::Null,
        Data::Float(f) => Cell::Float64(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::text(s.as_str()),
        Data::DateTime(dt) if dt.is_duration() => Cell::Float64(dt.as_f64()),
        Data::DateTime(dt) => dt.as_datetime().map(datetime_cell).unwrap_or(Cell::Null),
        Data::DateTimeIso(s) => parse_iso_cell(s),
        Data::DurationIso(s) => Cell::text(s.as_str()),
    }
}

fn datetime_cell(dt: NaiveDateTime) -> Cell {
    if dt.time() == NaiveTime::MIN {
        Cell::Date(dt.date())
    } else {
        Cell::DateTime(dt)
    }
}

fn parse_iso_cell(s: &str) -> Cell {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(datetime_cell)
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Cell::Date))
        .unwrap_or_else(|_| Cell::text(s))
}
