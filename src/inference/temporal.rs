//! Temporal column classification.
//!
//! A column is run through a cascade of parsers and the first stage that yields at least one
//! date wins; later stages are never consulted for that column:
//!
//! 1. native date/time cells (e.g. spreadsheet dates)
//! 2. ISO `YYYY-MM-DD`
//! 3. day-first `DD/MM/YYYY`
//! 4. month-first `MM/DD/YYYY`
//! 5. localized month names (`"15 de janeiro de 2024"`, `"fev/2024"`), day-first
//! 6. generic best-effort formats without a day-first bias
//!
//! After the coverage threshold accepts a column, dates outside the plausible range
//! (1990-01-01..=2030-12-31 by default) are nulled. This catches epoch artifacts such as
//! `1970-01-01` before they reach min/max or per-period aggregates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{Cell, ColumnStorage, Series};

use super::InferenceOptions;

/// Which cascade stage produced a column's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    /// Cells were already dates.
    Native,
    /// `YYYY-MM-DD`.
    Iso,
    /// `DD/MM/YYYY`.
    DayFirst,
    /// `MM/DD/YYYY`.
    MonthFirst,
    /// Localized month names, day-first.
    MonthName,
    /// Last-resort formats.
    Generic,
}

/// An accepted temporal column.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalSeries {
    /// Parsed dates; unparseable and implausible cells are `None`.
    pub values: Series<NaiveDate>,
    /// Stage that produced the dates.
    pub stage: ParseStage,
    /// Cells parsed by the stage, before the plausibility filter.
    pub parsed: usize,
    /// Dates discarded by the plausibility filter.
    pub invalid_dates_removed: usize,
}

impl TemporalSeries {
    /// Number of dates that survived the plausibility filter.
    pub fn valid_count(&self) -> usize {
        self.values.iter().flatten().count()
    }

    /// Earliest valid date.
    pub fn min(&self) -> Option<NaiveDate> {
        self.values.iter().flatten().min().copied()
    }

    /// Latest valid date.
    pub fn max(&self) -> Option<NaiveDate> {
        self.values.iter().flatten().max().copied()
    }
}

/// Outcome of the parser cascade, before the acceptance decision.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalInspection {
    /// Winning stage, or `None` if no stage parsed anything.
    pub stage: Option<ParseStage>,
    /// Values produced by the winning stage.
    pub values: Series<NaiveDate>,
    /// Number of parsed cells.
    pub parsed: usize,
    /// Minimum parsed count required for acceptance.
    pub threshold: usize,
}

impl TemporalInspection {
    /// `true` when a stage parsed something and the coverage threshold is met.
    pub fn accepted(&self) -> bool {
        self.stage.is_some() && self.parsed >= self.threshold
    }

    /// Accept the column and apply the plausibility filter, or reject it.
    pub fn into_accepted(self, options: &InferenceOptions) -> Option<TemporalSeries> {
        if !self.accepted() {
            return None;
        }
        let stage = self.stage?;
        let mut values = self.values;
        let mut invalid_dates_removed = 0;
        for slot in values.iter_mut() {
            if let Some(date) = *slot {
                if !options.is_plausible(date) {
                    *slot = None;
                    invalid_dates_removed += 1;
                }
            }
        }
        if invalid_dates_removed > 0 {
            warn!(
                invalid_dates_removed,
                ?stage,
                "discarded dates outside the plausible range"
            );
        }
        Some(TemporalSeries {
            values,
            stage,
            parsed: self.parsed,
            invalid_dates_removed,
        })
    }
}

/// Classify a column as temporal using the default [`InferenceOptions`].
pub fn classify_temporal(cells: &[&Cell]) -> Option<TemporalSeries> {
    let options = InferenceOptions::default();
    inspect(cells, &options).into_accepted(&options)
}

/// Run the parser cascade and measure coverage.
pub fn inspect(cells: &[&Cell], options: &InferenceOptions) -> TemporalInspection {
    let threshold = options.threshold(cells.len());
    let (stage, values) = run_cascade(cells);
    let parsed = values.iter().flatten().count();
    debug!(?stage, parsed, threshold, total = cells.len(), "temporal coverage");
    TemporalInspection {
        stage,
        values,
        parsed,
        threshold,
    }
}

fn run_cascade(cells: &[&Cell]) -> (Option<ParseStage>, Series<NaiveDate>) {
    if ColumnStorage::of(cells) == ColumnStorage::Temporal {
        let values: Series<NaiveDate> = cells.iter().map(|c| native_date(c)).collect();
        return (Some(ParseStage::Native), values);
    }

    let stages: [(ParseStage, fn(&str) -> Option<NaiveDate>); 5] = [
        (ParseStage::Iso, parse_iso),
        (ParseStage::DayFirst, parse_day_first),
        (ParseStage::MonthFirst, parse_month_first),
        (ParseStage::MonthName, parse_month_name),
        (ParseStage::Generic, parse_generic),
    ];
    for (stage, parser) in stages {
        let values: Series<NaiveDate> = cells
            .iter()
            .map(|c| c.as_text().and_then(|t| parser(t.trim())))
            .collect();
        if values.iter().any(Option::is_some) {
            return (Some(stage), values);
        }
    }
    (None, vec![None; cells.len()])
}

fn native_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::DateTime(dt) => Some(dt.date()),
        _ => None,
    }
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_day_first(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

fn parse_month_first(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

/// Portuguese and English month names/abbreviations mapped to month numbers.
const MONTH_ALIASES: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("jan", 1),
    ("january", 1),
    ("fevereiro", 2),
    ("fev", 2),
    ("february", 2),
    ("feb", 2),
    ("março", 3),
    ("marco", 3),
    ("mar", 3),
    ("march", 3),
    ("abril", 4),
    ("abr", 4),
    ("april", 4),
    ("apr", 4),
    ("maio", 5),
    ("mai", 5),
    ("may", 5),
    ("junho", 6),
    ("jun", 6),
    ("june", 6),
    ("julho", 7),
    ("jul", 7),
    ("july", 7),
    ("agosto", 8),
    ("ago", 8),
    ("august", 8),
    ("aug", 8),
    ("setembro", 9),
    ("set", 9),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("outubro", 10),
    ("out", 10),
    ("october", 10),
    ("oct", 10),
    ("novembro", 11),
    ("nov", 11),
    ("november", 11),
    ("dezembro", 12),
    ("dez", 12),
    ("december", 12),
    ("dec", 12),
];

const CONNECTORS: [&str; 4] = ["de", "do", "of", "the"];

/// Month number for a (case-insensitive) Portuguese or English month name.
pub fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    MONTH_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, month)| *month)
}

/// Parse text containing a month name, a four-digit year and optionally a day.
///
/// Every alphabetic token must be a month name or a connector word (`de`, `of`), so free text
/// that merely mentions a month is not a date. A missing day means the first of the month.
fn parse_month_name(s: &str) -> Option<NaiveDate> {
    let mut month = None;
    let mut year = None;
    let mut day = None;

    for token in s.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
        if token.chars().all(|c| c.is_ascii_digit()) {
            match token.len() {
                4 if year.is_none() => year = token.parse::<i32>().ok(),
                1 | 2 if day.is_none() => day = token.parse::<u32>().ok(),
                _ => return None,
            }
        } else if let Some(m) = month_from_name(token) {
            if month.replace(m).is_some() {
                return None;
            }
        } else if !CONNECTORS.contains(&token.to_lowercase().as_str()) {
            return None;
        }
    }

    NaiveDate::from_ymd_opt(year?, month?, day.unwrap_or(1))
}

const GENERIC_DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M",
];

const GENERIC_DATE_FORMATS: [&str; 14] = [
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Best-effort parse. Ambiguous numeric layouts are tried month-first, then day-first.
fn parse_generic(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in GENERIC_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in GENERIC_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    None
}
