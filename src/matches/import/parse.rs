//! Turns the raw text of an uploaded fixture file into rows.
//!
//! The file is newline-delimited. The first non-blank line is a header and is
//! always discarded; every other non-blank line is split on commas into
//!
//! ```text
//! division, match number, home team, away team, date, time, location
//! ```
//!
//! where `time` and `location` may be missing.

use chrono::NaiveDateTime;
use thiserror::Error;

pub const DELIMITER: char = ',';
/// Fields beyond this many are ignored.
pub const MAX_FIELDS: usize = 7;
/// Lines with fewer fields than this are skipped.
pub const MIN_FIELDS: usize = 5;
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";
pub const DEFAULT_TIME: &str = "00:00";
/// How many rows [`preview`] returns.
pub const PREVIEW_ROWS: usize = 5;

/// A well-formed line of the import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub division: String,
    pub match_number: String,
    pub home_team: String,
    pub away_team: String,
    pub date: NaiveDateTime,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected at least {min} fields, found {found}", min = MIN_FIELDS)]
    TooFewFields { found: usize },
    #[error("\"{raw}\" is not a date in the form DD/MM/YYYY HH:MM")]
    InvalidDate { raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based line number within the uploaded file.
    pub line: usize,
    pub outcome: Result<ImportRow, RowError>,
}

/// The data lines of `text`, paired with their line numbers.
pub fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .skip(1)
}

pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(DELIMITER)
        .map(str::trim)
        .take(MAX_FIELDS)
        .collect()
}

/// Combines a date (`DD/MM/YYYY`) and an optional time (`HH:MM`).
pub fn parse_date_time(date: &str, time: &str) -> Result<NaiveDateTime, RowError> {
    let time = if time.is_empty() { DEFAULT_TIME } else { time };
    let raw = format!("{date} {time}");

    NaiveDateTime::parse_from_str(&raw, DATE_TIME_FORMAT)
        .map_err(|_| RowError::InvalidDate { raw })
}

pub fn parse_line(line: &str) -> Result<ImportRow, RowError> {
    let fields = split_fields(line);

    if fields.len() < MIN_FIELDS {
        return Err(RowError::TooFewFields {
            found: fields.len(),
        });
    }

    let field = |i: usize| fields.get(i).copied().unwrap_or("");

    Ok(ImportRow {
        division: field(0).to_string(),
        match_number: field(1).to_string(),
        home_team: field(2).to_string(),
        away_team: field(3).to_string(),
        date: parse_date_time(field(4), field(5))?,
        location: field(6).to_string(),
    })
}

fn parsed<'a>(lines: impl Iterator<Item = (usize, &'a str)>) -> Vec<ParsedRow> {
    lines
        .map(|(line, content)| ParsedRow {
            line,
            outcome: parse_line(content),
        })
        .collect()
}

pub fn parse_rows(text: &str) -> Vec<ParsedRow> {
    parsed(data_lines(text))
}

/// The first few rows of `text`, for showing before anything is written.
pub fn preview(text: &str) -> Vec<ParsedRow> {
    parsed(data_lines(text).take(PREVIEW_ROWS))
}
