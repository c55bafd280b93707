//! Lenient parsing of stored cells.
//!
//! A bad cell never fails a page: it resolves to a default and a warning is logged.
//! Defaults: dates → today, times → now, timestamps → now, numbers → unset/0, text → "".

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::table::Cells;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        // "2024-01-01 00:00:00" as written for a datetime column
        .or_else(|| parse_timestamp_strict(s).map(|ts| ts.date()))
}

#[must_use]
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(s, f).ok())
}

fn parse_timestamp_strict(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}

/// Accepts full timestamps and bare dates (midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    parse_timestamp_strict(s).or_else(|| {
        DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
            .map(|d| d.and_time(NaiveTime::MIN))
    })
}

/// Integers may have been written as floats (`9.0`) by older files.
#[must_use]
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let in_range = f >= i64::MIN as f64 && f <= i64::MAX as f64;
        if in_range {
            return Some(f as i64);
        }
    }
    None
}

#[must_use]
pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

#[must_use]
pub fn format_time(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

#[must_use]
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Text cell; a missing column reads as the empty string.
#[must_use]
pub fn text(row: &impl Cells, column: &str) -> String {
    row.cell(column).unwrap_or_default().to_string()
}

pub fn date_or_today(row: &impl Cells, column: &str) -> NaiveDate {
    let raw = row.cell(column).unwrap_or_default();
    parse_date(raw).unwrap_or_else(|| {
        warn!(column, value = raw, "unparsable date, using today");
        Local::now().date_naive()
    })
}

/// Like [`date_or_today`] but an empty cell is a legitimate "unset".
pub fn optional_date(row: &impl Cells, column: &str) -> Option<NaiveDate> {
    let raw = row.cell(column).unwrap_or_default();
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse_date(raw);
    if parsed.is_none() {
        warn!(column, value = raw, "unparsable date, treating as unset");
    }
    parsed
}

pub fn time_or_now(row: &impl Cells, column: &str) -> NaiveTime {
    let raw = row.cell(column).unwrap_or_default();
    parse_time(raw).unwrap_or_else(|| {
        warn!(column, value = raw, "unparsable time, using current time");
        Local::now().time()
    })
}

pub fn timestamp_or_now(row: &impl Cells, column: &str) -> NaiveDateTime {
    let raw = row.cell(column).unwrap_or_default();
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!(column, value = raw, "unparsable timestamp, using now");
        Local::now().naive_local()
    })
}

pub fn optional_int(row: &impl Cells, column: &str) -> Option<i64> {
    let raw = row.cell(column).unwrap_or_default();
    if raw.trim().is_empty() {
        return None;
    }
    let parsed = parse_int(raw);
    if parsed.is_none() {
        warn!(column, value = raw, "unparsable number, treating as unset");
    }
    parsed
}
