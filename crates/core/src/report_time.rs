//! Rendering of the report timestamp written to the sheet.
//!
//! Stored report times read like `19 Oct 2026, 14:05` (day, short month,
//! year, 24-hour clock). The forms submit either that shape without the comma
//! or a browser `datetime-local` value.

use chrono::{DateTime, NaiveDateTime};

/// Output shape of a stored report time.
pub const REPORT_TIME_FORMAT: &str = "%d %b %Y, %H:%M";

/// Input shapes accepted besides RFC 3339.
const INPUT_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M",
    "%d %b %Y, %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Normalise a submitted report time for storage.
///
/// Empty input stays empty. Input that matches none of the known shapes is
/// returned unchanged so nothing the reporter typed is lost.
pub fn format_report_time(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match parse_report_time(trimmed) {
        Some(parsed) => parsed.format(REPORT_TIME_FORMAT).to_string(),
        None => {
            tracing::debug!(value = trimmed, "Unrecognised report time, storing as-is");
            raw.to_string()
        }
    }
}

fn parse_report_time(value: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }
    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
