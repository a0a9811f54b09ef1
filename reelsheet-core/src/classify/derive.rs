//! Derived output fields: month labels and engagement totals.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date part of a sheet cell, for the shapes discovery writes and people type.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// `October-2026`, or empty when the date cannot be read.
pub fn month_label(text: &str) -> String {
    parse_date(text)
        .map(|d| d.format("%B-%Y").to_string())
        .unwrap_or_default()
}

/// `Oct`, or empty when the date cannot be read.
pub fn month_abbrev(text: &str) -> String {
    parse_date(text)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}

/// A count cell as an integer. Anything but a non-empty run of ASCII digits is 0.
/// `None` only for a digit run too large to represent.
pub fn coerce_count(text: &str) -> Option<u64> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        Some(0)
    }
}

/// Sum of coerced counts. `None` if any count or the sum overflows.
pub fn engagement_total(values: &[&str]) -> Option<u64> {
    values
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_add(coerce_count(v)?))
}

/// Engagement as written to a sheet cell; empty when it cannot be computed.
pub fn engagement_cell(values: &[&str]) -> String {
    engagement_total(values)
        .map(|n| n.to_string())
        .unwrap_or_default()
}
