//! Lenient field parsing for CSV columns
//!
//! Numeric columns never fail a row: a value that does not parse falls back
//! to a per-column default through [`parse_or_default`]. Numbers are read
//! with leading-prefix semantics, so `"85pts"` reads as 85.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Default level when the column is missing, unparsable or zero
pub const DEFAULT_LEVEL: i64 = 1;
/// Default score when the column is missing or unparsable
pub const DEFAULT_SCORE: i64 = 0;
/// Default speech/play time when the column is missing or unparsable
pub const DEFAULT_DURATION: f64 = 0.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Apply `parser` to `raw`, falling back to `default` when it yields `None`
///
/// Every numeric CSV column goes through here so the defaulting policy
/// lives in one place.
pub fn parse_or_default<T>(raw: &str, default: T, parser: impl Fn(&str) -> Option<T>) -> T {
    parser(raw).unwrap_or(default)
}

/// Level column: integer prefix, where 0 counts as missing
pub fn parse_level(raw: &str) -> i64 {
    parse_or_default(raw, DEFAULT_LEVEL, |s| {
        leading_int(s).filter(|level| *level != 0)
    })
}

/// Score column: integer prefix
pub fn parse_score(raw: &str) -> i64 {
    parse_or_default(raw, DEFAULT_SCORE, leading_int)
}

/// Speech/play time columns: float prefix
pub fn parse_duration(raw: &str) -> f64 {
    parse_or_default(raw, DEFAULT_DURATION, leading_float)
}

/// Parse the longest leading integer (optional sign, then digits)
///
/// Returns `None` when no digit is present or the value overflows.
pub fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// Parse the longest leading decimal number (sign, digits, fraction, exponent)
///
/// Non-finite results are treated as unparsable.
pub fn leading_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            mantissa_digits += 1;
        }
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a date column into a wall-clock timestamp
///
/// RFC 3339 values keep their local reading (offset dropped). Date-only
/// values mean midnight.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    None
}
