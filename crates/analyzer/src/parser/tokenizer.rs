use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::parser::traits::*;
use crate::parser::{FieldValue, MAX_LINE_SIZE, NUMERIC_FIELDS, REQUIRED_FIELDS};

/// Parser for router access lines:
/// `2014-01-09T06:17:14.925860+00:00 heroku[router]: at=info method=GET ...`
///
/// The first two whitespace-separated words are the timestamp and the
/// router tag; everything after them is a run of `key=value` tokens.
#[derive(Debug, Clone)]
pub struct RouterLogParser {
    max_line_size: usize,
}

impl Default for RouterLogParser {
    fn default() -> Self {
        Self {
            max_line_size: MAX_LINE_SIZE,
        }
    }
}

impl RouterLogParser {
    pub fn new(max_line_size: usize) -> Self {
        Self { max_line_size }
    }

    pub fn max_line_size(&self) -> usize {
        self.max_line_size
    }

    /// Tokenize a line, collapsing every rejection into an empty map.
    pub fn tokenize(&self, line: &str) -> FieldMap {
        self.parse_str(line).unwrap_or_default()
    }

    /// Tokenize a line, reporting why it was rejected.
    pub fn parse_str(&self, line: &str) -> Result<FieldMap, ParseError> {
        if line.len() > self.max_line_size {
            return Err(ParseError::LineTooLarge(line.len(), self.max_line_size));
        }
        parse_fields(line)
    }
}

impl LogParser for RouterLogParser {
    fn parse(&self, raw: &[u8]) -> Result<FieldMap, ParseError> {
        if raw.len() > self.max_line_size {
            return Err(ParseError::LineTooLarge(raw.len(), self.max_line_size));
        }

        let text = std::str::from_utf8(raw).map_err(|_| ParseError::NonUtf8)?;
        parse_fields(text)
    }
}

/// Tokenize one line with the default parser.
///
/// Returns an empty map when the line is malformed or lacks any required field.
pub fn tokenize(line: &str) -> FieldMap {
    RouterLogParser::default().tokenize(line)
}

fn parse_fields(line: &str) -> Result<FieldMap, ParseError> {
    if line.trim_matches(is_separator).is_empty() {
        return Err(ParseError::Empty);
    }

    let (time, router, pairs) = split_header(line).ok_or(ParseError::Truncated)?;

    let mut fields = FieldMap::new();
    for token in pairs.split_ascii_whitespace() {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| ParseError::MalformedPair(token.to_string()))?;
        fields.insert(key, value);
    }

    fields.insert("router", router);

    // An unparsable timestamp drops the key; the required-field check rejects the line.
    match parse_timestamp(time) {
        Some(ts) => {
            fields.insert("time", ts);
        }
        None => {
            fields.remove("time");
        }
    }

    for key in NUMERIC_FIELDS {
        coerce_numeric(&mut fields, key);
    }

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|key| !fields.contains_key(key))
        .collect();

    if !missing.is_empty() {
        return Err(ParseError::MissingFields(missing));
    }

    Ok(fields)
}

/// Split off the timestamp and router tag, leaving the key=value remainder
/// untouched (it may contain internal whitespace).
fn split_header(line: &str) -> Option<(&str, &str, &str)> {
    let line = line.trim_start_matches(is_separator);
    let (time, rest) = line.split_once(is_separator)?;
    let (router, pairs) = rest.trim_start_matches(is_separator).split_once(is_separator)?;
    Some((time, router, pairs.trim_start_matches(is_separator)))
}

/// Only ASCII whitespace separates tokens; other spaces belong to values.
fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// Replace a text value with its leading integer, or drop it when the value
/// does not start with a digit.
fn coerce_numeric(fields: &mut FieldMap, key: &str) {
    let parsed = match fields.get(key) {
        Some(FieldValue::Text(raw)) => leading_integer(raw),
        Some(FieldValue::Int(n)) => Some(*n),
        Some(FieldValue::Time(_)) => None,
        None => return,
    };

    match parsed {
        Some(n) => {
            fields.insert(key, n);
        }
        None => {
            fields.remove(key);
        }
    }
}

/// `"15ms"` → `Some(15)`, `"Seventyms"` → `None`.
///
/// Digits past `i64::MAX` do not fit and are treated as non-numeric.
pub(crate) fn leading_integer(raw: &str) -> Option<i64> {
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    if end == 0 {
        return None;
    }
    raw[..end].parse().ok()
}

/// ISO 8601 extended and basic forms carrying an offset (`Z`, `+09`, `+0900`, `+09:00`).
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
    "%Y%m%dT%H%M%#z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Parse an ISO 8601 timestamp. Forms without an offset are taken as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts);
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc().fixed_offset())
        })
}
