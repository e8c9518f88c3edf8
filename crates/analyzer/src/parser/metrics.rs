use serde::Serialize;

use super::ParseError;

/// Rejection categories for metrics recording.
///
/// One bucket per [`ParseError`] variant, so the report can say *why*
/// lines were left out without keeping the lines themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricErrorType {
    /// Blank line
    Empty,
    /// Line exceeded the configured size limit
    TooLarge,
    /// Non-UTF8 content encountered
    NonUtf8,
    /// Fewer than three top-level parts
    Truncated,
    /// A token without `=`
    MalformedPair,
    /// One or more required fields absent or mistyped
    MissingFields,
}

impl From<&ParseError> for MetricErrorType {
    fn from(error: &ParseError) -> Self {
        match error {
            ParseError::Empty => MetricErrorType::Empty,
            ParseError::LineTooLarge(..) => MetricErrorType::TooLarge,
            ParseError::NonUtf8 => MetricErrorType::NonUtf8,
            ParseError::Truncated => MetricErrorType::Truncated,
            ParseError::MalformedPair(_) => MetricErrorType::MalformedPair,
            ParseError::MissingFields(_) => MetricErrorType::MissingFields,
        }
    }
}

/// Error counters by type
#[derive(Debug, Default, Clone)]
pub struct ErrorMetrics {
    pub empty: u64,
    pub too_large: u64,
    pub non_utf8: u64,
    pub truncated: u64,
    pub malformed_pair: u64,
    pub missing_fields: u64,
}

impl ErrorMetrics {
    fn total(&self) -> u64 {
        self.empty
            + self.too_large
            + self.non_utf8
            + self.truncated
            + self.malformed_pair
            + self.missing_fields
    }
}

/// Tokenization counters for one scan.
///
/// Ingestion is sequential, so these are plain integers owned by the
/// ingestor rather than shared atomics.
#[derive(Debug, Default, Clone)]
pub struct ParsingMetrics {
    pub parsed: u64,
    pub errors: ErrorMetrics,
}

impl ParsingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully tokenized line
    #[inline]
    pub fn record_parse(&mut self) {
        self.parsed += 1;
    }

    /// Record a rejected line
    #[inline]
    pub fn record_error(&mut self, error_type: MetricErrorType) {
        match error_type {
            MetricErrorType::Empty => self.errors.empty += 1,
            MetricErrorType::TooLarge => self.errors.too_large += 1,
            MetricErrorType::NonUtf8 => self.errors.non_utf8 += 1,
            MetricErrorType::Truncated => self.errors.truncated += 1,
            MetricErrorType::MalformedPair => self.errors.malformed_pair += 1,
            MetricErrorType::MissingFields => self.errors.missing_fields += 1,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let rejected = self.errors.total();
        let attempts = self.parsed + rejected;

        MetricsSnapshot {
            total_parsed: self.parsed,
            total_rejected: rejected,
            empty_lines: self.errors.empty,
            lines_too_large: self.errors.too_large,
            non_utf8_content: self.errors.non_utf8,
            truncated_lines: self.errors.truncated,
            malformed_pairs: self.errors.malformed_pair,
            missing_fields: self.errors.missing_fields,
            success_rate: if attempts > 0 {
                self.parsed as f64 / attempts as f64
            } else {
                1.0
            },
        }
    }
}

/// A read-only snapshot of parsing metrics, serializable for the JSON report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_parsed: u64,
    pub total_rejected: u64,

    // Rejections
    pub empty_lines: u64,
    pub lines_too_large: u64,
    pub non_utf8_content: u64,
    pub truncated_lines: u64,
    pub malformed_pairs: u64,
    pub missing_fields: u64,

    pub success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_empty() {
        let metrics = ParsingMetrics::new();
        let snap = metrics.snapshot();

        assert_eq!(snap.total_parsed, 0);
        assert_eq!(snap.total_rejected, 0);
        assert_eq!(snap.success_rate, 1.0);
    }

    #[test]
    fn test_error_recording_and_success_rate() {
        let mut metrics = ParsingMetrics::new();

        // 2 successes
        metrics.record_parse();
        metrics.record_parse();

        // 2 errors
        metrics.record_error(MetricErrorType::MissingFields);
        metrics.record_error(MetricErrorType::NonUtf8);

        let snap = metrics.snapshot();

        assert_eq!(snap.total_parsed, 2);
        assert_eq!(snap.total_rejected, 2);
        assert_eq!(snap.missing_fields, 1);
        assert_eq!(snap.non_utf8_content, 1);
        assert_eq!(snap.success_rate, 0.5);
    }

    #[test]
    fn test_classify_parse_errors() {
        let cases = vec![
            (ParseError::Empty, MetricErrorType::Empty),
            (ParseError::LineTooLarge(10, 5), MetricErrorType::TooLarge),
            (ParseError::NonUtf8, MetricErrorType::NonUtf8),
            (ParseError::Truncated, MetricErrorType::Truncated),
            (ParseError::MalformedPair("x".into()), MetricErrorType::MalformedPair),
            (ParseError::MissingFields(vec!["time"]), MetricErrorType::MissingFields),
        ];

        for (error, expected) in cases {
            assert_eq!(MetricErrorType::from(&error), expected, "{:?}", error);
        }
    }
}
