/// Router log tokenization
///
/// Turns one raw access-log line of the form
/// `TIMESTAMP ROUTERTAG key=value key=value ...` into a typed [`FieldMap`].
///
/// # Architecture
///
/// - `traits.rs`: the [`LogParser`] seam used by ingestion
/// - `model.rs`: [`FieldMap`], [`FieldValue`] and [`ParseError`]
/// - `tokenizer.rs`: the router format tokenizer and its validation rules
/// - `metrics.rs`: per-run parse counters
///
/// # Validation
///
/// A tokenized line is all-or-nothing: either every required field is
/// present and correctly typed, or the result is empty.

pub mod traits;
pub mod model;
pub mod tokenizer;
pub mod metrics;

// Re-export commonly used types
pub use traits::LogParser;
pub use model::{FieldMap, FieldValue, ParseError};
pub use tokenizer::{tokenize, RouterLogParser};
pub use metrics::{MetricErrorType, MetricsSnapshot, ParsingMetrics};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB

/// Fields every accepted line must carry.
pub const REQUIRED_FIELDS: [&str; 12] = [
    "time", "router",
    "at", "method", "path", "host", "fwd", "dyno",
    "connect", "service", "status", "bytes",
];

/// Fields converted to integers via their leading digits.
pub const NUMERIC_FIELDS: [&str; 4] = ["connect", "service", "status", "bytes"];
