// Module structure for the router-log analyzer.

// Core
pub mod parser;
pub mod stats;
pub mod endpoint;

// Driving
pub mod conf;
pub mod ingest;
pub mod summary;

pub use endpoint::{Endpoint, EndpointError, EndpointRegistry};
pub use conf::{AnalyzerConfig, ConfigError, EndpointSpec};
pub use ingest::{IngestError, Ingestor};
pub use parser::{tokenize, FieldMap, FieldValue};
pub use stats::{Accumulator, AccumulatorKind, MedianCapable, Summary};
pub use summary::{EndpointSummary, ScanSummary};
