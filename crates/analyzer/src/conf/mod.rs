//! Conf module — analyzer configuration model and loading.

pub mod model;
pub mod load;

pub use model::{default_endpoints, AnalyzerConfig, EndpointSpec, LogFormat, LoggingConfig};
pub use load::ConfigError;
