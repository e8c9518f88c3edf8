//! Model — AnalyzerConfig and related structs.

use serde::{Deserialize, Serialize};

use crate::parser::MAX_LINE_SIZE;
use crate::stats::AccumulatorKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Log read when no file is named on the command line
    pub log_file: String,
    pub strategy: AccumulatorKind,
    pub max_line_bytes: usize,
    /// Routes to report on; registration order is dispatch order
    pub endpoints: Vec<EndpointSpec>,
    pub logging: LoggingConfig,
}

/// One route: HTTP method plus a path that may contain `{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub method: String,
    pub path: String,
}

impl EndpointSpec {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// The PlayLab API routes.
pub fn default_endpoints() -> Vec<EndpointSpec> {
    vec![
        EndpointSpec::new("GET", "/api/users/{user_id}/count_pending_messages"),
        EndpointSpec::new("GET", "/api/users/{user_id}/get_messages"),
        EndpointSpec::new("GET", "/api/users/{user_id}/get_friends_progress"),
        EndpointSpec::new("GET", "/api/users/{user_id}/get_friends_score"),
        EndpointSpec::new("POST", "/api/users/{user_id}"),
        EndpointSpec::new("GET", "/api/users/{user_id}"),
    ]
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            log_file: "logs/sample.log".to_string(),
            strategy: AccumulatorKind::LowMemory,
            max_line_bytes: MAX_LINE_SIZE,
            endpoints: default_endpoints(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── AnalyzerConfig Defaults ──────────────────────────────────

    #[test]
    fn test_default_log_file() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.log_file, "logs/sample.log");
    }

    #[test]
    fn test_default_strategy_is_low_memory() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.strategy, AccumulatorKind::LowMemory);
    }

    #[test]
    fn test_default_line_limit() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.max_line_bytes, 1_048_576);
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = default_endpoints();
        assert_eq!(endpoints.len(), 6);
        assert_eq!(endpoints[4], EndpointSpec::new("POST", "/api/users/{user_id}"));
        assert!(endpoints.iter().all(|ep| ep.path.contains("{user_id}")));
    }

    // ── LoggingConfig Defaults ───────────────────────────────────

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.format, LogFormat::Pretty);
    }
}
