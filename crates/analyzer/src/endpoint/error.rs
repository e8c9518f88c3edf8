use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// Fields handed to an endpoint that does not serve them
    #[error("Cannot record {method} {path} on endpoint {endpoint}: not the same endpoint")]
    Mismatch {
        endpoint: String,
        method: String,
        path: String,
    },

    #[error("Endpoint registered twice: {0}")]
    Duplicate(String),

    #[error("Invalid path pattern: {0}")]
    InvalidPattern(String),

    /// Required field absent, mistyped or out of range
    #[error("Invalid field for recording: {0}")]
    InvalidField(&'static str),
}
