//! Endpoint — route patterns, per-route accumulators and the dispatch registry.

pub mod error;
pub mod pattern;
pub mod matcher;
pub mod registry;

pub use error::EndpointError;
pub use pattern::{compile_pattern, make_identifier, PathPattern, USER_ID_PLACEHOLDER};
pub use matcher::Endpoint;
pub use registry::EndpointRegistry;
