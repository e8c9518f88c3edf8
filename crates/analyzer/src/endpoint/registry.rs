use std::collections::HashMap;
use tracing::debug;

use crate::conf::EndpointSpec;
use crate::parser::FieldMap;
use crate::stats::AccumulatorKind;

use super::{make_identifier, Endpoint, EndpointError};

/// All registered endpoints, in registration order.
///
/// Dispatch scans in that order and the first match wins, so order is the
/// tie-break when two patterns could claim the same path.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
    /// identifier → position in `endpoints`
    index: HashMap<String, usize>,
    unprocessed_lines: u64,
    strategy: AccumulatorKind,
}

impl EndpointRegistry {
    pub fn new(strategy: AccumulatorKind) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Build a registry from configured endpoints, failing on the first duplicate.
    pub fn from_specs(specs: &[EndpointSpec], strategy: AccumulatorKind) -> Result<Self, EndpointError> {
        let mut registry = Self::new(strategy);
        for spec in specs {
            registry.register(&spec.method, &spec.path)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, method: &str, path: &str) -> Result<&Endpoint, EndpointError> {
        let id = make_identifier(method, path);
        if self.index.contains_key(&id) {
            return Err(EndpointError::Duplicate(id));
        }

        let endpoint = Endpoint::with_strategy(method, path, self.strategy)?;
        debug!(endpoint = %id, strategy = %self.strategy, "Registered endpoint");

        let position = self.endpoints.len();
        self.index.insert(id, position);
        self.endpoints.push(endpoint);
        Ok(&self.endpoints[position])
    }

    pub fn strategy(&self) -> AccumulatorKind {
        self.strategy
    }

    pub fn get(&self, id: &str) -> Option<&Endpoint> {
        self.index.get(id).map(|&position| &self.endpoints[position])
    }

    /// First endpoint (in registration order) serving `method` + `path`.
    pub fn find(&self, method: &str, path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| ep.matches(method, path))
    }

    /// Route one tokenized line to the first matching endpoint.
    ///
    /// Returns `Ok(false)` and counts the line as unprocessed when nothing
    /// matches (an empty map never matches).
    pub fn dispatch(&mut self, fields: &FieldMap) -> Result<bool, EndpointError> {
        match self.endpoints.iter_mut().find(|ep| ep.matches_fields(fields)) {
            Some(endpoint) => {
                endpoint.record(fields)?;
                Ok(true)
            }
            None => {
                self.unprocessed_lines += 1;
                Ok(false)
            }
        }
    }

    /// Lines that matched no endpoint (including rejected lines).
    pub fn unprocessed_lines(&self) -> u64 {
        self.unprocessed_lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
