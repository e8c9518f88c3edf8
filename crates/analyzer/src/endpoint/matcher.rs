use std::collections::HashMap;

use crate::parser::FieldMap;
use crate::stats::{Accumulator, AccumulatorKind, Summary};

use super::{make_identifier, EndpointError, PathPattern};

/// One registered route and everything recorded against it.
///
/// Owns four accumulators fed from each matching line: connect time,
/// service time, total response time (connect + service) and bytes.
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: String,
    path: String,
    id: String,
    pattern: PathPattern,
    called: u64,
    /// dyno → calls served for this endpoint
    dynos: HashMap<String, u64>,
    busiest_dyno: Option<String>,
    connect: Accumulator,
    service: Accumulator,
    response: Accumulator,
    bytes: Accumulator,
}

impl Endpoint {
    pub fn new(method: &str, path: &str) -> Result<Self, EndpointError> {
        Self::with_strategy(method, path, AccumulatorKind::default())
    }

    pub fn with_strategy(
        method: &str,
        path: &str,
        strategy: AccumulatorKind,
    ) -> Result<Self, EndpointError> {
        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
            id: make_identifier(method, path),
            pattern: PathPattern::new(path)?,
            called: 0,
            dynos: HashMap::new(),
            busiest_dyno: None,
            connect: strategy.build(),
            service: strategy.build(),
            response: strategy.build(),
            bytes: strategy.build(),
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The path pattern as declared (placeholder intact).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn called(&self) -> u64 {
        self.called
    }

    pub fn busiest_dyno(&self) -> Option<&str> {
        self.busiest_dyno.as_deref()
    }

    pub fn dyno_calls(&self, dyno: &str) -> u64 {
        self.dynos.get(dyno).copied().unwrap_or(0)
    }

    pub fn dynos(&self) -> &HashMap<String, u64> {
        &self.dynos
    }

    pub fn connect(&self) -> &Accumulator {
        &self.connect
    }

    pub fn service(&self) -> &Accumulator {
        &self.service
    }

    /// Connect + service time per call.
    pub fn response(&self) -> &Accumulator {
        &self.response
    }

    pub fn bytes(&self) -> &Accumulator {
        &self.bytes
    }

    /// Exact method match and full-path pattern match.
    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.pattern.is_match(path)
    }

    /// `matches` applied to a line's `method` and `path` fields.
    pub fn matches_fields(&self, fields: &FieldMap) -> bool {
        match (fields.get_str("method"), fields.get_str("path")) {
            (Some(method), Some(path)) => self.matches(method, path),
            _ => false,
        }
    }

    /// Record one served call, returning the total calls so far.
    ///
    /// Fails without touching any state when the fields belong to another
    /// endpoint or lack a value needed for the accumulators.
    pub fn record(&mut self, fields: &FieldMap) -> Result<u64, EndpointError> {
        if !self.matches_fields(fields) {
            return Err(EndpointError::Mismatch {
                endpoint: self.id.clone(),
                method: fields.get_str("method").unwrap_or_default().to_string(),
                path: fields.get_str("path").unwrap_or_default().to_string(),
            });
        }

        let connect = fields.get_int("connect").ok_or(EndpointError::InvalidField("connect"))?;
        let service = fields.get_int("service").ok_or(EndpointError::InvalidField("service"))?;
        let bytes = fields.get_int("bytes").ok_or(EndpointError::InvalidField("bytes"))?;
        let dyno = fields.get_str("dyno").ok_or(EndpointError::InvalidField("dyno"))?;
        let response = connect
            .checked_add(service)
            .ok_or(EndpointError::InvalidField("service"))?;

        self.connect.append(connect);
        self.service.append(service);
        self.response.append(response);
        self.bytes.append(bytes);

        let served = {
            let count = self.dynos.entry(dyno.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        // strict: the first dyno to reach a count keeps the title on ties
        let leader = self
            .busiest_dyno
            .as_deref()
            .map_or(0, |busiest| self.dyno_calls(busiest));
        if leader < served {
            self.busiest_dyno = Some(dyno.to_string());
        }

        self.called += 1;
        Ok(self.called)
    }
}
