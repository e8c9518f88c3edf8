//! Summary — serialisable snapshots of a finished (or running) scan.

use serde::Serialize;

use crate::endpoint::Endpoint;
use crate::ingest::Ingestor;
use crate::parser::MetricsSnapshot;
use crate::stats::{MedianCapable, Sample, Summary};

/// Report row for one endpoint. Statistics are `None` until it is called.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSummary {
    pub method: String,
    pub path: String,
    pub called: u64,
    pub response_mean: Option<f64>,
    pub response_median: Option<f64>,
    pub response_mode: Option<Vec<Sample>>,
    pub response_range: Option<u64>,
    pub busiest_dyno: Option<String>,
    pub bytes_mean: Option<f64>,
    pub bytes_max: Option<Sample>,
    pub connect_mean: Option<f64>,
    pub service_mean: Option<f64>,
}

impl From<&Endpoint> for EndpointSummary {
    fn from(endpoint: &Endpoint) -> Self {
        let response = endpoint.response();
        Self {
            method: endpoint.method().to_string(),
            path: endpoint.path().to_string(),
            called: endpoint.called(),
            response_mean: response.mean(),
            response_median: response.median(),
            response_mode: response.mode(),
            response_range: response.range(),
            busiest_dyno: endpoint.busiest_dyno().map(str::to_string),
            bytes_mean: endpoint.bytes().mean(),
            bytes_max: endpoint.bytes().high(),
            connect_mean: endpoint.connect().mean(),
            service_mean: endpoint.service().mean(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    /// In registration order
    pub endpoints: Vec<EndpointSummary>,
    pub total_lines: u64,
    pub unprocessed_lines: u64,
    pub parsing: MetricsSnapshot,
}

impl ScanSummary {
    pub fn new(ingestor: &Ingestor) -> Self {
        Self {
            endpoints: ingestor.registry().iter().map(EndpointSummary::from).collect(),
            total_lines: ingestor.total_lines(),
            unprocessed_lines: ingestor.unprocessed_lines(),
            parsing: ingestor.metrics().snapshot(),
        }
    }

    pub fn all_processed(&self) -> bool {
        self.unprocessed_lines == 0
    }
}
