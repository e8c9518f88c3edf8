//! Ingest — feeds router log lines through the tokenizer into the registry.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::conf::AnalyzerConfig;
use crate::endpoint::{EndpointError, EndpointRegistry};
use crate::parser::{
    FieldMap, LogParser, MetricErrorType, ParseError, ParsingMetrics, RouterLogParser,
};
use crate::summary::ScanSummary;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read log: {0}")]
    Io(#[from] std::io::Error),
}

/// Drives one scan: tokenizes each line, dispatches it and keeps counts.
#[derive(Debug)]
pub struct Ingestor {
    parser: RouterLogParser,
    registry: EndpointRegistry,
    metrics: ParsingMetrics,
    total_lines: u64,
    /// Matched lines the endpoint refused to record
    refused_lines: u64,
}

impl Ingestor {
    pub fn new(registry: EndpointRegistry, max_line_bytes: usize) -> Self {
        Self {
            parser: RouterLogParser::new(max_line_bytes),
            registry,
            metrics: ParsingMetrics::new(),
            total_lines: 0,
            refused_lines: 0,
        }
    }

    /// Registry built from the configured endpoints and strategy.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, EndpointError> {
        let registry = EndpointRegistry::from_specs(&config.endpoints, config.strategy)?;
        Ok(Self::new(registry, config.max_line_bytes))
    }

    /// Process one line (terminator already stripped).
    ///
    /// `Ok(true)` when an endpoint recorded it, `Ok(false)` when it was
    /// malformed or matched nothing.
    pub fn ingest_line(&mut self, raw: &[u8]) -> Result<bool, EndpointError> {
        match self.parser.parse(raw) {
            Ok(fields) => {
                self.total_lines += 1;
                self.metrics.record_parse();
                self.dispatch(&fields)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Count a line that never reached the tokenizer as unprocessed.
    fn reject(&mut self, error: ParseError) -> Result<bool, EndpointError> {
        self.total_lines += 1;
        debug!(line = self.total_lines, error = %error, "Rejected line");
        self.metrics.record_error(MetricErrorType::from(&error));
        self.dispatch(&FieldMap::new())
    }

    fn dispatch(&mut self, fields: &FieldMap) -> Result<bool, EndpointError> {
        self.registry.dispatch(fields).inspect_err(|_| {
            self.refused_lines += 1;
        })
    }

    /// Read `reader` to the end, one line at a time.
    ///
    /// At most `max_line_bytes` (plus terminator) of a line is held in
    /// memory; longer lines are skipped through to their newline.
    pub fn scan<R: BufRead>(&mut self, mut reader: R) -> Result<ScanSummary, IngestError> {
        let limit = self.parser.max_line_size();
        let mut buf = Vec::new();
        loop {
            let outcome = match read_capped_line(&mut reader, &mut buf, limit)? {
                LineRead::Eof => break,
                LineRead::Line => self.ingest_line(strip_terminator(&buf)),
                LineRead::TooLarge(len) => self.reject(ParseError::LineTooLarge(len, limit)),
            };
            if let Err(e) = outcome {
                warn!(line = self.total_lines, error = %e, "Skipped line");
            }
        }

        info!(
            total_lines = self.total_lines,
            unprocessed = self.unprocessed_lines(),
            "Scan complete"
        );
        Ok(self.summary())
    }

    pub fn scan_file(&mut self, path: &Path) -> Result<ScanSummary, IngestError> {
        info!("Scanning {}", path.display());
        let file = File::open(path)?;
        self.scan(BufReader::new(file))
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &ParsingMetrics {
        &self.metrics
    }

    pub fn total_lines(&self) -> u64 {
        self.total_lines
    }

    /// Lines no endpoint recorded, malformed ones included.
    pub fn unprocessed_lines(&self) -> u64 {
        self.registry.unprocessed_lines() + self.refused_lines
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary::new(self)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    Eof,
    /// The line, terminator included, is in the buffer
    Line,
    /// The line exceeded the limit and was consumed without buffering;
    /// carries its length without the newline
    TooLarge(usize),
}

/// Read up to and including the next `\n`, buffering no more than
/// `limit + 2` bytes (room for `\r\n`).
fn read_capped_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> io::Result<LineRead> {
    buf.clear();
    let cap = limit.saturating_add(2);
    let mut seen = 0usize;
    let mut oversized = false;

    loop {
        let (used, done) = {
            let available = match reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(match (oversized, seen) {
                    (true, _) => LineRead::TooLarge(seen),
                    (false, 0) => LineRead::Eof,
                    (false, _) => LineRead::Line,
                });
            }

            let (used, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };
            if !oversized {
                if buf.len() + used > cap {
                    oversized = true;
                    buf.clear();
                } else {
                    buf.extend_from_slice(&available[..used]);
                }
            }
            (used, done)
        };

        reader.consume(used);
        seen += used;

        if done {
            return Ok(if oversized {
                LineRead::TooLarge(seen - 1)
            } else {
                LineRead::Line
            });
        }
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::EndpointSpec;
    use crate::stats::{AccumulatorKind, MedianCapable, Summary};
    use std::io::{Cursor, Write};

    const COUNT_PENDING: &str = "2014-01-09T06:16:53.742892+00:00 heroku[router]: at=info method=GET path=/api/users/100002266342173/count_pending_messages host=services.pocketplaylab.com fwd=\"94.66.255.106\" dyno=web.8 connect=9ms service=9ms status=304 bytes=0";
    const GET_USER: &str = "2014-01-09T06:16:53.768137+00:00 heroku[router]: at=info method=GET path=/api/users/100002266342173 host=services.pocketplaylab.com fwd=\"94.66.255.106\" dyno=web.3 connect=2ms service=40ms status=200 bytes=1130";
    const POST_USER: &str = "2014-01-09T06:16:53.916977+00:00 heroku[router]: at=info method=POST path=/api/users/1686318645 host=services.pocketplaylab.com fwd=\"1.125.42.139\" dyno=web.3 connect=1ms service=28ms status=200 bytes=1022";
    const UNKNOWN_PATH: &str = "2014-01-09T06:16:54.066752+00:00 heroku[router]: at=info method=GET path=/api/users/1686318645/get_app_settings host=services.pocketplaylab.com fwd=\"1.125.42.139\" dyno=web.1 connect=1ms service=10ms status=200 bytes=1";

    fn ingestor(strategy: AccumulatorKind) -> Ingestor {
        let config = AnalyzerConfig {
            strategy,
            ..Default::default()
        };
        Ingestor::from_config(&config).unwrap()
    }

    fn log_of(lines: &[&str]) -> String {
        let mut log = lines.join("\n");
        log.push('\n');
        log
    }

    // ── ingest_line ──────────────────────────────────────────────

    #[test]
    fn test_ingest_line_matched() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        assert!(ingestor.ingest_line(GET_USER.as_bytes()).unwrap());

        let endpoint = ingestor.registry().get("GET:^/api/users/[0-9]+$").unwrap();
        assert_eq!(endpoint.called(), 1);
        assert_eq!(endpoint.response().mean(), Some(42.0));
        assert_eq!(ingestor.total_lines(), 1);
        assert_eq!(ingestor.unprocessed_lines(), 0);
    }

    #[test]
    fn test_ingest_line_unmatched() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        assert!(!ingestor.ingest_line(UNKNOWN_PATH.as_bytes()).unwrap());
        assert_eq!(ingestor.unprocessed_lines(), 1);
        assert_eq!(ingestor.metrics().parsed, 1);
    }

    #[test]
    fn test_ingest_line_malformed_counts_as_unprocessed() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        assert!(!ingestor.ingest_line(b"garbage").unwrap());
        assert!(!ingestor.ingest_line(b"").unwrap());
        assert!(!ingestor.ingest_line(&[0xff, 0xfe, b' ', b'x']).unwrap());

        let snap = ingestor.metrics().snapshot();
        assert_eq!(snap.truncated_lines, 1);
        assert_eq!(snap.empty_lines, 1);
        assert_eq!(snap.non_utf8_content, 1);
        assert_eq!(ingestor.unprocessed_lines(), 3);
    }

    #[test]
    fn test_ingest_line_respects_line_limit() {
        let registry = EndpointRegistry::from_specs(
            &[EndpointSpec::new("GET", "/api/users/{user_id}")],
            AccumulatorKind::Fast,
        )
        .unwrap();
        let mut ingestor = Ingestor::new(registry, 32);

        assert!(!ingestor.ingest_line(GET_USER.as_bytes()).unwrap());
        assert_eq!(ingestor.metrics().snapshot().lines_too_large, 1);
    }

    #[test]
    fn test_refused_record_is_unprocessed() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        let line = GET_USER
            .replace("connect=2ms", "connect=9223372036854775807ms")
            .replace("service=40ms", "service=1ms");

        let err = ingestor.ingest_line(line.as_bytes()).unwrap_err();
        assert_eq!(err, EndpointError::InvalidField("service"));
        assert_eq!(ingestor.unprocessed_lines(), 1);
        assert_eq!(ingestor.registry().get("GET:^/api/users/[0-9]+$").unwrap().called(), 0);
    }

    // ── scan ─────────────────────────────────────────────────────

    #[test]
    fn test_scan_counts_every_line() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        let log = log_of(&[COUNT_PENDING, GET_USER, POST_USER, UNKNOWN_PATH, "not a log line"]);

        let summary = ingestor.scan(Cursor::new(log)).unwrap();
        assert_eq!(summary.total_lines, 5);
        assert_eq!(summary.unprocessed_lines, 2);
        assert_eq!(summary.endpoints.len(), 6);

        let called: Vec<u64> = summary.endpoints.iter().map(|ep| ep.called).collect();
        assert_eq!(called, vec![1, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_scan_last_line_without_newline() {
        let mut ingestor = ingestor(AccumulatorKind::Fast);
        let log = format!("{}\n{}", GET_USER, GET_USER);

        let summary = ingestor.scan(Cursor::new(log)).unwrap();
        assert_eq!(summary.total_lines, 2);
        assert_eq!(summary.unprocessed_lines, 0);
    }

    #[test]
    fn test_scan_crlf_terminators() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        let log = format!("{}\r\n{}\r\n", POST_USER, POST_USER);

        ingestor.scan(Cursor::new(log)).unwrap();
        let endpoint = ingestor.registry().get("POST:^/api/users/[0-9]+$").unwrap();
        assert_eq!(endpoint.called(), 2);
        assert_eq!(endpoint.bytes().high(), Some(1022));
    }

    #[test]
    fn test_scan_empty_input() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        let summary = ingestor.scan(Cursor::new(Vec::new())).unwrap();
        assert_eq!(summary.total_lines, 0);
        assert_eq!(summary.unprocessed_lines, 0);
    }

    #[test]
    fn test_scan_skips_refused_records() {
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        let overflow = GET_USER
            .replace("connect=2ms", "connect=9223372036854775807ms")
            .replace("service=40ms", "service=1ms");
        let log = log_of(&[&overflow, GET_USER]);

        let summary = ingestor.scan(Cursor::new(log)).unwrap();
        assert_eq!(summary.total_lines, 2);
        assert_eq!(summary.unprocessed_lines, 1);
    }

    #[test]
    fn test_strategies_report_the_same() {
        let log = log_of(&[GET_USER, GET_USER, POST_USER, COUNT_PENDING, GET_USER]);

        let mut low = ingestor(AccumulatorKind::LowMemory);
        let mut fast = ingestor(AccumulatorKind::Fast);
        low.scan(Cursor::new(log.clone())).unwrap();
        fast.scan(Cursor::new(log)).unwrap();

        for (a, b) in low.registry().iter().zip(fast.registry().iter()) {
            assert_eq!(a.called(), b.called());
            assert_eq!(a.response().median(), b.response().median());
            assert_eq!(a.response().mode(), b.response().mode());
            assert_eq!(a.busiest_dyno(), b.busiest_dyno());
        }
    }

    // ── scan_file ────────────────────────────────────────────────

    #[test]
    fn test_scan_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", log_of(&[GET_USER, POST_USER, COUNT_PENDING])).unwrap();

        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        let summary = ingestor.scan_file(file.path()).unwrap();
        assert_eq!(summary.total_lines, 3);
        assert_eq!(summary.unprocessed_lines, 0);
    }

    #[test]
    fn test_scan_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ingestor = ingestor(AccumulatorKind::LowMemory);
        let result = ingestor.scan_file(&dir.path().join("absent.log"));
        assert!(matches!(result, Err(IngestError::Io(_))));
    }

    #[test]
    fn test_scan_streams_past_oversized_line() {
        let registry = EndpointRegistry::from_specs(
            &[EndpointSpec::new("GET", "/api/users/{user_id}")],
            AccumulatorKind::LowMemory,
        )
        .unwrap();
        let mut ingestor = Ingestor::new(registry, 512);

        let mut log = "x".repeat(100_000);
        log.push('\n');
        log.push_str(GET_USER);
        log.push('\n');

        // small buffer so the long line arrives in many chunks
        let reader = BufReader::with_capacity(64, Cursor::new(log));
        let summary = ingestor.scan(reader).unwrap();

        assert_eq!(summary.parsing.lines_too_large, 1);
        assert_eq!(summary.total_lines, 2);
        assert_eq!(summary.unprocessed_lines, 1);
        assert_eq!(summary.endpoints[0].called, 1);
    }

    #[test]
    fn test_scan_oversized_final_line_without_newline() {
        let mut ingestor = ingestor(AccumulatorKind::Fast);
        let log = format!("{}\n{}", GET_USER, "y".repeat(2 * 1_048_576));

        let summary = ingestor.scan(Cursor::new(log)).unwrap();
        assert_eq!(summary.total_lines, 2);
        assert_eq!(summary.parsing.lines_too_large, 1);
        assert_eq!(summary.unprocessed_lines, 1);
    }

    #[test]
    fn test_read_capped_line_bounds_buffer() {
        let data = format!("{}\nshort\r\n{}", "z".repeat(1_000), "tail");
        let mut reader = BufReader::with_capacity(16, Cursor::new(data));
        let mut buf = Vec::new();

        assert_eq!(
            read_capped_line(&mut reader, &mut buf, 10).unwrap(),
            LineRead::TooLarge(1_000)
        );
        assert!(buf.len() <= 12);

        assert_eq!(read_capped_line(&mut reader, &mut buf, 10).unwrap(), LineRead::Line);
        assert_eq!(buf, b"short\r\n");

        assert_eq!(read_capped_line(&mut reader, &mut buf, 10).unwrap(), LineRead::Line);
        assert_eq!(buf, b"tail");

        assert_eq!(read_capped_line(&mut reader, &mut buf, 10).unwrap(), LineRead::Eof);
    }

    #[test]
    fn test_read_capped_line_at_limit() {
        let mut reader = Cursor::new(b"0123456789\n0123456789A\n".to_vec());
        let mut buf = Vec::new();

        assert_eq!(read_capped_line(&mut reader, &mut buf, 10).unwrap(), LineRead::Line);
        assert_eq!(strip_terminator(&buf), b"0123456789");

        // fits the buffer with its newline; the parser rejects it by length
        assert_eq!(read_capped_line(&mut reader, &mut buf, 10).unwrap(), LineRead::Line);
        assert_eq!(strip_terminator(&buf).len(), 11);
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator(b"abc\r\n"), b"abc");
        assert_eq!(strip_terminator(b"abc\n"), b"abc");
        assert_eq!(strip_terminator(b"abc"), b"abc");
        assert_eq!(strip_terminator(b"\n"), b"");
    }
}
