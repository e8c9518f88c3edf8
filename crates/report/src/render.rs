//! Table and JSON renderers for a finished scan.

use std::io::{self, Write};

use analyzer::{EndpointSummary, ScanSummary};

fn title_row(cols: [&str; 13]) -> String {
    format!(
        "{:<4} : {:<45} : {:<8} : {:<8}{}{:<8}{}{:<8}{}{:<8} : {:<8} : {:<8} : {:<8}",
        cols[0], cols[1], cols[2], cols[3], cols[4], cols[5], cols[6], cols[7], cols[8], cols[9],
        cols[10], cols[11], cols[12]
    )
}

fn data_row(ep: &EndpointSummary) -> String {
    let mode = ep
        .response_mode
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{:<4} : {:<45} : {:>8} : {:>8.2} : {:>8.2} : {:>8} : {:>8} : {:<8} : {:>8.2} : {:>8}",
        ep.method,
        ep.path,
        ep.called,
        ep.response_mean.unwrap_or_default(),
        ep.response_median.unwrap_or_default(),
        mode,
        ep.response_range.unwrap_or_default(),
        ep.busiest_dyno.as_deref().unwrap_or_default(),
        ep.bytes_mean.unwrap_or_default(),
        ep.bytes_max.unwrap_or_default(),
    )
}

fn never_row(ep: &EndpointSummary) -> String {
    title_row([
        ep.method.as_str(), ep.path.as_str(), "   Never", " ", " : ", " ", " : ", " ", " : ", " ", " ", " ", " ",
    ])
}

/// Fixed-width report: two header rows, a rule, one row per endpoint and
/// the processed-lines footer.
pub fn write_table<W: Write>(out: &mut W, summary: &ScanSummary) -> io::Result<()> {
    let heading = title_row([
        "METH",
        "PATH",
        "CALLED",
        "RESPONSE TIME(ms)",
        "",
        "",
        "",
        "",
        "",
        "",
        "DYNO",
        "MESSAGE",
        "SIZE",
    ]);
    writeln!(out, "{}", heading)?;
    writeln!(
        out,
        "{}",
        title_row([
            "", "", "Times", "Mean", " : ", "Median", " : ", "Mode", " : ", "Range", "Busiest",
            "Average", "Max",
        ])
    )?;
    writeln!(out, "{}", "-".repeat(heading.len()))?;

    for ep in &summary.endpoints {
        let row = if ep.called == 0 {
            never_row(ep)
        } else {
            data_row(ep)
        };
        writeln!(out, "{}", row)?;
    }

    if summary.all_processed() {
        writeln!(
            out,
            "All {} total lines in the log were processed!",
            summary.total_lines
        )
    } else {
        writeln!(
            out,
            "There were {} Unprocessed Lines of data from {} total lines in the log!",
            summary.unprocessed_lines, summary.total_lines
        )
    }
}

pub fn write_json<W: Write>(out: &mut W, summary: &ScanSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)
}
