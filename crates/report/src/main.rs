mod logging;
mod render;
mod usage;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use analyzer::{AccumulatorKind, AnalyzerConfig, Ingestor};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "logstat",
    version,
    about = "Per-endpoint response statistics from router access logs"
)]
struct Cli {
    /// Log file to process (defaults to the configured log file)
    #[arg(value_name = "LOGFILE")]
    logfile: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Median strategy: low-memory or fast
    #[arg(long)]
    strategy: Option<AccumulatorKind>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config =
        AnalyzerConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    config.validate().context("Invalid configuration")?;

    logging::init_logging(&config.logging);

    let log_file = cli
        .logfile
        .unwrap_or_else(|| PathBuf::from(&config.log_file));

    if let Err(kind) = usage::check_readable(&log_file) {
        let mut err = io::stderr().lock();
        usage::write_banner(&mut err)?;
        usage::write_usage(&mut err, &log_file, &config.log_file, kind)?;
        return Ok(ExitCode::FAILURE);
    }

    let mut ingestor = Ingestor::from_config(&config).context("Failed to register endpoints")?;
    info!(
        endpoints = ingestor.registry().len(),
        strategy = %config.strategy,
        "Endpoints registered"
    );

    let summary = ingestor
        .scan_file(&log_file)
        .with_context(|| format!("Failed to scan {}", log_file.display()))?;

    let mut out = io::stdout().lock();
    match cli.format {
        OutputFormat::Table => {
            usage::write_banner(&mut out)?;
            render::write_table(&mut out, &summary)?;
        }
        OutputFormat::Json => render::write_json(&mut out, &summary)?,
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["logstat"]).unwrap();
        assert!(cli.logfile.is_none());
        assert!(cli.config.is_none());
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.strategy.is_none());
    }

    #[test]
    fn test_cli_all_args() {
        let cli = Cli::try_parse_from([
            "logstat",
            "router.log",
            "--config",
            "conf.toml",
            "--format",
            "json",
            "--strategy",
            "fast",
        ])
        .unwrap();

        assert_eq!(cli.logfile, Some(PathBuf::from("router.log")));
        assert_eq!(cli.config, Some(PathBuf::from("conf.toml")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.strategy, Some(AccumulatorKind::Fast));
    }

    #[test]
    fn test_cli_low_memory_spelling() {
        let cli = Cli::try_parse_from(["logstat", "--strategy", "low-memory"]).unwrap();
        assert_eq!(cli.strategy, Some(AccumulatorKind::LowMemory));
    }

    #[test]
    fn test_cli_rejects_unknown_strategy() {
        assert!(Cli::try_parse_from(["logstat", "--strategy", "slow"]).is_err());
    }
}
