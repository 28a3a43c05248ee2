//! Binary entrypoint: analyze a ping log and print incident periods.
//!
//! Output is a text report (default) or one JSON object per incident.
//! Logs go to stderr so stdout carries only the report.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use outage_engine::{parse, report, subnet, Config, RawConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
  Text,
  Json,
}

#[derive(Parser)]
#[command(
  name = "outage-engine",
  about = "Find device and network outage periods in a ping log",
  version,
  long_about = None
)]
struct Cli {
  /// Ping log to analyze
  #[arg(long, default_value = "log.txt")]
  log: PathBuf,

  /// TOML file with failure_tolerance / overload_tolerance / overload_threshold
  #[arg(long)]
  config: Option<PathBuf>,

  /// Consecutive timeouts before a failure is reported
  #[arg(long, allow_negative_numbers = true)]
  failure_tolerance: Option<i64>,

  /// Consecutive slow replies before an overload is reported
  #[arg(long, allow_negative_numbers = true)]
  overload_tolerance: Option<i64>,

  /// Latency (ms) above which a reply counts as overloaded; omit to disable
  #[arg(long, allow_negative_numbers = true)]
  overload_threshold: Option<i64>,

  /// Output format
  #[arg(long, value_enum, default_value = "text")]
  format: Format,
}

fn load_config(cli: &Cli) -> Result<Config> {
  let file = match &cli.config {
    Some(path) => {
      let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
      let raw = RawConfig::from_toml_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
      tracing::info!(path = %path.display(), "loaded configuration");
      raw
    }
    None => RawConfig::default(),
  };
  let flags = RawConfig {
    failure_tolerance: cli.failure_tolerance,
    overload_tolerance: cli.overload_tolerance,
    overload_threshold: cli.overload_threshold,
  };
  Ok(Config::try_from(file.merge(flags))?)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let cli = Cli::parse();
  let config = load_config(&cli)?;
  tracing::info!(?config, log = %cli.log.display(), "starting analysis");

  let file = File::open(&cli.log)
    .with_context(|| format!("log file not found: {}", cli.log.display()))?;
  let samples = parse::read_samples(BufReader::new(file));
  let analysis = outage_engine::analyze_results(samples, &config, subnet::subnet_of)
    .with_context(|| format!("failed to analyze {}", cli.log.display()))?;

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  match cli.format {
    Format::Text => report::write_text(&mut out, &analysis)?,
    Format::Json => report::write_json_lines(&mut out, &analysis)?,
  }
  out.flush()?;
  Ok(())
}
