//! Spoke CLI binary.
//!
//! Each subcommand reads one JSON payload from stdin and writes one JSON
//! document to stdout. Logs go to stderr and are filtered by `RUST_LOG`.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use spoke::boost::GradientBoostedTrees;
use spoke::data::read_payload;
use spoke::forecast::TrendSeasonalModel;
use spoke::output::{ExportFormat, Exporter};
use spoke::pipeline::{forecast, regression};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spoke")]
#[command(about = "Spoke: demand forecast summaries and boosted-tree predictions", long_about = None)]
#[command(version)]
struct Cli {
    /// Pretty-print the output document
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast a weekly series and sum the next calendar month
    Forecast {
        /// Date anchoring the next-month window (default: today in UTC)
        #[arg(long, value_name = "YYYY-MM-DD")]
        as_of: Option<NaiveDate>,
    },

    /// Train a boosted regressor and predict the latest entities
    Train,
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// The date the next-month window is computed from: `--as-of`, else the
/// UTC calendar date of `now`.
fn window_anchor(as_of: Option<NaiveDate>, now: DateTime<Utc>) -> NaiveDate {
    as_of.unwrap_or_else(|| now.date_naive())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = if cli.pretty {
        ExportFormat::PrettyJson
    } else {
        ExportFormat::Json
    };

    let raw = read_payload(io::stdin().lock())?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Forecast { as_of } => {
            let today = window_anchor(as_of, Utc::now());
            tracing::debug!(%today, "running forecast");
            let report = forecast::run_json(&TrendSeasonalModel::default(), &raw, today)?;
            report.export_to_writer(&mut stdout, format)?;
        }
        Commands::Train => {
            tracing::debug!("running training");
            let report = regression::run_json(&GradientBoostedTrees::default(), &raw)?;
            report.export_to_writer(&mut stdout, format)?;
        }
    }

    Ok(())
}
