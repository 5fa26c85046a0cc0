//! QuotePipe CLI — clean, enrich, and resample a raw OHLCV CSV file.
//!
//! Reads a raw daily trading CSV, runs the transformation pipeline on the
//! requested backend, prints the run stats, and writes the daily enriched
//! table and the weekly aggregate as CSV.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use quotepipe_core::export::write_csv;
use quotepipe_core::{ExecutionMode, Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "quotepipe",
    about = "QuotePipe — OHLCV cleaning, indicator enrichment, and weekly resampling"
)]
struct Cli {
    /// Raw input CSV with at least SECID, TRADEDATE, OPEN, HIGH, LOW, CLOSE, VOLUME.
    input: PathBuf,

    /// Execution mode. Distributed requires --scheduler and degrades to
    /// local with a warning when the scheduler is unreachable.
    #[arg(long, value_enum, default_value = "local")]
    mode: Mode,

    /// Scheduler address (host:port) for distributed execution.
    #[arg(long)]
    scheduler: Option<String>,

    /// Output path for the daily enriched table.
    #[arg(long, default_value = "data/processed_daily.csv")]
    daily_out: PathBuf,

    /// Output path for the weekly aggregate.
    #[arg(long, default_value = "data/processed_weekly.csv")]
    weekly_out: PathBuf,

    /// Target partition size in megabytes under distributed execution.
    #[arg(long, default_value_t = 64)]
    partition_mb: usize,

    /// Scheduler probe timeout in seconds.
    #[arg(long, default_value_t = 3)]
    connect_timeout_secs: u64,

    /// Skip the weekly aggregate output.
    #[arg(long, default_value_t = false)]
    no_weekly: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Local,
    Distributed,
}

impl From<Mode> for ExecutionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Local => ExecutionMode::Local,
            Mode::Distributed => ExecutionMode::Distributed,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig {
        mode: cli.mode.into(),
        scheduler: cli.scheduler.clone(),
        partition_bytes: cli.partition_mb * 1024 * 1024,
        connect_timeout: Duration::from_secs(cli.connect_timeout_secs),
    };
    let pipeline = Pipeline::new(&config);

    let output = pipeline
        .run(&cli.input)
        .with_context(|| format!("pipeline failed on {}", cli.input.display()))?;

    println!("{}", output.stats);

    if output.daily.height() == 0 {
        tracing::warn!("every input row was dropped during cleaning; outputs are empty");
    }

    write_csv(&output.daily, &cli.daily_out)
        .with_context(|| format!("failed to write {}", cli.daily_out.display()))?;
    println!("daily output:  {}", cli.daily_out.display());

    if !cli.no_weekly {
        write_csv(&output.weekly, &cli.weekly_out)
            .with_context(|| format!("failed to write {}", cli.weekly_out.display()))?;
        println!("weekly output: {}", cli.weekly_out.display());
    }

    Ok(())
}
