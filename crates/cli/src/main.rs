//! probe-report - latency-probe results viewer
//!
//! Reads a results file written by `latency-probe`, re-derives each target's
//! baseline and classifications, and renders them as a table and text chart.

mod output;
mod plot;

use anyhow::{bail, Context, Result};
use clap::Parser;
use probe_lib::{
    config::DEFAULT_BASELINE_SAMPLES,
    report::{build_chart, find_latest_results, read_records_file},
    stats::{DEFAULT_THRESHOLD_SIGMA, MIN_BASELINE_WINDOW},
    DetectionParams,
};
use std::path::PathBuf;

/// Latency probe results viewer
#[derive(Parser)]
#[command(name = "probe-report")]
#[command(author, version, about = "Report on latency-probe results", long_about = None)]
pub struct Cli {
    /// Directory searched for the latest rtt_results_*.csv
    #[arg(long, short, env = "PROBE_OUTPUT_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Read this results file instead of the latest one
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Leading successes used as each target's baseline
    #[arg(long, default_value_t = DEFAULT_BASELINE_SAMPLES)]
    pub baseline_samples: usize,

    /// Anomaly threshold in standard deviations
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_SIGMA)]
    pub threshold_sigma: f64,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Chart width in columns
    #[arg(long, default_value_t = plot::DEFAULT_WIDTH)]
    pub width: u16,

    /// Chart height in rows
    #[arg(long, default_value_t = plot::DEFAULT_HEIGHT)]
    pub height: u16,
}

impl Cli {
    fn detection_params(&self) -> Result<DetectionParams> {
        if self.baseline_samples < MIN_BASELINE_WINDOW {
            bail!(
                "--baseline-samples must be at least {}, got {}",
                MIN_BASELINE_WINDOW,
                self.baseline_samples
            );
        }
        if !self.threshold_sigma.is_finite() || self.threshold_sigma <= 0.0 {
            bail!(
                "--threshold-sigma must be a positive number, got {}",
                self.threshold_sigma
            );
        }

        Ok(DetectionParams {
            baseline_samples: self.baseline_samples,
            threshold_sigma: self.threshold_sigma,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let params = cli.detection_params()?;

    let path = match &cli.file {
        Some(file) => file.clone(),
        None => find_latest_results(&cli.dir)?,
    };

    let records = read_records_file(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let chart = build_chart(&records, params);

    let size = plot::PlotSize {
        width: cli.width,
        height: cli.height,
    };
    output::print_report(&path, &chart, params, cli.format, size)
}
