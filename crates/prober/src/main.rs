//! latency-probe - active TCP latency prober
//!
//! Runs one probe session against the configured targets, streams every
//! attempt to a timestamped CSV results file and prints a per-target report.

use anyhow::{bail, Context, Result};
use clap::Parser;
use probe_lib::{
    api::{self, AppState},
    health::{components, HealthRegistry},
    now_local,
    observability::ProbeMetrics,
    session::ProbeSessionBuilder,
    sink::{results_file_name, CsvSink, RecordSink},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod report;

/// Active TCP latency prober with baseline anomaly detection
#[derive(Parser)]
#[command(name = "latency-probe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory for the results file
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Serve the status API (health, session progress, metrics) on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut config = config::ProbeConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(port) = args.metrics_port {
        config.metrics_port = Some(port);
    }

    let health_registry = HealthRegistry::new();
    health_registry.register(components::SAMPLER).await;
    health_registry.register(components::SINK).await;

    let metrics = ProbeMetrics::new();

    if let Some(port) = config.metrics_port {
        let state = Arc::new(AppState::new(health_registry.clone(), metrics.clone()));
        tokio::spawn(async move {
            if let Err(e) = api::serve(port, state).await {
                warn!(error = %e, "Status API stopped");
            }
        });
    }

    let session = ProbeSessionBuilder::new()
        .config(config.session_config())
        .metrics(metrics)
        .health(health_registry)
        .build()
        .context("Invalid probe configuration")?;

    let results_path = config.output_dir.join(results_file_name(now_local()));
    let mut sink = CsvSink::create(&results_path)
        .with_context(|| format!("Failed to create {}", results_path.display()))?;

    let outcome = tokio::select! {
        result = session.run(&mut sink) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match outcome {
        Some(result) => {
            let report = result.context("Probe session aborted")?;
            report::print_report(&report, &results_path);
            Ok(())
        }
        None => {
            if let Err(e) = sink.finish() {
                warn!(error = %e, "Failed to flush results after interrupt");
            }
            info!(
                records = sink.rows(),
                path = %results_path.display(),
                "Interrupted, partial results kept"
            );
            bail!("interrupted after {} records", sink.rows());
        }
    }
}
