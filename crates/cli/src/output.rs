//! Output formatting utilities

use crate::plot::{render_scatter, PlotSize};
use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use probe_lib::report::ChartSeries;
use probe_lib::DetectionParams;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table and chart (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for the per-target summary table
#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
    #[tabled(rename = "Mean (ms)")]
    mean: String,
    #[tabled(rename = "Stddev (ms)")]
    std_dev: String,
    #[tabled(rename = "Anomalies")]
    anomalies: String,
}

impl From<&ChartSeries> for SeriesRow {
    fn from(series: &ChartSeries) -> Self {
        let (mean, std_dev, anomalies) = match series.baseline {
            Some(b) => (
                format!("{:.2}", b.mean),
                format!("{:.2}", b.std_dev),
                series.anomalies().count().to_string(),
            ),
            None => ("-".to_string(), "-".to_string(), "insufficient".to_string()),
        };

        Self {
            target: series.target_name.clone(),
            host: series.host.clone(),
            records: series.total_records,
            failed: series.failures(),
            mean,
            std_dev,
            anomalies,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a Path,
    params: DetectionParams,
    series: &'a [ChartSeries],
}

/// Print the full report in the requested format
pub fn print_report(
    path: &Path,
    chart: &[ChartSeries],
    params: DetectionParams,
    format: OutputFormat,
    size: PlotSize,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let report = JsonReport {
                file: path,
                params,
                series: chart,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            println!("{}", format!("RTT over time ({})", name).bold());
            println!("{}", "=".repeat(50));

            if chart.is_empty() {
                print_warning("No successful samples in results file");
                return Ok(());
            }

            let rows: Vec<SeriesRow> = chart.iter().map(SeriesRow::from).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!();

            for series in chart {
                print_series(series, size);
            }

            print_info(&format!(
                "baseline: first {} successes, threshold {} sigma",
                params.baseline_samples, params.threshold_sigma
            ));
        }
    }

    Ok(())
}

fn print_series(series: &ChartSeries, size: PlotSize) {
    println!("{}", series.label().bold());
    println!("{}", "-".repeat(50));

    if series.baseline.is_none() {
        print_warning("Not enough successes to classify; points shown unclassified");
    }

    print!("{}", render_scatter(series, size));

    let anomalies: Vec<String> = series
        .anomalies()
        .map(|p| format!("#{} {:.2} ms", p.x, p.latency_ms))
        .collect();
    if !anomalies.is_empty() {
        println!("{} {}", "Anomalies:".red().bold(), anomalies.join(", "));
    }
    println!();
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_lib::report::{ChartPoint, PointKind};
    use probe_lib::Baseline;

    #[test]
    fn test_row_for_classified_series() {
        let series = ChartSeries {
            target_name: "edge".to_string(),
            host: "10.0.0.1".to_string(),
            total_records: 12,
            baseline: Some(Baseline {
                mean: 20.0,
                std_dev: 1.41421,
                window_len: 6,
            }),
            points: vec![
                ChartPoint {
                    x: 8,
                    latency_ms: 35.0,
                    kind: PointKind::Anomaly,
                },
                ChartPoint {
                    x: 9,
                    latency_ms: 20.5,
                    kind: PointKind::Normal,
                },
            ],
        };

        let row = SeriesRow::from(&series);
        assert_eq!(row.failed, 10);
        assert_eq!(row.mean, "20.00");
        assert_eq!(row.std_dev, "1.41");
        assert_eq!(row.anomalies, "1");
    }

    #[test]
    fn test_row_for_insufficient_series() {
        let series = ChartSeries {
            target_name: "sparse".to_string(),
            host: "10.0.0.2".to_string(),
            total_records: 12,
            baseline: None,
            points: Vec::new(),
        };

        let row = SeriesRow::from(&series);
        assert_eq!(row.mean, "-");
        assert_eq!(row.anomalies, "insufficient");
    }
}
