//! End-of-session summary

use colored::Colorize;
use probe_lib::session::{SessionReport, TargetReport};
use probe_lib::stats::Classification;
use probe_lib::SeriesAnalysis;
use std::path::Path;

/// Print the per-target summary and the results location
pub fn print_report(report: &SessionReport, results_path: &Path) {
    println!();
    for target in &report.targets {
        println!("{}", target_summary(target));
    }

    println!(
        "{} {} records, {} anomalies, {} insufficient",
        "Session complete:".bold(),
        report.total_records(),
        report.total_anomalies(),
        report.insufficient_targets().count()
    );
    println!("{} {}", "Results written to".green(), results_path.display());
}

/// Render one target's outcome as a block of lines
pub fn target_summary(report: &TargetReport) -> String {
    let mut lines = vec![format!(
        "{} {}/{} successful",
        report.target.to_string().bold(),
        report.success_count(),
        report.sample_count()
    )];

    match &report.analysis {
        SeriesAnalysis::Insufficient {
            successes,
            required,
        } => {
            lines.push(format!(
                "  {} only {} successes, {} needed",
                "insufficient:".yellow(),
                successes,
                required
            ));
        }
        SeriesAnalysis::Classified {
            baseline,
            classified,
            ..
        } => {
            lines.push(format!(
                "  baseline: mean {:.2} ms, stddev {:.2} ms",
                baseline.mean, baseline.std_dev
            ));
            for point in classified {
                let status = match point.classification {
                    Classification::Normal => point.classification.as_str().green(),
                    Classification::Anomalous => point.classification.as_str().red().bold(),
                };
                lines.push(format!(
                    "  success {:02}: {:.2} ms -> {}",
                    point.success_rank, point.latency_ms, status
                ));
            }
        }
    }

    lines.join("\n")
}
