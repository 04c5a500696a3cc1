//! Chart model built from persisted records
//!
//! Records are grouped by (target name, host) in first-appearance order.
//! Failed attempts are left out of the plotted series entirely.

use crate::analysis::{analyze_series, DetectionParams, SeriesAnalysis, SuccessPoint};
use crate::models::SessionRecord;
use crate::stats::{Baseline, Classification};
use serde::Serialize;

/// How a plotted point should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    /// Member of the baseline window
    Baseline,
    Normal,
    Anomaly,
    /// Series without enough successes to classify
    Unclassified,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// 1-based position of the record within its group
    pub x: u32,
    pub latency_ms: f64,
    pub kind: PointKind,
}

/// One plotted line: the successes of a single (target, host) group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub target_name: String,
    pub host: String,
    /// Records in the group, including failures
    pub total_records: usize,
    pub baseline: Option<Baseline>,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn label(&self) -> String {
        format!("{} ({})", self.target_name, self.host)
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter().filter(|p| p.kind == PointKind::Anomaly)
    }

    pub fn failures(&self) -> usize {
        self.total_records - self.points.len()
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.latency_ms, p.latency_ms)),
            Some((lo, hi)) => Some((lo.min(p.latency_ms), hi.max(p.latency_ms))),
        })
    }
}

/// Build one chart series per (target name, host) group
///
/// Groups without any successful record are omitted. The result depends only
/// on the records and parameters.
pub fn build_chart(records: &[SessionRecord], params: DetectionParams) -> Vec<ChartSeries> {
    let mut groups: Vec<((&str, &str), Vec<Option<f64>>)> = Vec::new();

    for record in records {
        let key = (record.target_name.as_str(), record.host.as_str());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(record.latency_ms),
            None => groups.push((key, vec![record.latency_ms])),
        }
    }

    groups
        .into_iter()
        .filter_map(|((name, host), values)| build_series(name, host, &values, params))
        .collect()
}

fn build_series(
    name: &str,
    host: &str,
    values: &[Option<f64>],
    params: DetectionParams,
) -> Option<ChartSeries> {
    let successes: Vec<SuccessPoint> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            v.map(|latency_ms| SuccessPoint {
                index: i as u32 + 1,
                latency_ms,
            })
        })
        .collect();

    if successes.is_empty() {
        return None;
    }

    let analysis = analyze_series(&successes, params);
    let points = match &analysis {
        SeriesAnalysis::Insufficient { .. } => successes
            .iter()
            .map(|p| point(p.index, p.latency_ms, PointKind::Unclassified))
            .collect(),
        SeriesAnalysis::Classified {
            baseline_points,
            classified,
            ..
        } => baseline_points
            .iter()
            .map(|p| point(p.index, p.latency_ms, PointKind::Baseline))
            .chain(classified.iter().map(|p| {
                let kind = match p.classification {
                    Classification::Normal => PointKind::Normal,
                    Classification::Anomalous => PointKind::Anomaly,
                };
                point(p.index, p.latency_ms, kind)
            }))
            .collect(),
    };

    Some(ChartSeries {
        target_name: name.to_string(),
        host: host.to_string(),
        total_records: values.len(),
        baseline: analysis.baseline().copied(),
        points,
    })
}

fn point(x: u32, latency_ms: f64, kind: PointKind) -> ChartPoint {
    ChartPoint { x, latency_ms, kind }
}
