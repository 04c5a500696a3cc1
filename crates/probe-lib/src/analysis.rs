//! Baseline selection and classification over a series of successes
//!
//! Shared by the session controller and the result visualizer so both
//! always derive the same classification from the same latencies.

use crate::stats::{AnomalyDetector, Baseline, Classification};
use serde::Serialize;

/// Successes required beyond the baseline window before classifying
pub const MIN_CLASSIFIED_SAMPLES: usize = 2;

/// Parameters controlling baseline selection and classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionParams {
    /// Number of leading successes forming the baseline window
    pub baseline_samples: usize,
    /// Anomaly threshold in standard deviations
    pub threshold_sigma: f64,
}

impl DetectionParams {
    /// Minimum number of successes needed to classify anything
    pub fn required_successes(&self) -> usize {
        self.baseline_samples + MIN_CLASSIFIED_SAMPLES
    }
}

/// A successful latency together with its position in the series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuccessPoint {
    /// Sample index (or stream position) of the success
    pub index: u32,
    pub latency_ms: f64,
}

/// A success that was classified against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifiedPoint {
    pub index: u32,
    /// 1-based rank among the target's successes
    pub success_rank: usize,
    pub latency_ms: f64,
    pub classification: Classification,
}

/// Result of analysing one series of successes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SeriesAnalysis {
    /// Too few successes for a baseline plus classified samples
    Insufficient { successes: usize, required: usize },
    /// Baseline computed from the leading successes, the rest classified in order
    Classified {
        baseline: Baseline,
        baseline_points: Vec<SuccessPoint>,
        classified: Vec<ClassifiedPoint>,
    },
}

impl SeriesAnalysis {
    pub fn baseline(&self) -> Option<&Baseline> {
        match self {
            SeriesAnalysis::Classified { baseline, .. } => Some(baseline),
            SeriesAnalysis::Insufficient { .. } => None,
        }
    }

    pub fn anomaly_count(&self) -> usize {
        match self {
            SeriesAnalysis::Classified { classified, .. } => classified
                .iter()
                .filter(|p| p.classification.is_anomalous())
                .count(),
            SeriesAnalysis::Insufficient { .. } => 0,
        }
    }
}

/// Split `successes` into a baseline window and classified remainder
///
/// `successes` must be in sequence order; failures are not part of it.
pub fn analyze_series(successes: &[SuccessPoint], params: DetectionParams) -> SeriesAnalysis {
    let required = params.required_successes();
    if successes.len() < required {
        return SeriesAnalysis::Insufficient {
            successes: successes.len(),
            required,
        };
    }

    let (window, rest) = successes.split_at(params.baseline_samples);
    let latencies: Vec<f64> = window.iter().map(|p| p.latency_ms).collect();

    let baseline = match Baseline::from_window(&latencies) {
        Ok(baseline) => baseline,
        // Only reachable with a window below the statistical minimum
        Err(_) => {
            return SeriesAnalysis::Insufficient {
                successes: successes.len(),
                required,
            }
        }
    };

    let detector = AnomalyDetector::new(params.threshold_sigma);
    let classified = rest
        .iter()
        .enumerate()
        .map(|(offset, point)| ClassifiedPoint {
            index: point.index,
            success_rank: params.baseline_samples + offset + 1,
            latency_ms: point.latency_ms,
            classification: detector.classify(point.latency_ms, &baseline),
        })
        .collect();

    SeriesAnalysis::Classified {
        baseline,
        baseline_points: window.to_vec(),
        classified,
    }
}
