//! Baseline statistics and anomaly classification
//!
//! This module provides:
//! - Frozen baselines (mean and sample standard deviation) over a fixed window
//! - Sigma-threshold classification of later values against a baseline

mod baseline;
mod detector;

pub use baseline::{compute_baseline, Baseline, StatsError, MIN_BASELINE_WINDOW};
pub use detector::{
    is_anomalous, AnomalyDetector, Classification, DeviationDirection, LatencyAnomaly,
    DEFAULT_THRESHOLD_SIGMA,
};
