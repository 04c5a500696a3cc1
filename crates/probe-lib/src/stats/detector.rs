//! Latency anomaly detection
//!
//! Flags latencies whose distance from a frozen baseline mean exceeds a
//! configurable multiple of the baseline standard deviation.

use super::Baseline;
use serde::{Deserialize, Serialize};

/// Default number of standard deviations considered anomalous
pub const DEFAULT_THRESHOLD_SIGMA: f64 = 2.0;

/// Decide whether `value` deviates from the baseline by more than
/// `threshold_sigma` standard deviations.
///
/// A zero standard deviation never yields an anomaly. The comparison is
/// strict: a value exactly on the boundary is normal.
pub fn is_anomalous(value: f64, mean: f64, std_dev: f64, threshold_sigma: f64) -> bool {
    if std_dev == 0.0 {
        return false;
    }

    (value - mean).abs() > threshold_sigma * std_dev
}

/// Classification of one latency against a baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Normal,
    Anomalous,
}

impl Classification {
    pub fn is_anomalous(&self) -> bool {
        matches!(self, Classification::Anomalous)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Normal => "ok",
            Classification::Anomalous => "ANOMALY",
        }
    }
}

/// Classifies latencies against a baseline using a sigma threshold
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    /// Number of standard deviations to consider anomalous
    pub threshold_sigma: f64,
}

impl AnomalyDetector {
    pub fn new(threshold_sigma: f64) -> Self {
        Self { threshold_sigma }
    }

    pub fn classify(&self, value: f64, baseline: &Baseline) -> Classification {
        if is_anomalous(value, baseline.mean, baseline.std_dev, self.threshold_sigma) {
            Classification::Anomalous
        } else {
            Classification::Normal
        }
    }

    /// Detect an anomaly for `value`
    ///
    /// # Returns
    /// * `Some(LatencyAnomaly)` if the value is outside the threshold band
    /// * `None` otherwise, including for a zero-spread baseline
    pub fn detect(&self, value: f64, baseline: &Baseline) -> Option<LatencyAnomaly> {
        if !self.classify(value, baseline).is_anomalous() {
            return None;
        }

        Some(LatencyAnomaly {
            latency_ms: value,
            expected_ms: baseline.mean,
            sigma_distance: baseline.sigma_distance(value)?,
            std_dev: baseline.std_dev,
            threshold_sigma: self.threshold_sigma,
        })
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_SIGMA)
    }
}

/// Details of a latency outside the baseline band
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyAnomaly {
    pub latency_ms: f64,
    /// Baseline mean
    pub expected_ms: f64,
    /// Absolute deviation in units of baseline standard deviation
    pub sigma_distance: f64,
    pub std_dev: f64,
    pub threshold_sigma: f64,
}

impl LatencyAnomaly {
    pub fn deviation_ms(&self) -> f64 {
        self.latency_ms - self.expected_ms
    }

    pub fn direction(&self) -> DeviationDirection {
        if self.latency_ms >= self.expected_ms {
            DeviationDirection::Slower
        } else {
            DeviationDirection::Faster
        }
    }
}

/// Side of the baseline an anomaly falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviationDirection {
    Slower,
    Faster,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(mean: f64, std_dev: f64) -> Baseline {
        Baseline {
            mean,
            std_dev,
            window_len: 6,
        }
    }

    #[test]
    fn test_zero_spread_never_anomalous() {
        for value in [-1e9, 0.0, 10.0, 10.000001, 1e9] {
            assert!(!is_anomalous(value, 10.0, 0.0, 2.0));
            assert!(!is_anomalous(value, 10.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_value_at_mean_is_normal() {
        assert!(!is_anomalous(25.0, 25.0, 3.0, 2.0));
    }

    #[test]
    fn test_boundary_is_normal() {
        // 10 + 2 * 2 lands exactly on the threshold
        assert!(!is_anomalous(14.0, 10.0, 2.0, 2.0));
        assert!(!is_anomalous(6.0, 10.0, 2.0, 2.0));
    }

    #[test]
    fn test_just_past_boundary_is_anomalous() {
        for eps in [1e-6, 0.01, 1.0, 100.0] {
            assert!(is_anomalous(14.0 + eps, 10.0, 2.0, 2.0));
            assert!(is_anomalous(6.0 - eps, 10.0, 2.0, 2.0));
        }
    }

    #[test]
    fn test_mixed_window_example() {
        let (mean, std_dev) =
            crate::stats::compute_baseline(&[10.0, 11.0, 9.0, 10.0, 11.0, 9.0]).unwrap();

        assert!(is_anomalous(13.0, mean, std_dev, 2.0));
        assert!(!is_anomalous(11.0, mean, std_dev, 2.0));
    }

    #[test]
    fn test_constant_window_example() {
        let b = Baseline::from_window(&[10.0; 6]).unwrap();
        let detector = AnomalyDetector::default();

        for value in [0.0, 10.0, 500.0] {
            assert_eq!(detector.classify(value, &b), Classification::Normal);
            assert!(detector.detect(value, &b).is_none());
        }
    }

    #[test]
    fn test_detect_reports_details() {
        let detector = AnomalyDetector::new(2.0);
        let anomaly = detector.detect(17.0, &baseline(10.0, 2.0)).unwrap();

        assert_eq!(anomaly.expected_ms, 10.0);
        assert!((anomaly.sigma_distance - 3.5).abs() < 1e-12);
        assert!((anomaly.deviation_ms() - 7.0).abs() < 1e-12);
        assert_eq!(anomaly.direction(), DeviationDirection::Slower);
    }

    #[test]
    fn test_detect_faster_than_baseline() {
        let detector = AnomalyDetector::new(1.5);
        let anomaly = detector.detect(4.0, &baseline(10.0, 2.0)).unwrap();

        assert_eq!(anomaly.direction(), DeviationDirection::Faster);
        assert!(anomaly.deviation_ms() < 0.0);
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(Classification::Normal.as_str(), "ok");
        assert_eq!(Classification::Anomalous.as_str(), "ANOMALY");
        assert!(Classification::Anomalous.is_anomalous());
    }
}
