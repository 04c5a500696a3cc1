//! Baseline computation
//!
//! A baseline is computed once from the first successful latencies of a
//! target and never updated afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest window a sample standard deviation is defined for
pub const MIN_BASELINE_WINDOW: usize = 2;

/// Errors raised by the statistics engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("insufficient data for baseline: need at least {needed} values, have {have}")]
    InsufficientData { needed: usize, have: usize },
}

/// Frozen mean/standard deviation snapshot of a baseline window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Arithmetic mean of the window
    pub mean: f64,
    /// Sample standard deviation (Bessel's correction, divisor n - 1)
    pub std_dev: f64,
    /// Number of values the baseline was computed from
    pub window_len: usize,
}

impl Baseline {
    /// Compute a baseline from an ordered window of latencies
    pub fn from_window(window: &[f64]) -> Result<Self, StatsError> {
        let n = window.len();
        if n < MIN_BASELINE_WINDOW {
            return Err(StatsError::InsufficientData {
                needed: MIN_BASELINE_WINDOW,
                have: n,
            });
        }

        let mean = window.iter().sum::<f64>() / n as f64;

        // Two-pass variance for stability
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        Ok(Self {
            mean,
            std_dev: variance.sqrt(),
            window_len: n,
        })
    }

    /// Distance of `value` from the mean in units of standard deviation
    ///
    /// Returns `None` for a degenerate (zero-spread) baseline.
    pub fn sigma_distance(&self, value: f64) -> Option<f64> {
        if self.std_dev == 0.0 {
            return None;
        }
        Some((value - self.mean).abs() / self.std_dev)
    }
}

/// Compute `(mean, std_dev)` for a window of at least two values
pub fn compute_baseline(window: &[f64]) -> Result<(f64, f64), StatsError> {
    Baseline::from_window(window).map(|b| (b.mean, b.std_dev))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_is_insufficient() {
        assert_eq!(
            compute_baseline(&[]),
            Err(StatsError::InsufficientData { needed: 2, have: 0 })
        );
    }

    #[test]
    fn test_single_value_is_insufficient() {
        assert_eq!(
            compute_baseline(&[42.0]),
            Err(StatsError::InsufficientData { needed: 2, have: 1 })
        );
    }

    #[test]
    fn test_two_values_use_bessel_correction() {
        // Population stddev would be 1.0; sample stddev is sqrt(2)
        let (mean, std_dev) = compute_baseline(&[9.0, 11.0]).unwrap();
        assert!((mean - 10.0).abs() < 1e-12);
        assert!((std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_constant_window_has_zero_spread() {
        let baseline = Baseline::from_window(&[10.0; 6]).unwrap();
        assert_eq!(baseline.mean, 10.0);
        assert_eq!(baseline.std_dev, 0.0);
        assert_eq!(baseline.window_len, 6);
        assert_eq!(baseline.sigma_distance(50.0), None);
    }

    #[test]
    fn test_mixed_window() {
        let (mean, std_dev) = compute_baseline(&[10.0, 11.0, 9.0, 10.0, 11.0, 9.0]).unwrap();
        assert!((mean - 10.0).abs() < 1e-12);
        // variance = 4 / 5
        assert!((std_dev - 0.8_f64.sqrt()).abs() < 1e-12);
        assert!((std_dev - 0.8944).abs() < 1e-4);
    }

    #[test]
    fn test_mean_and_spread_over_many_windows() {
        for n in 2..40usize {
            let window: Vec<f64> = (0..n).map(|i| 20.0 + ((i * 7) % 5) as f64 * 0.3).collect();
            let baseline = Baseline::from_window(&window).unwrap();

            let expected_mean = window.iter().sum::<f64>() / n as f64;
            assert!((baseline.mean - expected_mean).abs() < 1e-9);
            assert!(baseline.std_dev >= 0.0);
        }
    }

    #[test]
    fn test_sigma_distance() {
        let baseline = Baseline {
            mean: 10.0,
            std_dev: 2.0,
            window_len: 6,
        };
        assert_eq!(baseline.sigma_distance(16.0), Some(3.0));
        assert_eq!(baseline.sigma_distance(6.0), Some(2.0));
    }
}
