//! Session configuration
//!
//! All settings are fixed before a session starts and validated once.

use crate::analysis::DetectionParams;
use crate::models::Target;
use crate::sampler::SamplerConfig;
use crate::stats::{DEFAULT_THRESHOLD_SIGMA, MIN_BASELINE_WINDOW};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SAMPLES_PER_TARGET: u32 = 12;
pub const DEFAULT_BASELINE_SAMPLES: usize = 6;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration errors detected before any probing starts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no targets configured")]
    NoTargets,

    #[error("duplicate target name: {0}")]
    DuplicateTarget(String),

    #[error("target {0} has an empty host")]
    EmptyHost(String),

    #[error("target {0} has an empty name")]
    EmptyName(String),

    #[error("target {0} has invalid port 0")]
    InvalidPort(String),

    #[error("samples per target must be at least 1")]
    NoSamples,

    #[error("baseline window must hold at least {min} samples, got {got}")]
    BaselineTooSmall { min: usize, got: usize },

    #[error("threshold sigma must be a positive finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("connect timeout must be greater than zero")]
    ZeroTimeout,
}

/// Immutable settings for one probe session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub targets: Vec<Target>,
    pub samples_per_target: u32,
    /// Leading successes used for each target's baseline
    pub baseline_samples: usize,
    /// Anomaly threshold in standard deviations
    pub threshold_sigma: f64,
    /// Pause between consecutive attempts against one target
    pub interval: Duration,
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            samples_per_target: DEFAULT_SAMPLES_PER_TARGET,
            baseline_samples: DEFAULT_BASELINE_SAMPLES,
            threshold_sigma: DEFAULT_THRESHOLD_SIGMA,
            interval: DEFAULT_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Targets probed when none are configured
pub fn default_targets() -> Vec<Target> {
    vec![
        Target::new("google_dns_tcp", "8.8.8.8", 443),
        Target::new("cloudflare_dns_tcp", "1.1.1.1", 443),
        Target::new("github_https", "github.com", 443),
    ]
}

impl SessionConfig {
    /// Check every setting, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.trim().is_empty() {
                return Err(ConfigError::EmptyName(target.host.clone()));
            }
            if target.host.trim().is_empty() {
                return Err(ConfigError::EmptyHost(target.name.clone()));
            }
            if target.port == 0 {
                return Err(ConfigError::InvalidPort(target.name.clone()));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::DuplicateTarget(target.name.clone()));
            }
        }

        if self.samples_per_target == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.baseline_samples < MIN_BASELINE_WINDOW {
            return Err(ConfigError::BaselineTooSmall {
                min: MIN_BASELINE_WINDOW,
                got: self.baseline_samples,
            });
        }
        if !self.threshold_sigma.is_finite() || self.threshold_sigma <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold_sigma));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            baseline_samples: self.baseline_samples,
            threshold_sigma: self.threshold_sigma,
        }
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            count: self.samples_per_target,
            interval: self.interval,
            connect_timeout: self.connect_timeout,
        }
    }
}
