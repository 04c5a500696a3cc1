//! Prober configuration

use anyhow::{Context, Result};
use probe_lib::config::{
    default_targets, SessionConfig, DEFAULT_BASELINE_SAMPLES, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_INTERVAL, DEFAULT_SAMPLES_PER_TARGET,
};
use probe_lib::stats::DEFAULT_THRESHOLD_SIGMA;
use probe_lib::Target;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `PROBE_SAMPLES_PER_TARGET=20`
pub const ENV_PREFIX: &str = "PROBE";

/// Prober configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,

    #[serde(default = "default_samples_per_target")]
    pub samples_per_target: u32,

    /// Leading successes frozen into each target's baseline
    #[serde(default = "default_baseline_samples")]
    pub baseline_samples: usize,

    #[serde(default = "default_threshold_sigma")]
    pub threshold_sigma: f64,

    /// Pause between attempts in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Directory receiving the results file
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Port for the health/metrics server; disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_samples_per_target() -> u32 {
    DEFAULT_SAMPLES_PER_TARGET
}

fn default_baseline_samples() -> usize {
    DEFAULT_BASELINE_SAMPLES
}

fn default_threshold_sigma() -> f64 {
    DEFAULT_THRESHOLD_SIGMA
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL.as_millis() as u64
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ProbeConfig {
    /// Load configuration from an optional file and `PROBE_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration values")
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            targets: self.targets.clone(),
            samples_per_target: self.samples_per_target,
            baseline_samples: self.baseline_samples,
            threshold_sigma: self.threshold_sigma,
            interval: Duration::from_millis(self.interval_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}
