//! Sequential sampling of a single target
//!
//! A run performs exactly `count` attempts, one at a time, pausing for the
//! configured interval between attempts.

use super::Prober;
use crate::models::{round_latency_ms, Sample, SampleOutcome, Target};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for a sampling run
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Attempts per target (default: 12)
    pub count: u32,
    /// Pause between consecutive attempts (default: 500ms)
    pub interval: Duration,
    /// Upper bound on a single connection attempt (default: 2s)
    pub connect_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            count: 12,
            interval: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

/// Drives timed connection attempts against targets
#[derive(Clone)]
pub struct Sampler {
    prober: Arc<dyn Prober>,
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(prober: Arc<dyn Prober>, config: SamplerConfig) -> Self {
        Self { prober, config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Start a new sampling run against `target`
    ///
    /// Nothing is probed until the run is polled with [`SampleRun::next`].
    pub fn run<'a>(&'a self, target: &'a Target) -> SampleRun<'a> {
        SampleRun {
            sampler: self,
            target,
            next_index: 1,
        }
    }
}

/// A lazy, finite sequence of samples for one target
///
/// Yields samples with indices `1..=count` in order, then `None` forever.
/// A run cannot be rewound; probing again requires [`Sampler::run`].
pub struct SampleRun<'a> {
    sampler: &'a Sampler,
    target: &'a Target,
    next_index: u32,
}

impl<'a> SampleRun<'a> {
    /// Perform the next attempt and return its sample
    pub async fn next(&mut self) -> Option<Sample> {
        let config = &self.sampler.config;
        if self.next_index > config.count {
            return None;
        }

        let index = self.next_index;
        if index > 1 && !config.interval.is_zero() {
            tokio::time::sleep(config.interval).await;
        }
        self.next_index += 1;

        let outcome = match self
            .sampler
            .prober
            .probe(self.target, config.connect_timeout)
            .await
        {
            Ok(elapsed) => SampleOutcome::Success {
                latency_ms: round_latency_ms(elapsed.as_secs_f64() * 1000.0),
            },
            Err(e) => {
                debug!(
                    target_name = %self.target.name,
                    index,
                    kind = e.kind(),
                    error = %e,
                    "Connection attempt failed"
                );
                SampleOutcome::Failed
            }
        };

        Some(Sample {
            target_name: self.target.name.clone(),
            host: self.target.host.clone(),
            port: self.target.port,
            index,
            outcome,
        })
    }

    /// Number of attempts not yet performed
    pub fn remaining(&self) -> u32 {
        (self.sampler.config.count + 1).saturating_sub(self.next_index)
    }

    /// Drain the run into a vector
    pub async fn collect(mut self) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(self.remaining() as usize);
        while let Some(sample) = self.next().await {
            samples.push(sample);
        }
        samples
    }
}
