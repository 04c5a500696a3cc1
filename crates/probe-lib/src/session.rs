//! Probe session controller
//!
//! Runs every configured target through the same sequence of phases:
//! sampling, baseline selection, then classification of the remaining
//! successes. Targets are processed one at a time and share no state.

use crate::analysis::{analyze_series, SeriesAnalysis, SuccessPoint};
use crate::config::SessionConfig;
use crate::health::{components, HealthRegistry, TargetOutcome};
use crate::models::{now_local, Sample, SessionRecord, Target};
use crate::observability::{ProbeMetrics, StructuredLogger};
use crate::sampler::{Prober, Sampler, TcpConnectProber};
use crate::sink::{RecordSink, SinkError};
use crate::stats::AnomalyDetector;
use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Source of record timestamps
pub type Clock = fn() -> NaiveDateTime;

/// Everything observed for one target during a session
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: Target,
    #[serde(skip)]
    pub samples: Vec<Sample>,
    pub analysis: SeriesAnalysis,
}

impl TargetReport {
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn failure_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.outcome.is_success()).count()
    }

    pub fn success_count(&self) -> usize {
        self.sample_count() - self.failure_count()
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.analysis, SeriesAnalysis::Insufficient { .. })
    }

    pub fn outcome(&self) -> TargetOutcome {
        TargetOutcome {
            name: self.target.name.clone(),
            host: self.target.host.clone(),
            port: self.target.port,
            samples: self.sample_count(),
            failures: self.failure_count(),
            baseline: self.analysis.baseline().copied(),
            anomalies: self.analysis.anomaly_count(),
            insufficient: self.is_insufficient(),
        }
    }
}

/// Outcome of a whole session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub started_at: NaiveDateTime,
    pub targets: Vec<TargetReport>,
}

impl SessionReport {
    pub fn total_records(&self) -> usize {
        self.targets.iter().map(TargetReport::sample_count).sum()
    }

    pub fn total_anomalies(&self) -> usize {
        self.targets.iter().map(|t| t.analysis.anomaly_count()).sum()
    }

    pub fn insufficient_targets(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets.iter().filter(|t| t.is_insufficient())
    }
}

/// Sequential probe session over all configured targets
pub struct ProbeSession {
    config: SessionConfig,
    sampler: Sampler,
    detector: AnomalyDetector,
    metrics: ProbeMetrics,
    logger: StructuredLogger,
    health: Option<HealthRegistry>,
    clock: Clock,
}

impl ProbeSession {
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Probe every target in order, streaming one record per sample to `sink`
    ///
    /// Only sink failures abort the session; unreachable targets become
    /// failed samples and targets without enough successes are reported.
    pub async fn run(&self, sink: &mut dyn RecordSink) -> Result<SessionReport, SinkError> {
        let started_at = (self.clock)();
        self.logger.log_session_start(
            env!("CARGO_PKG_VERSION"),
            self.config.targets.len(),
            self.config.samples_per_target,
        );

        if let Some(health) = &self.health {
            health.start_session(self.config.targets.len()).await;
            health.set_ready(true).await;
        }

        let mut reports = Vec::with_capacity(self.config.targets.len());
        for target in &self.config.targets {
            let report = match self.run_target(target, sink).await {
                Ok(report) => report,
                Err(e) => {
                    self.mark_sink_failed(&e).await;
                    self.logger.log_session_aborted(&e.to_string());
                    return Err(e);
                }
            };
            reports.push(report);
        }

        if let Err(e) = sink.finish() {
            self.mark_sink_failed(&e).await;
            self.logger.log_session_aborted(&e.to_string());
            return Err(e);
        }

        let report = SessionReport {
            started_at,
            targets: reports,
        };
        self.logger.log_session_complete(
            report.targets.len(),
            report.total_records(),
            report.total_anomalies(),
        );

        Ok(report)
    }

    /// Sample, then classify, a single target
    pub async fn run_target(
        &self,
        target: &Target,
        sink: &mut dyn RecordSink,
    ) -> Result<TargetReport, SinkError> {
        self.logger.log_target_start(target);
        if let Some(health) = &self.health {
            health.start_target(&target.name).await;
        }

        let samples = self.sample_target(target, sink).await?;
        let successes: Vec<SuccessPoint> = samples
            .iter()
            .filter_map(|s| {
                s.latency_ms().map(|latency_ms| SuccessPoint {
                    index: s.index,
                    latency_ms,
                })
            })
            .collect();

        let analysis = analyze_series(&successes, self.config.detection_params());
        self.report_analysis(target, &analysis).await;

        let report = TargetReport {
            target: target.clone(),
            samples,
            analysis,
        };

        self.metrics.inc_targets_completed();
        if let Some(health) = &self.health {
            health.finish_target(report.outcome()).await;
        }

        Ok(report)
    }

    async fn sample_target(
        &self,
        target: &Target,
        sink: &mut dyn RecordSink,
    ) -> Result<Vec<Sample>, SinkError> {
        let mut run = self.sampler.run(target);
        let mut samples = Vec::with_capacity(run.remaining() as usize);

        while let Some(sample) = run.next().await {
            self.metrics.observe_sample(&sample);
            self.logger.log_sample(&sample);

            sink.write(&SessionRecord::from_sample(&sample, (self.clock)()))?;
            if let Some(health) = &self.health {
                health.record_written().await;
            }

            samples.push(sample);
        }

        debug!(
            target_name = %target.name,
            samples = samples.len(),
            "Sampling complete"
        );
        Ok(samples)
    }

    async fn report_analysis(&self, target: &Target, analysis: &SeriesAnalysis) {
        match analysis {
            SeriesAnalysis::Insufficient {
                successes,
                required,
            } => {
                self.logger.log_insufficient(target, *successes, *required);
                self.metrics.inc_insufficient_targets();
                if let Some(health) = &self.health {
                    health
                        .set_degraded(
                            components::SAMPLER,
                            format!("{}: {} of {} successes", target.name, successes, required),
                        )
                        .await;
                }
            }
            SeriesAnalysis::Classified {
                baseline,
                classified,
                ..
            } => {
                self.logger.log_baseline(target, baseline);
                for point in classified {
                    info!(
                        target_name = %target.name,
                        success = point.success_rank,
                        latency_ms = point.latency_ms,
                        status = point.classification.as_str(),
                        "  success {:02}: {:.2} ms -> {}",
                        point.success_rank,
                        point.latency_ms,
                        point.classification.as_str()
                    );
                    if let Some(anomaly) = self.detector.detect(point.latency_ms, baseline) {
                        self.logger.log_anomaly(target, point.index, &anomaly);
                        self.metrics.inc_anomalies(&target.name);
                    }
                }
            }
        }
    }

    async fn mark_sink_failed(&self, error: &SinkError) {
        if let Some(health) = &self.health {
            health
                .set_unhealthy(components::SINK, error.to_string())
                .await;
        }
    }
}

/// Builder for creating a probe session
pub struct ProbeSessionBuilder {
    config: SessionConfig,
    prober: Option<Arc<dyn Prober>>,
    metrics: Option<ProbeMetrics>,
    logger: Option<StructuredLogger>,
    health: Option<HealthRegistry>,
    clock: Clock,
}

impl ProbeSessionBuilder {
    /// Create a new builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            prober: None,
            metrics: None,
            logger: None,
            health: None,
            clock: now_local,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the prober (defaults to a TCP connect prober)
    pub fn prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = Some(prober);
        self
    }

    pub fn metrics(mut self, metrics: ProbeMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Report progress and component health to `health`
    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Override the record timestamp source
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration and build the session
    pub fn build(self) -> Result<ProbeSession> {
        self.config.validate()?;

        let prober = self
            .prober
            .unwrap_or_else(|| Arc::new(TcpConnectProber::new()));
        let sampler = Sampler::new(prober, self.config.sampler_config());
        let logger = self.logger.unwrap_or_else(|| {
            StructuredLogger::new((self.clock)().format("%Y%m%dT%H%M%S").to_string())
        });

        Ok(ProbeSession {
            detector: AnomalyDetector::new(self.config.threshold_sigma),
            sampler,
            metrics: self.metrics.unwrap_or_default(),
            logger,
            health: self.health,
            clock: self.clock,
            config: self.config,
        })
    }
}

impl Default for ProbeSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
