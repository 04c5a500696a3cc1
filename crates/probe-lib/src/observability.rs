//! Observability infrastructure for latency probing
//!
//! Provides:
//! - Prometheus metrics (attempt counts, connect latency, anomalies, insufficient targets)
//! - Structured logging with tracing

use crate::models::{Sample, Target};
use crate::stats::{Baseline, LatencyAnomaly};
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for connect latency (in milliseconds)
const CONNECT_LATENCY_BUCKETS_MS: &[f64] = &[
    1.0, 2.5, 5.0, 10.0, 20.0, 35.0, 50.0, 75.0, 100.0, 150.0, 250.0, 500.0, 1000.0, 2000.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ProbeMetricsInner> = OnceLock::new();

struct ProbeMetricsInner {
    probes_total: IntCounterVec,
    probe_failures_total: IntCounterVec,
    connect_latency_ms: HistogramVec,
    anomalies_total: IntCounterVec,
    insufficient_targets_total: IntCounter,
    targets_completed_total: IntCounter,
}

impl ProbeMetricsInner {
    fn new() -> Self {
        Self {
            probes_total: register_int_counter_vec!(
                "latency_probe_attempts_total",
                "Connection attempts made, per target",
                &["target"]
            )
            .expect("Failed to register attempts_total"),

            probe_failures_total: register_int_counter_vec!(
                "latency_probe_failures_total",
                "Connection attempts that produced no latency, per target",
                &["target"]
            )
            .expect("Failed to register failures_total"),

            connect_latency_ms: register_histogram_vec!(
                "latency_probe_connect_latency_ms",
                "TCP connection establishment time in milliseconds",
                &["target"],
                CONNECT_LATENCY_BUCKETS_MS.to_vec()
            )
            .expect("Failed to register connect_latency_ms"),

            anomalies_total: register_int_counter_vec!(
                "latency_probe_anomalies_total",
                "Samples classified as anomalous against the target baseline",
                &["target"]
            )
            .expect("Failed to register anomalies_total"),

            insufficient_targets_total: register_int_counter!(
                "latency_probe_insufficient_targets_total",
                "Targets without enough successful samples to classify"
            )
            .expect("Failed to register insufficient_targets_total"),

            targets_completed_total: register_int_counter!(
                "latency_probe_targets_completed_total",
                "Targets whose sampling run finished"
            )
            .expect("Failed to register targets_completed_total"),
        }
    }
}

/// Probe metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct ProbeMetrics {
    _private: (),
}

impl Default for ProbeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeMetrics {
    /// Create a new metrics handle (registers global metrics on first call)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ProbeMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ProbeMetricsInner {
        GLOBAL_METRICS.get_or_init(ProbeMetricsInner::new)
    }

    /// Record the outcome of one attempt
    pub fn observe_sample(&self, sample: &Sample) {
        let inner = self.inner();
        let label = [sample.target_name.as_str()];
        inner.probes_total.with_label_values(&label).inc();

        match sample.latency_ms() {
            Some(ms) => inner.connect_latency_ms.with_label_values(&label).observe(ms),
            None => inner.probe_failures_total.with_label_values(&label).inc(),
        }
    }

    pub fn inc_anomalies(&self, target: &str) {
        self.inner().anomalies_total.with_label_values(&[target]).inc();
    }

    pub fn inc_insufficient_targets(&self) {
        self.inner().insufficient_targets_total.inc();
    }

    pub fn inc_targets_completed(&self) {
        self.inner().targets_completed_total.inc();
    }
}

/// Structured logger for probe session events
///
/// Emits consistently named events so sessions can be followed in JSON logs.
#[derive(Clone)]
pub struct StructuredLogger {
    session_id: String,
}

impl StructuredLogger {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_session_start(&self, version: &str, targets: usize, samples_per_target: u32) {
        info!(
            event = "session_started",
            session = %self.session_id,
            version = %version,
            targets = targets,
            samples_per_target = samples_per_target,
            "Probe session started"
        );
    }

    pub fn log_target_start(&self, target: &Target) {
        info!(
            event = "target_started",
            session = %self.session_id,
            target_name = %target.name,
            host = %target.host,
            port = target.port,
            "Probing target"
        );
    }

    pub fn log_sample(&self, sample: &Sample) {
        match sample.latency_ms() {
            Some(latency_ms) => info!(
                event = "sample_recorded",
                session = %self.session_id,
                target_name = %sample.target_name,
                index = sample.index,
                latency_ms = latency_ms,
                "[{:02}] {:.2} ms",
                sample.index,
                latency_ms
            ),
            None => info!(
                event = "sample_recorded",
                session = %self.session_id,
                target_name = %sample.target_name,
                index = sample.index,
                failed = true,
                "[{:02}] timeout/fail",
                sample.index
            ),
        }
    }

    pub fn log_baseline(&self, target: &Target, baseline: &Baseline) {
        info!(
            event = "baseline_computed",
            session = %self.session_id,
            target_name = %target.name,
            window = baseline.window_len,
            mean_ms = baseline.mean,
            std_dev_ms = baseline.std_dev,
            "Baseline (first {} successes): mean={:.2} ms, std={:.2} ms",
            baseline.window_len,
            baseline.mean,
            baseline.std_dev
        );
    }

    pub fn log_anomaly(&self, target: &Target, index: u32, anomaly: &LatencyAnomaly) {
        warn!(
            event = "latency_anomaly",
            session = %self.session_id,
            target_name = %target.name,
            index = index,
            latency_ms = anomaly.latency_ms,
            expected_ms = anomaly.expected_ms,
            sigma_distance = anomaly.sigma_distance,
            threshold_sigma = anomaly.threshold_sigma,
            direction = ?anomaly.direction(),
            "Latency anomaly detected"
        );
    }

    pub fn log_insufficient(&self, target: &Target, successes: usize, required: usize) {
        warn!(
            event = "insufficient_samples",
            session = %self.session_id,
            target_name = %target.name,
            successes = successes,
            required = required,
            "Not enough successful samples to compute baseline"
        );
    }

    pub fn log_session_complete(&self, targets: usize, records: usize, anomalies: usize) {
        info!(
            event = "session_completed",
            session = %self.session_id,
            targets = targets,
            records = records,
            anomalies = anomalies,
            "Probe session completed"
        );
    }

    pub fn log_session_aborted(&self, reason: &str) {
        warn!(
            event = "session_aborted",
            session = %self.session_id,
            reason = %reason,
            "Probe session aborted"
        );
    }
}
