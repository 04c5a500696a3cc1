//! Library for active TCP latency probing
//!
//! This crate provides the core functionality for:
//! - Timed connection sampling against configured targets
//! - Frozen per-target baselines and sigma-threshold anomaly classification
//! - Result persistence and read-back for reporting
//! - Health checks and observability

pub mod analysis;
pub mod api;
pub mod config;
pub mod health;
pub mod models;
pub mod observability;
pub mod report;
pub mod sampler;
pub mod session;
pub mod sink;
pub mod stats;

pub use analysis::{analyze_series, DetectionParams, SeriesAnalysis};
pub use config::{ConfigError, SessionConfig};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
    SessionStatus, TargetOutcome,
};
pub use models::*;
pub use observability::{ProbeMetrics, StructuredLogger};
pub use stats::{compute_baseline, is_anomalous, Baseline, StatsError};
