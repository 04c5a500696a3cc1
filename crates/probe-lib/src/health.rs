//! Health tracking for a running probe session
//!
//! Component status and session progress, exposed through the status API
//! while a session is in flight.

use crate::stats::Baseline;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Operating, but some results are incomplete
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Session progress counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub targets_total: usize,
    pub targets_done: usize,
    pub records_written: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_target: Option<String>,
}

/// Result of a target whose sampling has completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub samples: usize,
    pub failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Baseline>,
    pub anomalies: usize,
    pub insufficient: bool,
}

/// Progress plus every target finished so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub progress: SessionProgress,
    pub finished: bool,
    pub targets: Vec<TargetOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub progress: SessionProgress,
}

impl HealthResponse {
    /// Worst status across all components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|h| h.status)
            .fold(ComponentStatus::Healthy, |worst, status| match (worst, status) {
                (ComponentStatus::Unhealthy, _) | (_, ComponentStatus::Unhealthy) => {
                    ComponentStatus::Unhealthy
                }
                (ComponentStatus::Degraded, _) | (_, ComponentStatus::Degraded) => {
                    ComponentStatus::Degraded
                }
                _ => ComponentStatus::Healthy,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const SAMPLER: &str = "sampler";
    pub const SINK: &str = "sink";
}

/// Shared registry of component health and session progress
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    progress: Arc<RwLock<SessionProgress>>,
    completed: Arc<RwLock<Vec<TargetOutcome>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        self.components
            .write()
            .await
            .insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn start_session(&self, targets_total: usize) {
        *self.progress.write().await = SessionProgress {
            targets_total,
            ..Default::default()
        };
        self.completed.write().await.clear();
    }

    pub async fn start_target(&self, name: &str) {
        self.progress.write().await.current_target = Some(name.to_string());
    }

    pub async fn record_written(&self) {
        self.progress.write().await.records_written += 1;
    }

    pub async fn finish_target(&self, outcome: TargetOutcome) {
        {
            let mut progress = self.progress.write().await;
            progress.targets_done += 1;
            progress.current_target = None;
        }
        self.completed.write().await.push(outcome);
    }

    pub async fn progress(&self) -> SessionProgress {
        self.progress.read().await.clone()
    }

    /// Finished targets, in the order they completed
    pub async fn completed_targets(&self) -> Vec<TargetOutcome> {
        self.completed.read().await.clone()
    }

    pub async fn completed_target(&self, name: &str) -> Option<TargetOutcome> {
        self.completed
            .read()
            .await
            .iter()
            .find(|t| t.name == name)
            .cloned()
    }

    pub async fn session_status(&self) -> SessionStatus {
        let progress = self.progress().await;
        let targets = self.completed_targets().await;
        SessionStatus {
            finished: progress.targets_total > 0 && progress.targets_done == progress.targets_total,
            progress,
            targets,
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse {
            status,
            components,
            progress: self.progress().await,
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let ready = *self.ready.read().await;
        let health = self.health().await;

        if !ready {
            ReadinessResponse {
                ready: false,
                reason: Some("Session not yet started".to_string()),
            }
        } else if !health.status.is_operational() {
            ReadinessResponse {
                ready: false,
                reason: Some("Critical component unhealthy".to_string()),
            }
        } else {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        }
    }
}
