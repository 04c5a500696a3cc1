//! HTTP status API for a running session
//!
//! Serves health, readiness, session progress with per-target results, and
//! Prometheus metrics while probing.

use crate::health::HealthRegistry;
use crate::observability::ProbeMetrics;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: ProbeMetrics,
}

impl AppState {
    pub fn new(health_registry: HealthRegistry, metrics: ProbeMetrics) -> Self {
        Self {
            health_registry,
            metrics,
        }
    }
}

type SharedState = State<Arc<AppState>>;

#[derive(Serialize)]
struct ApiError {
    error: String,
}

fn json_with_status<T: Serialize>(ok: bool, body: T) -> Response {
    let code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body)).into_response()
}

/// 200 while operational (an insufficient target only degrades), 503 otherwise
async fn healthz(State(state): SharedState) -> Response {
    let health = state.health_registry.health().await;
    json_with_status(health.status.is_operational(), health)
}

async fn readyz(State(state): SharedState) -> Response {
    let readiness = state.health_registry.readiness().await;
    json_with_status(readiness.ready, readiness)
}

/// Progress counters plus a summary of every finished target
async fn session(State(state): SharedState) -> Response {
    Json(state.health_registry.session_status().await).into_response()
}

async fn session_target(State(state): SharedState, Path(name): Path<String>) -> Response {
    match state.health_registry.completed_target(&name).await {
        Some(outcome) => Json(outcome).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: format!("target '{}' has not finished", name),
            }),
        )
            .into_response(),
    }
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&prometheus::gather(), &mut buffer) {
        Ok(()) => (
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/session", get(session))
        .route("/session/targets/:name", get(session_target))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the API on `port` until the task is dropped
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Status API listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
