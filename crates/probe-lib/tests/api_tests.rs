//! Integration tests for the status API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use probe_lib::{
    api::{create_router, AppState},
    health::{components, HealthRegistry, TargetOutcome},
    models::{Sample, SampleOutcome},
    observability::ProbeMetrics,
    Baseline,
};
use std::sync::Arc;
use tower::ServiceExt;

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::SAMPLER).await;
    health_registry.register(components::SINK).await;

    let state = Arc::new(AppState::new(health_registry, ProbeMetrics::new()));
    (create_router(state.clone()), state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);

    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["sampler"].is_object());
    assert!(health["components"]["sink"].is_object());
}

#[tokio::test]
async fn test_healthz_ok_when_target_insufficient() {
    let (app, state) = setup_test_app().await;
    state
        .health_registry
        .set_degraded(components::SAMPLER, "github_https: 3 of 8 successes")
        .await;

    let (status, body) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);

    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "degraded");
}

#[tokio::test]
async fn test_healthz_returns_503_when_sink_fails() {
    let (app, state) = setup_test_app().await;
    state
        .health_registry
        .set_unhealthy(components::SINK, "No space left on device")
        .await;

    let (status, _) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_healthz_reports_progress() {
    let (app, state) = setup_test_app().await;
    state.health_registry.start_session(3).await;
    state.health_registry.start_target("google_dns_tcp").await;
    state.health_registry.record_written().await;

    let (_, body) = get(app, "/healthz").await;
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(health["progress"]["targets_total"], 3);
    assert_eq!(health["progress"]["records_written"], 1);
    assert_eq!(health["progress"]["current_target"], "google_dns_tcp");
}

#[tokio::test]
async fn test_readyz_follows_session_state() {
    let (app, state) = setup_test_app().await;

    let (status, body) = get(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let readiness: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(readiness["ready"], false);

    state.health_registry.set_ready(true).await;
    let (status, _) = get(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, state) = setup_test_app().await;

    state.metrics.observe_sample(&Sample {
        target_name: "api-test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 443,
        index: 1,
        outcome: SampleOutcome::Success { latency_ms: 4.2 },
    });
    state.metrics.inc_anomalies("api-test");

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("latency_probe_attempts_total"));
    assert!(text.contains("latency_probe_connect_latency_ms_bucket"));
    assert!(text.contains("latency_probe_anomalies_total"));
}

fn finished_target(name: &str, anomalies: usize) -> TargetOutcome {
    TargetOutcome {
        name: name.to_string(),
        host: "8.8.8.8".to_string(),
        port: 53,
        samples: 12,
        failures: 1,
        baseline: Some(Baseline {
            mean: 20.0,
            std_dev: 1.5,
            window_len: 6,
        }),
        anomalies,
        insufficient: false,
    }
}

#[tokio::test]
async fn test_session_lists_finished_targets() {
    let (app, state) = setup_test_app().await;
    state.health_registry.start_session(2).await;
    state
        .health_registry
        .finish_target(finished_target("google_dns_tcp", 2))
        .await;
    state.health_registry.start_target("github_https").await;

    let (status, body) = get(app, "/session").await;
    assert_eq!(status, StatusCode::OK);

    let session: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(session["finished"], false);
    assert_eq!(session["progress"]["targets_done"], 1);
    assert_eq!(session["progress"]["current_target"], "github_https");
    assert_eq!(session["targets"][0]["name"], "google_dns_tcp");
    assert_eq!(session["targets"][0]["anomalies"], 2);
    assert_eq!(session["targets"][0]["baseline"]["mean"], 20.0);
}

#[tokio::test]
async fn test_session_finished_after_last_target() {
    let (app, state) = setup_test_app().await;
    state.health_registry.start_session(1).await;
    state
        .health_registry
        .finish_target(finished_target("google_dns_tcp", 0))
        .await;

    let (_, body) = get(app, "/session").await;
    let session: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(session["finished"], true);
    assert_eq!(session["targets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_session_target_lookup() {
    let (app, state) = setup_test_app().await;
    state.health_registry.start_session(2).await;
    state
        .health_registry
        .finish_target(finished_target("google_dns_tcp", 1))
        .await;

    let (status, body) = get(app.clone(), "/session/targets/google_dns_tcp").await;
    assert_eq!(status, StatusCode::OK);
    let target: TargetOutcome = serde_json::from_slice(&body).unwrap();
    assert_eq!(target, finished_target("google_dns_tcp", 1));

    let (status, body) = get(app, "/session/targets/github_https").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("github_https"));
}
