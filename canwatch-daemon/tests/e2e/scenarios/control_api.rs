//! Control API behavior that needs no running detector.

use axum::http::{Method, StatusCode};

use crate::helpers::daemon::TestDaemon;

const SAMPLE: &str = "\
[2024-01-01T00:00:00] [ALERT] Replay Attack detected for ID 0x123: repeated frame
[2024-01-01T00:00:01] [ALERT] Unknown CAN ID detected

short line
[2024-01-01T00:00:02] [ALERT] DoS suspected on known ID 0x0C0
";

/// Missing alert log is an empty list, not an error.
#[tokio::test]
async fn test_get_alerts_without_log_file() {
    let daemon = TestDaemon::new();
    assert!(!daemon.alert_log().exists());

    let (status, body) = daemon.request(Method::GET, "/get_alerts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "alerts": [] }));
}

/// Alert log is parsed in full on every request.
#[tokio::test]
async fn test_get_alerts_parses_whole_log() {
    let daemon = TestDaemon::new();
    std::fs::write(daemon.alert_log(), SAMPLE).unwrap();

    let alerts = daemon.alerts().await;
    assert_eq!(alerts.len(), 3);
    assert_eq!(
        alerts[0],
        serde_json::json!({
            "timestamp": "2024-01-01T00:00:00",
            "type": "Replay Attack Detected",
            "message": "Replay Attack detected for ID 0x123: repeated frame",
            "canId": "0x123",
        })
    );
    assert_eq!(alerts[1]["type"], "Unknown CAN ID Detected");
    assert_eq!(alerts[2]["type"], "DoS Suspected");

    // same answer twice
    assert_eq!(daemon.alerts().await, alerts);
}

/// Stop with nothing running is a 400 with the error envelope.
#[tokio::test]
async fn test_stop_without_detection() {
    let daemon = TestDaemon::new();
    let (status, body) = daemon.stop().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "No detection is currently running");
}

/// Spawn failure is a 500 and leaves the daemon able to start later.
#[tokio::test]
async fn test_start_with_missing_interpreter() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = canwatch_core::config::CanwatchConfig::default();
    config.detector.interpreter = "/nonexistent/python3".to_owned();
    config.alert_log.path = dir.path().join("ids_alerts.log").display().to_string();
    let (controller, _rx) = canwatch_daemon::controller::DetectionController::new(&config);
    let controller = std::sync::Arc::new(controller);
    let app = canwatch_daemon::api::router(canwatch_daemon::api::AppState::new(controller));

    use tower::ServiceExt;
    let response = app
        .oneshot(
            axum::http::Request::post("/start_detection")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("/nonexistent/python3"));

    // alert log is created before the spawn attempt
    assert!(dir.path().join("ids_alerts.log").exists());
}

/// Alert stats count the whole log.
#[tokio::test]
async fn test_alert_stats() {
    let daemon = TestDaemon::new();
    std::fs::write(daemon.alert_log(), SAMPLE).unwrap();

    let (status, body) = daemon.request(Method::GET, "/alert_stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["replay"], 1);
    assert_eq!(body["unknown"], 1);
    assert_eq!(body["dos"], 1);
    assert_eq!(body["by_severity"]["critical"], 1);
}

/// Idle status and health.
#[tokio::test]
async fn test_idle_status_and_health() {
    let daemon = TestDaemon::new();

    let (status, body) = daemon.request(Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], false);
    assert!(body["pid"].is_null());
    assert_eq!(body["alert_log"], daemon.config.alert_log.path.as_str());

    let (status, body) = daemon.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["state"], "healthy");
    assert_eq!(body["detector"], "idle");
}

/// Any origin may call the API.
#[tokio::test]
async fn test_cors_allows_any_origin() {
    use tower::ServiceExt;

    let daemon = TestDaemon::new();
    let request = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/get_alerts")
        .header("origin", "http://localhost:8080")
        .header("access-control-request-method", "GET")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = daemon.app.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

/// Unknown routes are plain 404s.
#[tokio::test]
async fn test_unknown_route() {
    let daemon = TestDaemon::new();
    let (status, _) = daemon.request(Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
