//! Start -> alerts -> stop flows with a real detector process.

use axum::http::{Method, StatusCode};

use canwatch_core::types::AlertType;

use crate::helpers::assertions::{DEFAULT_TIMEOUT, assert_received_within, wait_until};
use crate::helpers::daemon::TestDaemon;
use crate::helpers::scripts::{alerting_detector, crashing_detector, idle_detector, write_script};

const LINES: [&str; 3] = [
    "[2024-01-01T00:00:00] [ALERT] Replay Attack detected for ID 0x123: repeated frame",
    "[2024-01-01T00:00:01] [ALERT] Unexpected payload on ID 0x1A0: DEADBEEF",
    "[2024-01-01T00:00:02] [ALERT] DoS suspected on known ID 0x0C0",
];

/// Full history is served exactly once per line, before and after stop.
#[tokio::test]
async fn test_start_alerts_stop_roundtrip() {
    let mut daemon = TestDaemon::new();
    let script = write_script(
        daemon.dir.path(),
        "ids_engine.sh",
        &alerting_detector(&daemon.alert_log(), &LINES),
    );

    let (status, body) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK, "start failed: {body}");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Detection started successfully");

    // live channel sees every alert in order
    let first = assert_received_within(&mut daemon.alert_rx, DEFAULT_TIMEOUT).await;
    let second = assert_received_within(&mut daemon.alert_rx, DEFAULT_TIMEOUT).await;
    let third = assert_received_within(&mut daemon.alert_rx, DEFAULT_TIMEOUT).await;
    assert_eq!(first.alert_type, AlertType::ReplayAttack);
    assert_eq!(second.can_id, "0x1A0");
    assert_eq!(third.alert_type, AlertType::DosSuspected);

    let before_stop = daemon.alerts().await;
    assert_eq!(before_stop.len(), 3);

    let (status, body) = daemon.request(Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], true);
    assert!(body["pid"].as_u64().is_some());
    assert_eq!(body["script_path"], script.display().to_string().as_str());
    assert!(body["tail_offset"].as_u64().unwrap() > 0);

    let (status, body) = daemon.stop().await;
    assert_eq!(status, StatusCode::OK, "stop failed: {body}");
    assert_eq!(body["message"], "Detection stopped successfully");

    let after_stop = daemon.alerts().await;
    assert_eq!(after_stop, before_stop);
    let ids: Vec<&str> = after_stop.iter().filter_map(|a| a["canId"].as_str()).collect();
    assert_eq!(ids, vec!["0x123", "0x1A0", "0x0C0"]);

    let (_, body) = daemon.request(Method::GET, "/status", None).await;
    assert_eq!(body["running"], false);
    assert!(body["tail_offset"].is_null());
}

/// Second start while tracked is rejected; start after stop is accepted.
#[tokio::test]
async fn test_single_detector_invariant() {
    let daemon = TestDaemon::new();
    let script = write_script(daemon.dir.path(), "idle.sh", &idle_detector());

    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Detection is already running");

    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::OK);
}

/// Concurrent start requests spawn exactly one detector.
#[tokio::test]
async fn test_concurrent_start_requests() {
    let daemon = TestDaemon::new();
    let script = write_script(daemon.dir.path(), "idle.sh", &idle_detector());

    let (a, b, c) = tokio::join!(
        daemon.start_script(&script),
        daemon.start_script(&script),
        daemon.start_script(&script),
    );
    let ok = [a.0, b.0, c.0]
        .iter()
        .filter(|s| **s == StatusCode::OK)
        .count();
    assert_eq!(ok, 1);

    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::OK);
}

/// Caller-supplied log_file is recorded but alerts stay on the configured log.
#[tokio::test]
async fn test_log_file_does_not_move_alert_log() {
    let daemon = TestDaemon::new();
    let script = write_script(
        daemon.dir.path(),
        "ids_engine.sh",
        &alerting_detector(&daemon.alert_log(), &LINES[..1]),
    );
    let body = serde_json::json!({
        "script_path": script.display().to_string(),
        "log_file": "./attack_can.log",
    })
    .to_string();

    let (status, _) = daemon.start(Some(&body)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, status_body) = daemon.request(Method::GET, "/status", None).await;
    assert_eq!(status_body["input_log"], "./attack_can.log");
    assert_eq!(status_body["alert_log"], daemon.config.alert_log.path.as_str());

    let d = &daemon;
    wait_until(DEFAULT_TIMEOUT, || async move { d.alerts().await.len() == 1 }).await;
    daemon.stop().await;
}

/// A detector that dies on its own keeps its slot until stopped.
#[tokio::test]
async fn test_crashed_detector_reports_degraded() {
    let daemon = TestDaemon::new();
    let script = write_script(daemon.dir.path(), "crash.sh", &crashing_detector(4));

    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK);

    let controller = &daemon.controller;
    wait_until(DEFAULT_TIMEOUT, || async move {
        !controller.detector_status().await.running
    })
    .await;

    let (_, health) = daemon.request(Method::GET, "/health", None).await;
    assert_eq!(health["detector"], "exited");
    assert_eq!(health["status"]["state"], "degraded");

    let (_, status_body) = daemon.request(Method::GET, "/status", None).await;
    assert_eq!(status_body["exit_code"], 4);

    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::OK);

    let (_, health) = daemon.request(Method::GET, "/health", None).await;
    assert_eq!(health["detector"], "idle");
}

/// Malformed start bodies fall back to the configured defaults.
#[tokio::test]
async fn test_malformed_body_uses_defaults() {
    let daemon = TestDaemon::new();

    let (status, _) = daemon.start(Some("{not json")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = daemon.request(Method::GET, "/status", None).await;
    assert_eq!(body["script_path"], daemon.config.detector.default_script.as_str());
    assert_eq!(body["input_log"], daemon.config.detector.default_input_log.as_str());

    daemon.stop().await;
}

/// A mistyped log_file does not cost the caller their script.
#[tokio::test]
async fn test_mistyped_log_file_keeps_requested_script() {
    let daemon = TestDaemon::new();
    let script = write_script(daemon.dir.path(), "custom_ids.sh", &idle_detector());
    let body = serde_json::json!({
        "script_path": script.display().to_string(),
        "log_file": 7,
    })
    .to_string();

    let (status, body) = daemon.start(Some(&body)).await;
    assert_eq!(status, StatusCode::OK, "start failed: {body}");

    let (_, status_body) = daemon.request(Method::GET, "/status", None).await;
    assert_eq!(status_body["running"], true);
    assert_eq!(status_body["script_path"], script.display().to_string().as_str());
    assert_eq!(
        status_body["input_log"],
        daemon.config.detector.default_input_log.as_str()
    );

    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::OK);
}

/// A mistyped script_path is rejected without spawning anything.
#[tokio::test]
async fn test_mistyped_script_path_is_rejected() {
    let daemon = TestDaemon::new();

    let (status, body) = daemon.start(Some(r#"{"script_path":42}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "invalid start_detection body: 'script_path' must be a string"
    );

    assert!(!daemon.controller.detector_status().await.is_tracked());
    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
