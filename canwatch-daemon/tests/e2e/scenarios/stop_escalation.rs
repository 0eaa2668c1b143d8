//! Stop escalation and daemon shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::helpers::daemon::TestDaemon;
use crate::helpers::scripts::{idle_detector, stubborn_detector, write_script};

/// A detector ignoring SIGTERM is killed, reported as 500, and the slot is freed.
#[tokio::test]
async fn test_stubborn_detector_is_killed() {
    let daemon = TestDaemon::with_stop_timeout(1);
    let script = write_script(daemon.dir.path(), "stubborn.sh", &stubborn_detector());

    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK);

    // let the shell install its trap
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let (status, body) = daemon.stop().await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("did not exit"));

    assert!(!daemon.controller.detector_status().await.is_tracked());
    assert_eq!(
        daemon.controller.tailer_status().await,
        canwatch_log_pipeline::CollectorStatus::Idle
    );

    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK);
    daemon.controller.shutdown().await;
}

/// Status and health keep answering while a stop waits for the detector.
#[tokio::test]
async fn test_status_and_health_respond_during_stop_grace_period() {
    let daemon = TestDaemon::with_stop_timeout(2);
    let script = write_script(daemon.dir.path(), "stubborn.sh", &stubborn_detector());

    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let stopper = {
        let controller = Arc::clone(&daemon.controller);
        tokio::spawn(async move { controller.stop().await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!stopper.is_finished());

    let (status, body) = tokio::time::timeout(
        Duration::from_millis(500),
        daemon.request(Method::GET, "/status", None),
    )
    .await
    .expect("/status answers during stop");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], true);

    let (status, body) = tokio::time::timeout(
        Duration::from_millis(500),
        daemon.request(Method::GET, "/health", None),
    )
    .await
    .expect("/health answers during stop");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detector"], "running");

    let err = stopper.await.unwrap().unwrap_err();
    assert!(!err.is_client_error());
    assert!(!daemon.controller.detector_status().await.is_tracked());
}

/// Shutdown stops a running detection and is a no-op when idle.
#[tokio::test]
async fn test_shutdown_stops_detection() {
    let daemon = TestDaemon::new();
    daemon.controller.shutdown().await;

    let script = write_script(daemon.dir.path(), "idle.sh", &idle_detector());
    let (status, _) = daemon.start_script(&script).await;
    assert_eq!(status, StatusCode::OK);

    daemon.controller.shutdown().await;
    assert!(!daemon.controller.detector_status().await.is_tracked());

    let (status, _) = daemon.stop().await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
