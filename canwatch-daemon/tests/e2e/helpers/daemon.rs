//! In-process daemon under test.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use canwatch_core::config::CanwatchConfig;
use canwatch_core::types::AlertRecord;
use canwatch_daemon::api::{self, AppState};
use canwatch_daemon::controller::DetectionController;
use canwatch_log_pipeline::TailerConfig;

/// Router, controller and temp directory for one test.
#[allow(dead_code)]
pub struct TestDaemon {
    pub dir: TempDir,
    pub config: CanwatchConfig,
    pub controller: Arc<DetectionController>,
    pub app: Router,
    pub alert_rx: mpsc::Receiver<AlertRecord>,
}

#[allow(dead_code)]
impl TestDaemon {
    /// Daemon running detectors with `sh`, tailing every 20ms.
    pub fn new() -> Self {
        Self::with_stop_timeout(5)
    }

    /// Same as [`new`](Self::new) with a custom stop timeout in seconds.
    pub fn with_stop_timeout(stop_timeout_secs: u64) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");

        let mut config = CanwatchConfig::default();
        config.detector.interpreter = "sh".to_owned();
        config.detector.default_script = dir.path().join("missing.sh").display().to_string();
        config.detector.stop_timeout_secs = stop_timeout_secs;
        config.alert_log.path = dir.path().join("ids_alerts.log").display().to_string();

        let tailer = TailerConfig::from_core(&config.alert_log)
            .with_poll_interval(Duration::from_millis(20));
        let (controller, alert_rx) = DetectionController::with_tailer_config(&config, tailer);
        let controller = Arc::new(controller);
        let app = api::router(AppState::new(Arc::clone(&controller)));

        Self {
            dir,
            config,
            controller,
            app,
            alert_rx,
        }
    }

    /// Configured alert log path.
    pub fn alert_log(&self) -> PathBuf {
        PathBuf::from(&self.config.alert_log.path)
    }

    /// Send one request and decode the JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
            .expect("build request");

        let response = self.app.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn start(&self, body: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::POST, "/start_detection", body).await
    }

    /// Start detection with a script path.
    pub async fn start_script(&self, script: &std::path::Path) -> (StatusCode, Value) {
        let body = serde_json::json!({ "script_path": script.display().to_string() }).to_string();
        self.start(Some(&body)).await
    }

    pub async fn stop(&self) -> (StatusCode, Value) {
        self.request(Method::POST, "/stop_detection", None).await
    }

    pub async fn alerts(&self) -> Vec<Value> {
        let (status, body) = self.request(Method::GET, "/get_alerts", None).await;
        assert_eq!(status, StatusCode::OK, "get_alerts failed: {body}");
        body["alerts"].as_array().cloned().expect("alerts array")
    }
}
