//! HTTP control API.
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | POST | `/start_detection` | spawn the detector and start tailing |
//! | POST | `/stop_detection` | stop the detector and the tailer |
//! | GET | `/get_alerts` | re-parse the whole alert log |
//! | GET | `/alert_stats` | per-type and per-severity counts |
//! | GET | `/status` | detector and tailer snapshot |
//! | GET | `/health` | aggregated component health |
//!
//! Every endpoint allows cross-origin requests from any origin.

pub mod alerts;
pub mod detection;
pub mod error;
pub mod status;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controller::DetectionController;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Detection controller.
    pub controller: Arc<DetectionController>,
    /// Daemon start time.
    pub started: Instant,
}

impl AppState {
    /// Wrap a controller, marking now as the daemon start time.
    pub fn new(controller: Arc<DetectionController>) -> Self {
        Self {
            controller,
            started: Instant::now(),
        }
    }
}

/// Build the control API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/start_detection", post(detection::start_detection))
        .route("/stop_detection", post(detection::stop_detection))
        .route("/get_alerts", get(alerts::get_alerts))
        .route("/alert_stats", get(alerts::alert_stats))
        .route("/status", get(status::status))
        .route("/health", get(status::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
