//! Status banner and health probe handlers.

use axum::Json;
use axum::extract::State;

use crate::api::AppState;
use crate::controller::DetectionStatus;
use crate::health::{self, DaemonHealth};

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> Json<DetectionStatus> {
    Json(state.controller.status().await)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<DaemonHealth> {
    Json(health::check(&state.controller, state.started).await)
}
