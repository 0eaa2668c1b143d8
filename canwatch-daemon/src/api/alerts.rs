//! Alert query handlers. Both re-read the whole alert log on every call.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use canwatch_core::types::AlertRecord;
use canwatch_log_pipeline::AlertSummary;

use crate::api::{ApiError, AppState};

/// Body of `GET /get_alerts`.
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertRecord>,
}

/// `GET /get_alerts`
pub async fn get_alerts(State(state): State<AppState>) -> Result<Json<AlertsResponse>, ApiError> {
    let alerts = state
        .controller
        .alerts()
        .await
        .map_err(ApiError::at("get_alerts"))?;
    Ok(Json(AlertsResponse { alerts }))
}

/// `GET /alert_stats`
pub async fn alert_stats(State(state): State<AppState>) -> Result<Json<AlertSummary>, ApiError> {
    let summary = state
        .controller
        .alert_stats()
        .await
        .map_err(ApiError::at("alert_stats"))?;
    Ok(Json(summary))
}
