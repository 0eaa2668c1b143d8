//! API error responses.
//!
//! Every failure is rendered as `{"status":"error","message":...}`.
//! Invalid state transitions and mistyped request fields map to `400`,
//! everything else to `500`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use canwatch_core::metrics as m;

use crate::controller::ControllerError;

/// Error returned by a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    endpoint: &'static str,
}

impl ApiError {
    /// Classify a controller error raised by `endpoint`.
    pub fn from_controller(endpoint: &'static str, err: ControllerError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
            endpoint,
        }
    }

    /// Reject a malformed request to `endpoint`.
    pub fn bad_request(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            endpoint,
        }
    }

    /// Closure form for `map_err`.
    pub fn at(endpoint: &'static str) -> impl Fn(ControllerError) -> Self {
        move |err| Self::from_controller(endpoint, err)
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message placed in the body.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(endpoint = self.endpoint, error = %self.message, "request failed");
        } else {
            tracing::warn!(endpoint = self.endpoint, error = %self.message, "request rejected");
        }
        metrics::counter!(m::API_ERRORS_TOTAL, m::LABEL_ENDPOINT => self.endpoint).increment(1);

        let body = Json(json!({
            "status": "error",
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
