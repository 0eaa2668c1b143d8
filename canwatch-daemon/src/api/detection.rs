//! Start/stop handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::{ApiError, AppState};
use crate::controller::StartRequest;

/// Success body of the start/stop endpoints.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl ActionResponse {
    fn success(message: &'static str) -> Json<Self> {
        Json(Self {
            status: "success",
            message,
        })
    }
}

/// A start body field with an unusable type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid start_detection body: '{field}' must be a string")]
pub struct InvalidStartBody {
    /// Offending field.
    pub field: &'static str,
}

/// Decode an optional start body.
///
/// Empty, non-JSON and non-object bodies mean defaults. Object fields are
/// read one by one: `null` or absent means the default. A non-string
/// `script_path` is rejected, since any fallback would launch a different
/// script. A non-string `log_file` is only recorded, so it is dropped with
/// a warning.
pub fn parse_start_request(body: &[u8]) -> Result<StartRequest, InvalidStartBody> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(StartRequest::default());
    }
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            tracing::debug!(body = %other, "ignoring non-object start_detection body");
            return Ok(StartRequest::default());
        }
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed start_detection body");
            return Ok(StartRequest::default());
        }
    };

    let script_path = string_field(&fields, "script_path")?;
    let log_file = string_field(&fields, "log_file").unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring log_file");
        None
    });

    Ok(StartRequest {
        script_path,
        log_file,
    })
}

fn string_field(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, InvalidStartBody> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(InvalidStartBody { field }),
    }
}

/// `POST /start_detection`
pub async fn start_detection(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let request = parse_start_request(&body)
        .map_err(|e| ApiError::bad_request("start_detection", e.to_string()))?;
    state
        .controller
        .start(request)
        .await
        .map_err(ApiError::at("start_detection"))?;
    Ok(ActionResponse::success("Detection started successfully"))
}

/// `POST /stop_detection`
pub async fn stop_detection(
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, ApiError> {
    state
        .controller
        .stop()
        .await
        .map_err(ApiError::at("stop_detection"))?;
    Ok(ActionResponse::success("Detection stopped successfully"))
}
