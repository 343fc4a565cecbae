//! Route handler functions.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, MISSING_IMAGE_MESSAGE};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub ocr_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LabelTextResponse {
    pub text: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        ocr_configured: state.ocr.is_some(),
    })
}

/// POST /read-medicine-label
///
/// Body: `{"imageBase64": "<base64>"}`. The secret check runs before the
/// body is parsed, so an unconfigured server refuses every request the
/// same way.
pub async fn read_medicine_label(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LabelTextResponse>, ApiError> {
    let ocr = state.ocr.as_ref().ok_or(ApiError::MissingSecret)?;

    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::Internal(e.to_string()))?;
    if payload.is_null() {
        return Err(ApiError::Internal("request body is null".to_string()));
    }

    let image = payload
        .get("imageBase64")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_IMAGE_MESSAGE.to_string()))?;

    tracing::info!(bytes = image.len(), "Reading medicine label");
    let text = ocr.extract_text(image).await?;
    Ok(Json(LabelTextResponse { text }))
}
