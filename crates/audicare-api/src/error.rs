//! API error types and their HTTP responses.
//!
//! Validation and configuration failures answer in plain text; failures
//! while processing a request answer with a JSON `{"error": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use audicare_ocr::OcrError;

/// Plain-text body when the server has no vision secret.
pub const MISSING_SECRET_MESSAGE: &str = "Missing Google API Key";

/// Plain-text body when the request carries no image.
pub const MISSING_IMAGE_MESSAGE: &str = "Missing image data";

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 500, plain text - the server is not configured with a vision secret.
    MissingSecret,
    /// 400, plain text.
    BadRequest(String),
    /// 500, JSON - request processing failed.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingSecret => {
                (StatusCode::INTERNAL_SERVER_ERROR, MISSING_SECRET_MESSAGE).into_response()
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(error) => {
                tracing::warn!(%error, "Label request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
            }
        }
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MissingSecret.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::BadRequest(MISSING_IMAGE_MESSAGE.to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(OcrError::Request("refused".to_string()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
