//! Error types for label OCR.

/// Errors from the OCR service and the proxy client.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("image data is empty")]
    EmptyImage,
    #[error("OCR request failed: {0}")]
    Request(String),
    #[error("OCR service returned status {0}")]
    Status(u16),
    #[error("OCR service error: {0}")]
    Upstream(String),
    #[error("failed to decode OCR response: {0}")]
    Decode(String),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OcrError::Decode(err.to_string())
        } else {
            OcrError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for OcrError {
    fn from(err: serde_json::Error) -> Self {
        OcrError::Decode(err.to_string())
    }
}
