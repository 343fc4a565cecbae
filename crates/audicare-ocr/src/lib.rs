//! AudiCare OCR crate - medicine label text extraction.
//!
//! Provides the OcrService trait for text extraction from base64 images,
//! a MockOcrService for testing, a VisionOcrService that forwards to a
//! Google Vision style `images:annotate` endpoint, and the LabelReader
//! client the app uses to reach the OCR proxy.

pub mod error;
pub mod label;
pub mod vision;

use async_trait::async_trait;

pub use error::OcrError;
pub use label::LabelReader;
pub use vision::{extract_annotation_text, VisionOcrService};

/// Service for extracting text from label photos.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Extract text from a base64-encoded image.
    ///
    /// Returns an empty string when no text is detected.
    async fn extract_text(&self, image_base64: &str) -> Result<String, OcrError>;
}

/// Mock OCR service for testing.
///
/// Returns deterministic text without calling any upstream.
#[derive(Debug, Clone)]
pub struct MockOcrService {
    response_text: String,
}

impl MockOcrService {
    pub fn new() -> Self {
        Self {
            response_text: "Ibuprofen 200 mg\nTake 1 tablet every 4 to 6 hours".to_string(),
        }
    }

    /// Create a mock OCR service that returns the specified text.
    pub fn with_text(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
        }
    }

    /// Mock that finds no text.
    pub fn empty() -> Self {
        Self {
            response_text: String::new(),
        }
    }
}

impl Default for MockOcrService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrService for MockOcrService {
    async fn extract_text(&self, image_base64: &str) -> Result<String, OcrError> {
        if image_base64.is_empty() {
            return Err(OcrError::EmptyImage);
        }
        Ok(self.response_text.clone())
    }
}
