//! Google Vision text detection.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::OcrError;
use crate::OcrService;

/// Default `images:annotate` endpoint.
pub const DEFAULT_VISION_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// OCR backed by a Vision `images:annotate` endpoint.
#[derive(Debug, Clone)]
pub struct VisionOcrService {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl VisionOcrService {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_VISION_URL)
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OcrService for VisionOcrService {
    async fn extract_text(&self, image_base64: &str) -> Result<String, OcrError> {
        let body = json!({
            "requests": [{
                "image": { "content": image_base64 },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            // The body is still read; error payloads carry no annotation.
            tracing::warn!(status = status.as_u16(), "Vision API returned non-success status");
        }

        let result: Value = resp.json().await?;
        let text = extract_annotation_text(&result);
        tracing::debug!(chars = text.chars().count(), "Vision text extracted");
        Ok(text)
    }
}

/// `responses[0].fullTextAnnotation.text`, or empty when absent.
pub fn extract_annotation_text(result: &Value) -> String {
    result
        .pointer("/responses/0/fullTextAnnotation/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
