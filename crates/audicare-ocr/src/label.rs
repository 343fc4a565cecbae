//! Client for the medicine label OCR proxy.

use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use audicare_core::config::OcrConfig;

use crate::error::OcrError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LabelRequest<'a> {
    image_base64: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    text: Option<String>,
    error: Option<String>,
}

/// Sends label photos to the OCR proxy and returns the recognized text.
#[derive(Debug, Clone)]
pub struct LabelReader {
    client: reqwest::Client,
    proxy_url: String,
}

impl LabelReader {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            proxy_url: proxy_url.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.proxy_url.clone())
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    /// Read the text on a label image.
    pub async fn read_label(&self, image: &[u8]) -> Result<String, OcrError> {
        if image.is_empty() {
            return Err(OcrError::EmptyImage);
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        self.read_label_base64(&encoded).await
    }

    /// Read a label image from disk.
    pub async fn read_label_file(&self, path: &Path) -> Result<String, OcrError> {
        let image = tokio::fs::read(path).await?;
        self.read_label(&image).await
    }

    /// Post an already-encoded image to the proxy.
    pub async fn read_label_base64(&self, image_base64: &str) -> Result<String, OcrError> {
        tracing::debug!(url = %self.proxy_url, bytes = image_base64.len(), "Posting label image");
        let resp = self
            .client
            .post(&self.proxy_url)
            .json(&LabelRequest { image_base64 })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        match serde_json::from_str::<LabelResponse>(&body) {
            Ok(LabelResponse {
                error: Some(message),
                ..
            }) => Err(OcrError::Upstream(message)),
            Ok(LabelResponse {
                text: Some(text), ..
            }) if status.is_success() => Ok(text),
            _ if !status.is_success() => {
                // Plain-text failures such as "Missing image data".
                let message = body.trim();
                if message.is_empty() {
                    Err(OcrError::Status(status.as_u16()))
                } else {
                    Err(OcrError::Upstream(message.to_string()))
                }
            }
            Ok(_) => Err(OcrError::Decode("response has no text field".to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
