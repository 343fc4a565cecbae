//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use audicare_core::config::OcrConfig;
use audicare_ocr::{OcrService, VisionOcrService};

/// Environment variable holding the vision API secret.
pub const VISION_SECRET_ENV: &str = "GOOGLE_API_KEY";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// OCR backend, absent when the server has no vision secret.
    pub ocr: Option<Arc<dyn OcrService>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(ocr: Option<Arc<dyn OcrService>>) -> Self {
        Self {
            ocr,
            start_time: Instant::now(),
        }
    }

    /// State backed by the vision API. A blank secret leaves OCR
    /// unconfigured so requests are refused with a clear error.
    pub fn from_config(config: &OcrConfig, secret: Option<&str>) -> Self {
        let ocr = secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|key| {
                Arc::new(VisionOcrService::with_endpoint(key, config.vision_api_url.clone()))
                    as Arc<dyn OcrService>
            });
        if ocr.is_none() {
            tracing::warn!("{} is not set; label requests will fail", VISION_SECRET_ENV);
        }
        Self::new(ocr)
    }

    /// Read the secret from the process environment.
    pub fn from_env(config: &OcrConfig) -> Self {
        let secret = std::env::var(VISION_SECRET_ENV).ok();
        Self::from_config(config, secret.as_deref())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ocr_configured", &self.ocr.is_some())
            .finish()
    }
}
