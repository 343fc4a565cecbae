//! Remote completion client.
//!
//! Sends the fixed system instruction plus the single latest user utterance
//! to an OpenAI-compatible `/chat/completions` endpoint. No earlier turns are
//! included, no timeout beyond the HTTP stack default is set, and failed
//! calls are not retried.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use audicare_core::config::AssistantConfig;

use crate::error::ChatError;
use crate::types::Role;

/// A service that turns one utterance into a reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a completion.
    ///
    /// `Ok(None)` means the call succeeded but the body carried no usable
    /// reply text.
    async fn complete(&self, system: &str, utterance: &str) -> Result<Option<String>, ChatError>;
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Client for OpenAI-compatible chat completion APIs.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompletionClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        let defaults = AssistantConfig::default();
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
        }
    }

    /// Build a client from configuration, or `None` when no credential is set.
    pub fn from_config(config: &AssistantConfig) -> Option<Self> {
        let key = config.credential()?;
        Some(
            Self::new(key, config.api_base.clone())
                .with_model(config.model.clone())
                .with_max_tokens(config.max_tokens),
        )
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, system: &str, utterance: &str) -> Result<Option<String>, ChatError> {
        let payload = ApiRequest {
            model: &self.model,
            messages: [
                ApiMessage {
                    role: Role::System.as_str(),
                    content: system,
                },
                ApiMessage {
                    role: Role::User.as_str(),
                    content: utterance,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::CompletionStatus(status.as_u16()));
        }

        let text = resp.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;
        Ok(extract_reply(&body))
    }
}

/// Pull the reply text out of a completion response body.
///
/// Looks at `choices[0].message.content` first, then a top-level `reply`
/// field. Empty strings count as absent.
pub fn extract_reply(body: &Value) -> Option<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            body.get("reply")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .map(str::to_string)
}
