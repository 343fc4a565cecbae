//! Response resolution: remote completion first, keyword rules as fallback.

use std::sync::Arc;

use audicare_core::config::{AssistantConfig, DEFAULT_SYSTEM_PROMPT};

use crate::completion::{CompletionClient, OpenAiCompletionClient};
use crate::rules::{generic_reply, RuleTable};

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Remote,
    Rule,
    Generic,
}

/// A resolved reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub source: ReplySource,
}

/// Produces one assistant reply per user utterance. Never fails.
pub struct ResponseResolver {
    rules: RuleTable,
    remote: Option<Arc<dyn CompletionClient>>,
    system_prompt: String,
}

impl Default for ResponseResolver {
    fn default() -> Self {
        Self::offline()
    }
}

impl ResponseResolver {
    /// Resolver that only uses the built-in rule table.
    pub fn offline() -> Self {
        Self::new(RuleTable::default())
    }

    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            remote: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_remote(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.remote = Some(client);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Build from configuration. The remote client is attached only when a
    /// non-blank credential is configured.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let resolver = Self::offline().with_system_prompt(config.system_prompt.clone());
        match OpenAiCompletionClient::from_config(config) {
            Some(client) => {
                tracing::info!(model = client.model(), "Remote completion enabled");
                resolver.with_remote(Arc::new(client))
            }
            None => {
                tracing::info!("No API key configured, using offline replies");
                resolver
            }
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Resolve a reply for one utterance.
    pub async fn resolve(&self, utterance: &str) -> Resolution {
        if let Some(remote) = &self.remote {
            match remote.complete(&self.system_prompt, utterance).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    return Resolution {
                        text,
                        source: ReplySource::Remote,
                    }
                }
                Ok(_) => {
                    tracing::warn!("Completion response carried no reply, using rules");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Completion failed, using rules");
                }
            }
        }
        self.resolve_offline(utterance)
    }

    /// Rule-table reply without touching the remote client.
    pub fn resolve_offline(&self, utterance: &str) -> Resolution {
        match self.rules.first_match(utterance) {
            Some(rule) => {
                tracing::debug!(rule = rule.name, "Rule matched");
                Resolution {
                    text: rule.response.to_string(),
                    source: ReplySource::Rule,
                }
            }
            None => Resolution {
                text: generic_reply(utterance),
                source: ReplySource::Generic,
            },
        }
    }
}

impl std::fmt::Debug for ResponseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseResolver")
            .field("rules", &self.rules.rules().len())
            .field("remote", &self.has_remote())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::rules::HEALTH_RULES;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn headache() -> &'static str {
        HEALTH_RULES[0].response
    }

    /// Scripted client that records the prompts it was given.
    struct ScriptedClient {
        reply: Result<Option<String>, u16>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedClient {
        fn new(reply: Result<Option<String>, u16>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            system: &str,
            utterance: &str,
        ) -> Result<Option<String>, ChatError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), utterance.to_string()));
            self.reply.clone().map_err(ChatError::CompletionStatus)
        }
    }

    #[tokio::test]
    async fn test_offline_headache() {
        let resolver = ResponseResolver::offline();
        let res = resolver.resolve("I have a headache").await;
        assert_eq!(res.text, headache());
        assert_eq!(res.source, ReplySource::Rule);
    }

    #[tokio::test]
    async fn test_offline_priority() {
        let resolver = ResponseResolver::offline();
        let res = resolver.resolve("fever and headache").await;
        assert_eq!(res.text, headache());
    }

    #[tokio::test]
    async fn test_offline_generic() {
        let resolver = ResponseResolver::offline();
        let res = resolver.resolve("Tell me about Knees").await;
        assert_eq!(res.source, ReplySource::Generic);
        assert_eq!(res.text, generic_reply("Tell me about Knees"));
    }

    #[tokio::test]
    async fn test_remote_reply_used_verbatim() {
        let client = ScriptedClient::new(Ok(Some("Remote says rest.".to_string())));
        let resolver = ResponseResolver::offline()
            .with_system_prompt("sys")
            .with_remote(client.clone());

        let res = resolver.resolve("headache").await;
        assert_eq!(res.text, "Remote says rest.");
        assert_eq!(res.source, ReplySource::Remote);

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("sys".to_string(), "headache".to_string())]);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_rules() {
        let resolver =
            ResponseResolver::offline().with_remote(ScriptedClient::new(Err(500)));
        let res = resolver.resolve("I have a headache").await;
        assert_eq!(res.text, headache());
        assert_eq!(res.source, ReplySource::Rule);
    }

    #[tokio::test]
    async fn test_remote_empty_reply_falls_back() {
        let resolver = ResponseResolver::offline().with_remote(ScriptedClient::new(Ok(None)));
        let res = resolver.resolve("purple elephants").await;
        assert_eq!(res.source, ReplySource::Generic);
    }

    #[tokio::test]
    async fn test_remote_whitespace_reply_falls_back() {
        let client = ScriptedClient::new(Ok(Some("  \n ".to_string())));
        let resolver = ResponseResolver::offline().with_remote(client);
        let res = resolver.resolve("I have a headache").await;
        assert_eq!(res.text, headache());
        assert_eq!(res.source, ReplySource::Rule);
    }

    #[tokio::test]
    async fn test_http_500_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = OpenAiCompletionClient::new("key", server.uri());
        let resolver = ResponseResolver::offline().with_remote(Arc::new(client));
        let res = resolver.resolve("I have a headache").await;
        assert_eq!(res.text, headache());
    }

    #[tokio::test]
    async fn test_http_missing_field_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAiCompletionClient::new("key", server.uri());
        let resolver = ResponseResolver::offline().with_remote(Arc::new(client));
        let res = resolver.resolve("I have a headache").await;
        assert_eq!(res.text, headache());
    }

    #[tokio::test]
    async fn test_unreachable_remote_falls_back() {
        let client = OpenAiCompletionClient::new("key", "http://127.0.0.1:9");
        let resolver = ResponseResolver::offline().with_remote(Arc::new(client));
        let res = resolver.resolve("can't sleep").await;
        assert_eq!(res.source, ReplySource::Rule);
    }

    #[test]
    fn test_from_config_without_key_is_offline() {
        let resolver = ResponseResolver::from_config(&AssistantConfig::default());
        assert!(!resolver.has_remote());

        let config = AssistantConfig {
            api_key: "   ".to_string(),
            ..AssistantConfig::default()
        };
        assert!(!ResponseResolver::from_config(&config).has_remote());
    }

    #[test]
    fn test_from_config_with_key_is_remote() {
        let config = AssistantConfig {
            api_key: "sk-live".to_string(),
            ..AssistantConfig::default()
        };
        assert!(ResponseResolver::from_config(&config).has_remote());
    }
}
