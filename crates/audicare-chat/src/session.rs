//! Chat session: wires the transcript, resolver and speech output together.
//!
//! One session backs one conversation screen. It owns the composer draft and
//! turns each submitted utterance into a user message followed by an
//! assistant reply.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use audicare_core::config::AudiCareConfig;

use crate::error::ChatError;
use crate::resolver::ResponseResolver;
use crate::rules::GREETING;
use crate::speech::{SpeechBridge, SpeechToggle};
use crate::transcript::{Transcript, TranscriptObserver};
use crate::types::{Message, MessageId, Role};

/// Pause before an offline reply, so it reads like the assistant is typing.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(700);

/// A single conversation.
pub struct ChatSession {
    id: Uuid,
    transcript: Arc<Transcript>,
    resolver: ResponseResolver,
    speech: Option<SpeechBridge>,
    auto_speak: bool,
    reply_delay: Duration,
    draft: Mutex<String>,
}

impl ChatSession {
    /// Create a session whose transcript starts with the greeting.
    pub fn new(resolver: ResponseResolver) -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Arc::new(Transcript::with_greeting(GREETING)),
            resolver,
            speech: None,
            auto_speak: false,
            reply_delay: DEFAULT_REPLY_DELAY,
            draft: Mutex::new(String::new()),
        }
    }

    /// Build a session from application configuration.
    pub fn from_config(config: &AudiCareConfig) -> Self {
        let mut session = Self::new(ResponseResolver::from_config(&config.assistant))
            .with_reply_delay(Duration::from_millis(config.assistant.reply_delay_ms));
        if config.speech.enabled {
            session = session.with_speech(
                SpeechBridge::from_config(&config.speech),
                config.assistant.auto_speak,
            );
        }
        tracing::debug!(session_id = %session.id, "Chat session created");
        session
    }

    pub fn with_speech(mut self, speech: SpeechBridge, auto_speak: bool) -> Self {
        self.speech = Some(speech);
        self.auto_speak = auto_speak;
        self
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Arc<Transcript> {
        &self.transcript
    }

    pub fn resolver(&self) -> &ResponseResolver {
        &self.resolver
    }

    pub fn subscribe(&self, observer: Arc<dyn TranscriptObserver>) {
        self.transcript.subscribe(observer);
    }

    /// Submit one utterance and return the assistant's reply.
    ///
    /// Overlapping calls are not serialized: each appends its user message
    /// immediately and its reply whenever resolution finishes.
    pub async fn submit(&self, input: &str) -> Result<Message, ChatError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.transcript.append(Role::User, text);
        tracing::info!(session_id = %self.id, chars = text.chars().count(), "User message");

        if !self.resolver.has_remote() && !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        let resolution = self.resolver.resolve(text).await;
        let reply = self
            .transcript
            .append(Role::Assistant, resolution.text)
            .ok_or(ChatError::EmptyMessage)?;
        tracing::info!(
            session_id = %self.id,
            source = ?resolution.source,
            message_id = %reply.id(),
            "Assistant reply"
        );

        if self.auto_speak {
            if let Some(speech) = &self.speech {
                speech.toggle(reply.text());
            }
        }
        Ok(reply)
    }

    /// Current composer text.
    pub fn draft(&self) -> String {
        self.lock_draft().clone()
    }

    /// Replace the composer text, e.g. with a voice result.
    pub fn set_draft(&self, text: impl Into<String>) {
        *self.lock_draft() = text.into();
    }

    /// Submit the composer text, clearing it.
    pub async fn send_draft(&self) -> Result<Message, ChatError> {
        let draft = std::mem::take(&mut *self.lock_draft());
        self.submit(&draft).await
    }

    /// Speaker button on a message. `None` when the message does not exist
    /// or speech output is off.
    pub fn toggle_speech(&self, id: MessageId) -> Option<SpeechToggle> {
        let speech = self.speech.as_ref()?;
        let message = self.transcript.get(id)?;
        Some(speech.toggle(message.text()))
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.as_ref().is_some_and(SpeechBridge::is_speaking)
    }

    fn lock_draft(&self) -> std::sync::MutexGuard<'_, String> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("transcript", &self.transcript)
            .field("resolver", &self.resolver)
            .field("auto_speak", &self.auto_speak)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
