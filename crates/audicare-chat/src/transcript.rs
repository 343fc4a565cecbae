//! Append-only conversation transcript.
//!
//! A transcript belongs to one chat session. Messages are only ever added,
//! never edited or removed, and observers hear about each append before
//! `append` returns.

use std::sync::{Arc, Mutex, PoisonError};

use crate::types::{Message, MessageId, Role};

/// Receives every message appended to a transcript.
pub trait TranscriptObserver: Send + Sync {
    fn on_append(&self, message: &Message);
}

impl<F> TranscriptObserver for F
where
    F: Fn(&Message) + Send + Sync,
{
    fn on_append(&self, message: &Message) {
        self(message)
    }
}

struct Entries {
    messages: Vec<Message>,
    next_id: u64,
}

/// Ordered, append-only list of messages for one session.
pub struct Transcript {
    entries: Mutex<Entries>,
    observers: Mutex<Vec<Arc<dyn TranscriptObserver>>>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries {
                messages: Vec::new(),
                next_id: 1,
            }),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Create a transcript seeded with one assistant greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let transcript = Self::new();
        transcript.append(Role::Assistant, greeting);
        transcript
    }

    /// Register an observer for subsequent appends.
    pub fn subscribe(&self, observer: Arc<dyn TranscriptObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Append a message and return it.
    ///
    /// Empty or whitespace-only text is rejected and leaves the transcript
    /// unchanged.
    pub fn append(&self, role: Role, text: impl Into<String>) -> Option<Message> {
        let text = text.into();
        if text.trim().is_empty() {
            tracing::debug!(%role, "Ignoring empty message");
            return None;
        }

        let message = {
            // Entries are only pushed whole, so a poisoned lock still guards
            // a consistent list.
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            let id = MessageId::new(entries.next_id);
            entries.next_id += 1;
            let message = Message::new(id, role, text);
            entries.messages.push(message.clone());
            message
        };

        let observers: Vec<Arc<dyn TranscriptObserver>> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_append(&message);
        }

        Some(message)
    }

    /// Snapshot of all messages, oldest first.
    pub fn all(&self) -> Vec<Message> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .clone()
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<Message> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .last()
            .cloned()
    }

    /// Look up a message by id.
    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .iter()
            .find(|m| m.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript").field("len", &self.len()).finish()
    }
}
