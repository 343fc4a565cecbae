//! Error types for the conversational core.

/// Errors from the chat engine and its collaborators.
///
/// Completion failures never reach the transcript; the resolver absorbs
/// them. They exist so the client can report what went wrong to the log.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("completion request failed: {0}")]
    Completion(String),
    #[error("completion service returned status {0}")]
    CompletionStatus(u16),
    #[error("completion response is not valid JSON: {0}")]
    MalformedResponse(String),
    #[error("speech error: {0}")]
    SpeechError(String),
    #[error("voice error: {0}")]
    VoiceError(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ChatError::CompletionStatus(status.as_u16()),
            None => ChatError::Completion(err.to_string()),
        }
    }
}
