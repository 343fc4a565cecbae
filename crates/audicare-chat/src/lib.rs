//! Conversational core for AudiCare.
//!
//! Holds the per-session transcript, the keyword rule table, the response
//! resolver with its optional remote completion client, and the speech and
//! voice bridges the talk session drives.

pub mod completion;
pub mod error;
pub mod resolver;
pub mod rules;
pub mod session;
pub mod speech;
pub mod transcript;
pub mod types;
pub mod voice;

pub use completion::{CompletionClient, OpenAiCompletionClient};
pub use error::ChatError;
pub use resolver::{Resolution, ReplySource, ResponseResolver};
pub use rules::{generic_reply, Rule, RuleTable, GREETING};
pub use session::ChatSession;
pub use speech::{CommandSpeechEngine, SilentSpeechEngine, SpeechBridge, SpeechEngine, SpeechToggle};
pub use transcript::{Transcript, TranscriptObserver};
pub use types::{Message, MessageId, Role};
pub use voice::{
    CommandVoiceEngine, UnavailableVoiceEngine, VoiceEngine, VoiceEvent, VoiceInput, VoiceUpdate,
};
