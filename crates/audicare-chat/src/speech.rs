//! Text-to-speech bridge.
//!
//! The bridge owns the "currently speaking" flag the reply speaker buttons
//! read. Synthesis runs on a background task; the flag clears when that task
//! finishes, fails, or is stopped.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Notify;
use tokio::task::{AbortHandle, JoinHandle};

use audicare_core::config::SpeechConfig;

use crate::error::ChatError;

/// Placeholder replaced with the language tag in command arguments.
const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// A speech synthesizer.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Speak `text`, returning once playback has finished or was stopped.
    async fn speak(&self, text: &str, language: &str) -> Result<(), ChatError>;

    /// Interrupt any playback in progress.
    fn stop(&self);
}

/// Engine that produces no audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeechEngine;

#[async_trait]
impl SpeechEngine for SilentSpeechEngine {
    async fn speak(&self, text: &str, language: &str) -> Result<(), ChatError> {
        tracing::debug!(chars = text.chars().count(), language, "Silent speech");
        Ok(())
    }

    fn stop(&self) {}
}

/// Engine that runs an external text-to-speech program such as `espeak` or
/// `say`. The text is passed as the final argument.
#[derive(Debug)]
pub struct CommandSpeechEngine {
    program: String,
    args: Vec<String>,
    stop_signal: Notify,
}

impl CommandSpeechEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stop_signal: Notify::new(),
        }
    }

    /// Parse a whitespace-separated command line. Returns `None` when blank.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    /// Build from configuration; `None` when speech is disabled or no
    /// command is set.
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Self::parse(&config.command)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_args(&self, text: &str, language: &str) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(LANGUAGE_PLACEHOLDER, language))
            .collect();
        args.push(text.to_string());
        args
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeechEngine {
    async fn speak(&self, text: &str, language: &str) -> Result<(), ChatError> {
        let mut child = Command::new(&self.program)
            .args(self.build_args(text, language))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChatError::SpeechError(format!("{}: {}", self.program, e)))?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| ChatError::SpeechError(e.to_string()))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(ChatError::SpeechError(format!(
                        "{} exited with {}",
                        self.program, status
                    )))
                }
            }
            _ = self.stop_signal.notified() => {
                if let Err(e) = child.kill().await {
                    tracing::debug!(error = %e, "Speech process already gone");
                }
                Ok(())
            }
        }
    }

    fn stop(&self) {
        self.stop_signal.notify_waiters();
    }
}

/// Outcome of [`SpeechBridge::toggle`].
#[derive(Debug)]
pub enum SpeechToggle {
    /// Playback started; the handle resolves when it ends.
    Started(JoinHandle<()>),
    /// Playback was in progress and has been stopped.
    Stopped,
}

#[derive(Debug, Default)]
struct SpeechState {
    speaking: bool,
    generation: u64,
    current: Option<AbortHandle>,
}

/// Drives a [`SpeechEngine`] and tracks whether it is speaking.
#[derive(Clone)]
pub struct SpeechBridge {
    engine: Arc<dyn SpeechEngine>,
    language: String,
    state: Arc<Mutex<SpeechState>>,
}

impl SpeechBridge {
    pub fn new(engine: Arc<dyn SpeechEngine>, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
            state: Arc::new(Mutex::new(SpeechState::default())),
        }
    }

    /// Bridge for the configured engine, or the silent one when no command
    /// is set.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let engine: Arc<dyn SpeechEngine> = match CommandSpeechEngine::from_config(config) {
            Some(engine) => {
                tracing::info!(program = engine.program(), "Speech output enabled");
                Arc::new(engine)
            }
            None => Arc::new(SilentSpeechEngine),
        };
        Self::new(engine, config.language.clone())
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_speaking(&self) -> bool {
        self.lock().speaking
    }

    /// Stop if speaking, otherwise start speaking `text` in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn toggle(&self, text: &str) -> SpeechToggle {
        if self.is_speaking() {
            self.stop();
            return SpeechToggle::Stopped;
        }
        SpeechToggle::Started(self.speak(text))
    }

    /// Start speaking `text`, replacing any playback in progress.
    pub fn speak(&self, text: &str) -> JoinHandle<()> {
        let generation = {
            let mut state = self.lock();
            if let Some(previous) = state.current.take() {
                previous.abort();
            }
            state.generation += 1;
            state.speaking = true;
            state.generation
        };

        let engine = Arc::clone(&self.engine);
        let shared = Arc::clone(&self.state);
        let language = self.language.clone();
        let text = text.to_string();

        let handle = tokio::spawn(async move {
            if let Err(e) = engine.speak(&text, &language).await {
                tracing::warn!(error = %e, "Speech synthesis failed");
            }
            let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
            // Only the latest utterance may clear the flag.
            if state.generation == generation {
                state.speaking = false;
                state.current = None;
            }
        });

        let mut state = self.lock();
        if state.generation == generation && state.speaking {
            state.current = Some(handle.abort_handle());
        }
        handle
    }

    /// Stop playback and clear the speaking flag.
    pub fn stop(&self) {
        let current = {
            let mut state = self.lock();
            state.speaking = false;
            state.generation += 1;
            state.current.take()
        };
        self.engine.stop();
        if let Some(task) = current {
            task.abort();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SpeechState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SpeechBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechBridge")
            .field("language", &self.language)
            .field("speaking", &self.is_speaking())
            .finish()
    }
}
