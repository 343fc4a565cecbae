//! Voice capture bridge.
//!
//! A [`VoiceEngine`] reports recognition progress as [`VoiceEvent`]s on a
//! channel. [`VoiceInput`] tracks whether the composer is listening and turns
//! those events into updates the talk loop can act on.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use audicare_core::config::VoiceConfig;

use crate::error::ChatError;

/// Shown when the recognizer cannot be started.
pub const START_FAILED_NOTICE: &str = "Failed to start voice recognition. Please check permissions.";

/// Shown when recognition ends with an error.
pub const RECOGNITION_FAILED_NOTICE: &str = "Failed to recognize speech. Please try again.";

/// Progress reported by a voice engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    Started,
    Ended,
    Result(String),
    Error(String),
}

/// A speech recognizer.
#[async_trait]
pub trait VoiceEngine: Send + Sync {
    /// Begin recognition, reporting progress on `events`.
    async fn start(
        &self,
        language: &str,
        events: mpsc::UnboundedSender<VoiceEvent>,
    ) -> Result<(), ChatError>;

    /// Abandon recognition in progress.
    fn stop(&self) -> Result<(), ChatError>;
}

/// Engine for platforms without speech recognition.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableVoiceEngine;

#[async_trait]
impl VoiceEngine for UnavailableVoiceEngine {
    async fn start(
        &self,
        _language: &str,
        _events: mpsc::UnboundedSender<VoiceEvent>,
    ) -> Result<(), ChatError> {
        Err(ChatError::VoiceError(
            "speech recognition is not available".to_string(),
        ))
    }

    fn stop(&self) -> Result<(), ChatError> {
        Ok(())
    }
}

/// Engine that runs an external speech-to-text program and takes its
/// standard output as the recognized text.
#[derive(Debug)]
pub struct CommandVoiceEngine {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<AbortHandle>>,
}

impl CommandVoiceEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: Mutex::new(None),
        }
    }

    /// Parse a whitespace-separated command line. Returns `None` when blank.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl VoiceEngine for CommandVoiceEngine {
    async fn start(
        &self,
        language: &str,
        events: mpsc::UnboundedSender<VoiceEvent>,
    ) -> Result<(), ChatError> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{language}", language))
            .collect();
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChatError::VoiceError(format!("{}: {}", self.program, e)))?;

        let program = self.program.clone();
        let task = tokio::spawn(async move {
            // Receiver gone means nobody is listening any more.
            let _ = events.send(VoiceEvent::Started);
            match child.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    let _ = events.send(VoiceEvent::Result(text));
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    tracing::warn!(%program, status = %output.status, %stderr, "Recognizer failed");
                    let _ = events.send(VoiceEvent::Error(format!("exited with {}", output.status)));
                }
                Err(e) => {
                    let _ = events.send(VoiceEvent::Error(e.to_string()));
                }
            }
            let _ = events.send(VoiceEvent::Ended);
        });

        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), ChatError> {
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match current {
            Some(task) => {
                task.abort();
                Ok(())
            }
            None => Err(ChatError::VoiceError("recognizer is not running".to_string())),
        }
    }
}

/// What the talk loop should do after a voice transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceUpdate {
    /// The microphone indicator should show listening.
    Listening,
    /// Listening has ended without text.
    Idle,
    /// Recognized text to place in the composer.
    Draft(String),
    /// A one-shot notice for the user.
    Alert(String),
}

/// Listening state for the composer's microphone control.
pub struct VoiceInput {
    engine: Arc<dyn VoiceEngine>,
    language: String,
    listening: bool,
    events_tx: mpsc::UnboundedSender<VoiceEvent>,
    events_rx: mpsc::UnboundedReceiver<VoiceEvent>,
}

impl VoiceInput {
    pub fn new(engine: Arc<dyn VoiceEngine>, language: impl Into<String>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            language: language.into(),
            listening: false,
            events_tx,
            events_rx,
        }
    }

    /// Input backed by the configured recognizer, or an unavailable one when
    /// no command is set.
    pub fn from_config(config: &VoiceConfig) -> Self {
        let engine: Arc<dyn VoiceEngine> = match CommandVoiceEngine::parse(&config.command) {
            Some(engine) => {
                tracing::info!(program = engine.program(), "Voice input enabled");
                Arc::new(engine)
            }
            None => Arc::new(UnavailableVoiceEngine),
        };
        Self::new(engine, config.language.clone())
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Start listening.
    pub async fn start(&mut self) -> VoiceUpdate {
        // Leftovers from an abandoned capture must not leak into this one.
        while self.events_rx.try_recv().is_ok() {}
        self.listening = true;
        match self
            .engine
            .start(&self.language, self.events_tx.clone())
            .await
        {
            Ok(()) => VoiceUpdate::Listening,
            Err(e) => {
                tracing::warn!(error = %e, "Voice recognition failed to start");
                self.listening = false;
                VoiceUpdate::Alert(START_FAILED_NOTICE.to_string())
            }
        }
    }

    /// Stop listening. A failed stop is logged and leaves the state as is.
    pub fn stop(&mut self) -> VoiceUpdate {
        match self.engine.stop() {
            Ok(()) => {
                self.listening = false;
                VoiceUpdate::Idle
            }
            Err(e) => {
                tracing::warn!(error = %e, "Voice stop failed");
                if self.listening {
                    VoiceUpdate::Listening
                } else {
                    VoiceUpdate::Idle
                }
            }
        }
    }

    /// Microphone button: stop when listening, start otherwise.
    pub async fn toggle(&mut self) -> VoiceUpdate {
        if self.listening {
            self.stop()
        } else {
            self.start().await
        }
    }

    /// Apply one engine event.
    pub fn handle_event(&mut self, event: VoiceEvent) -> VoiceUpdate {
        match event {
            VoiceEvent::Started => {
                self.listening = true;
                VoiceUpdate::Listening
            }
            VoiceEvent::Ended => {
                self.listening = false;
                VoiceUpdate::Idle
            }
            VoiceEvent::Result(text) => {
                self.listening = false;
                if text.trim().is_empty() {
                    VoiceUpdate::Idle
                } else {
                    VoiceUpdate::Draft(text)
                }
            }
            VoiceEvent::Error(reason) => {
                tracing::warn!(%reason, "Speech recognition error");
                self.listening = false;
                VoiceUpdate::Alert(RECOGNITION_FAILED_NOTICE.to_string())
            }
        }
    }

    /// Wait for the next engine event and apply it.
    pub async fn next_event(&mut self) -> Option<VoiceUpdate> {
        let event = self.events_rx.recv().await?;
        Some(self.handle_event(event))
    }
}

impl std::fmt::Debug for VoiceInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceInput")
            .field("language", &self.language)
            .field("listening", &self.listening)
            .finish()
    }
}
