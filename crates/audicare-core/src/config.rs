use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AudiCareError, Result};

/// Environment variable carrying the remote completion credential.
pub const API_KEY_ENV: &str = "AUDICARE_API_KEY";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "AUDICARE_DATA_DIR";

/// Default system instruction sent ahead of every remote completion request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are AudiCare AI, a helpful health assistant. \
Provide helpful, general health information but always remind users to consult healthcare \
professionals for medical advice. Be empathetic and supportive.";

/// Top-level configuration for AudiCare.
///
/// Loaded from `~/.audicare/config.toml` by default. Every section falls
/// back to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudiCareConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
}

impl AudiCareConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AudiCareConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the configuration as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AudiCareError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// Blank values are ignored so an exported-but-empty variable does not
    /// wipe a key set in the file.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.assistant.api_key = key;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.general.data_dir = dir;
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the account database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.audicare/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneralConfig {
    /// The data directory with a leading `~` expanded to the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// Remote completion and reply behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Bearer credential for the completion service. Empty means offline.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub system_prompt: String,
    /// Pause before an offline (rule table) reply is appended.
    pub reply_delay_ms: u64,
    /// Speak every assistant reply as it arrives.
    pub auto_speak: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 150,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            reply_delay_ms: 700,
            auto_speak: true,
        }
    }
}

impl AssistantConfig {
    /// The configured credential, or `None` when blank.
    pub fn credential(&self) -> Option<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// BCP-47 language tag passed to the synthesizer.
    pub language: String,
    /// External TTS program (e.g. `espeak`, `say`). Empty means silent.
    pub command: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en-US".to_string(),
            command: String::new(),
        }
    }
}

/// Voice capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// BCP-47 language tag passed to the recognizer.
    pub language: String,
    /// External speech-to-text program; its stdout is the recognized text.
    /// Empty means voice input is unavailable.
    pub command: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            command: String::new(),
        }
    }
}

/// Medicine label OCR settings, shared by the proxy server and its client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Proxy endpoint the app posts `{imageBase64}` to.
    pub proxy_url: String,
    /// Upstream vision endpoint the proxy forwards to.
    pub vision_api_url: String,
    /// Address the proxy binds to.
    pub bind_addr: String,
    pub port: u16,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            proxy_url: "http://127.0.0.1:8787/read-medicine-label".to_string(),
            vision_api_url: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            bind_addr: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}
