//! CLI argument definitions for the AudiCare application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// AudiCare: a smart health companion for the terminal.
#[derive(Parser, Debug)]
#[command(name = "audicare", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory for the account database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the welcome screen.
    Welcome,
    /// Create a local account.
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Check a local account's credentials.
    Login {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Chat with the health assistant.
    Talk {
        /// Never speak replies aloud.
        #[arg(long)]
        mute: bool,
    },
    /// Read the text on a medicine label photo via the OCR proxy.
    ScanLabel {
        /// Image file to upload.
        image: PathBuf,
        /// Proxy endpoint, overriding `[ocr] proxy_url`.
        #[arg(long)]
        proxy_url: Option<String>,
    },
    /// Run the medicine label OCR proxy.
    ServeOcr {
        /// Listen port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
        /// Listen address.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write a default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl CliArgs {
    /// The subcommand to run; `welcome` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Welcome)
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > AUDICARE_CONFIG env var > ~/.audicare/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("AUDICARE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory path.
    ///
    /// Returns `None` if not overridden on the command line.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Returns `None` if not overridden on the command line.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Resolve the OCR proxy port.
///
/// Priority: --port flag > AUDICARE_PORT env var > config file value > 8787.
pub fn resolve_port(flag: Option<u16>, config_port: u16) -> u16 {
    if let Some(p) = flag {
        return p;
    }
    if let Ok(val) = std::env::var("AUDICARE_PORT") {
        if let Ok(p) = val.parse::<u16>() {
            return p;
        }
    }
    if config_port != 0 {
        return config_port;
    }
    8787
}

/// Load `dir/.env` into the process environment. Variables that are
/// already set keep their value. Returns the file that was read.
pub fn load_dotenv(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(".env");
    dotenvy::from_path(&path).ok().map(|()| path)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".audicare").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".audicare").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_welcome() {
        let args = CliArgs::try_parse_from(["audicare"]).unwrap();
        assert_eq!(args.command(), Command::Welcome);
    }

    #[test]
    fn test_register_flags() {
        let args =
            CliArgs::try_parse_from(["audicare", "register", "-u", "ann", "-p", "pw"]).unwrap();
        assert_eq!(
            args.command(),
            Command::Register {
                username: Some("ann".to_string()),
                password: Some("pw".to_string())
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["audicare", "talk", "--mute", "-c", "/tmp/a.toml"]).unwrap();
        assert_eq!(args.command(), Command::Talk { mute: true });
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/a.toml"));
    }

    #[test]
    fn test_scan_label_requires_image() {
        assert!(CliArgs::try_parse_from(["audicare", "scan-label"]).is_err());
        let args = CliArgs::try_parse_from(["audicare", "scan-label", "pill.jpg"]).unwrap();
        assert!(matches!(args.command(), Command::ScanLabel { image, proxy_url: None } if image == PathBuf::from("pill.jpg")));
    }

    #[test]
    fn test_port_flag_wins() {
        assert_eq!(resolve_port(Some(9000), 8787), 9000);
    }

    #[test]
    fn test_dotenv_supplies_completion_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "AUDICARE_API_KEY=sk-from-dotenv\n").unwrap();

        assert_eq!(load_dotenv(dir.path()), Some(dir.path().join(".env")));
        let mut config = audicare_core::AudiCareConfig::default();
        config.apply_env();
        assert_eq!(config.assistant.api_key, "sk-from-dotenv");
    }

    #[test]
    fn test_dotenv_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv(dir.path()), None);
    }

    #[test]
    fn test_data_dir_and_log_level_overrides() {
        let args =
            CliArgs::try_parse_from(["audicare", "-d", "/var/audicare", "-l", "debug"]).unwrap();
        assert_eq!(args.resolve_data_dir().as_deref(), Some("/var/audicare"));
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
    }
}
