//! AudiCare application binary - composition root.
//!
//! Ties the AudiCare crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Dispatch to the welcome screen, account commands, the talk loop,
//!    the label scanner or the OCR proxy server

mod cli;
mod talk;
mod welcome;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use audicare_api::routes;
use audicare_api::state::AppState;
use audicare_core::config::AudiCareConfig;
use audicare_ocr::LabelReader;
use audicare_storage::{AccountService, Database, SqliteKvStore};

use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. A local .env may carry the completion key.
    let dotenv = std::env::current_dir()
        .ok()
        .and_then(|dir| cli::load_dotenv(&dir));
    let config_file = args.resolve_config_path();
    let mut config = AudiCareConfig::load_or_default(&config_file);
    config.apply_env();
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
    tracing::debug!(path = %config_file.display(), "Configuration resolved");

    match args.command() {
        Command::Welcome => print!("{}", welcome::render()),
        Command::Register { username, password } => {
            let accounts = open_accounts(&config)?;
            let (username, password) = credentials(username, password)?;
            match accounts.register(&username, &password) {
                Ok(notice) => println!("{}", notice),
                Err(e) => println!("Error: {}", e.notice()),
            }
        }
        Command::Login { username, password } => {
            let accounts = open_accounts(&config)?;
            let (username, password) = credentials(username, password)?;
            match accounts.login(&username, &password) {
                Ok(user) => println!("Welcome back, {}!", user),
                Err(e) => println!("Error: {}", e.notice()),
            }
        }
        Command::Talk { mute } => talk::run(&config, mute).await?,
        Command::ScanLabel { image, proxy_url } => {
            let reader = match proxy_url {
                Some(url) => LabelReader::new(url),
                None => LabelReader::from_config(&config.ocr),
            };
            scan_label(&reader, &image).await;
        }
        Command::ServeOcr { port, bind } => {
            let mut ocr = config.ocr.clone();
            ocr.port = cli::resolve_port(port, ocr.port);
            if let Some(bind) = bind {
                ocr.bind_addr = bind;
            }
            tracing::info!("Starting AudiCare OCR proxy v{}", env!("CARGO_PKG_VERSION"));
            let state = AppState::from_env(&ocr);
            routes::start_server(&ocr, state).await?;
        }
        Command::InitConfig { force } => {
            if config_file.exists() && !force {
                println!(
                    "{} already exists (use --force to overwrite)",
                    config_file.display()
                );
            } else {
                AudiCareConfig::default().save(&config_file)?;
                println!("Wrote {}", config_file.display());
            }
        }
    }

    Ok(())
}

fn open_accounts(config: &AudiCareConfig) -> Result<AccountService, Box<dyn std::error::Error>> {
    let data_dir = config.general.resolved_data_dir();
    let db = Database::open_in_dir(&data_dir)?;
    tracing::debug!(path = %data_dir.display(), "Account store opened");
    Ok(AccountService::new(Arc::new(SqliteKvStore::new(Arc::new(db)))))
}

/// Fill in missing credentials from stdin.
fn credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), std::io::Error> {
    let username = match username {
        Some(u) => u,
        None => read_field("Username")?,
    };
    let password = match password {
        Some(p) => p,
        None => read_field("Password")?,
    };
    Ok((username, password))
}

fn read_field(label: &str) -> Result<String, std::io::Error> {
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn scan_label(reader: &LabelReader, image: &Path) {
    match reader.read_label_file(image).await {
        Ok(text) if text.trim().is_empty() => println!("No text found on the label."),
        Ok(text) => println!("{}", text),
        Err(e) => {
            tracing::warn!(error = %e, url = reader.proxy_url(), "Label scan failed");
            println!("Error: could not read the label ({})", e);
        }
    }
}
