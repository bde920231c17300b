//! Pushrelay CLI - send notifications through the relay from a terminal.
//!
//! This is the binary entry point. See the `pushrelay` library for the
//! core functionality.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use pushrelay::{codec, BatchItem, Config, Credential, NotificationData, NotificationService};
use serde::Serialize;
use serde_json::Value;

/// Global allocator. mimalloc outperforms the system allocator for
/// short-lived async workloads.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "pushrelay")]
#[command(version)]
#[command(about = "Send push notifications through a relay with encrypted credentials")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one notification
    Send {
        /// Target device token
        #[arg(long)]
        token: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// Extra data as key=value (repeatable)
        #[arg(long = "data", value_parser = parse_key_val)]
        data: Vec<(String, String)>,
        /// Credential JSON file (defaults to config / PUSHRELAY_CREDENTIAL_FILE)
        #[arg(long)]
        credential: Option<PathBuf>,
    },
    /// Send every notification in a JSON array of {token, title, body}
    Batch {
        #[arg(long)]
        file: PathBuf,
        /// Data attached to every item, as key=value (repeatable)
        #[arg(long = "data", value_parser = parse_key_val)]
        data: Vec<(String, String)>,
        #[arg(long)]
        credential: Option<PathBuf>,
    },
    /// Check relay health
    Health,
    /// Validate a token and/or notification content without sending
    Validate {
        #[arg(long)]
        token: Option<String>,
        #[arg(long, requires = "body")]
        title: Option<String>,
        #[arg(long, requires = "title")]
        body: Option<String>,
    },
    /// Encrypt a credential file and print the payload
    Encrypt {
        #[arg(long)]
        credential: Option<PathBuf>,
    },
    /// Decrypt a payload and print the credential
    Decrypt {
        ciphertext: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn to_data(pairs: Vec<(String, String)>) -> Option<NotificationData> {
    if pairs.is_empty() {
        return None;
    }
    Some(pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
}

fn load_credential(explicit: Option<&Path>, config: &Config) -> Result<Credential> {
    let path = explicit
        .or(config.credential_path.as_deref())
        .context("No credential file given (use --credential or PUSHRELAY_CREDENTIAL_FILE)")?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credential file {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Credential file {} must hold a JSON object", path.display()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load()?;

    match cli.command {
        Commands::Send {
            token,
            title,
            body,
            data,
            credential,
        } => {
            let credential = load_credential(credential.as_deref(), &config)?;
            let service = NotificationService::new(config)?;
            let result = service
                .send_notification(&credential, &token, &title, &body, to_data(data).as_ref())
                .await;
            print_json(&result)?;
            Ok(exit_code(result.success))
        }
        Commands::Batch {
            file,
            data,
            credential,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read batch file {}", file.display()))?;
            let items: Vec<BatchItem> = serde_json::from_str(&content)
                .with_context(|| format!("Invalid batch file {}", file.display()))?;
            let credential = load_credential(credential.as_deref(), &config)?;
            let service = NotificationService::new(config)?;
            let results = service
                .send_batch_notifications(&credential, &items, to_data(data).as_ref())
                .await?;
            print_json(&results)?;
            Ok(exit_code(results.iter().all(|r| r.success)))
        }
        Commands::Health => {
            let service = NotificationService::new(config)?;
            let health = service.check_service_health().await;
            print_json(&health)?;
            Ok(exit_code(health.success))
        }
        Commands::Validate { token, title, body } => {
            let mut report = serde_json::Map::new();
            if let Some(token) = token {
                report.insert(
                    "token".to_string(),
                    Value::Bool(pushrelay::validation::validate_token(&token)),
                );
            }
            if let (Some(title), Some(body)) = (title, body) {
                report.insert(
                    "content".to_string(),
                    Value::Bool(pushrelay::validation::validate_content(&title, &body)),
                );
            }
            anyhow::ensure!(
                !report.is_empty(),
                "Nothing to validate (pass --token or --title/--body)"
            );
            let ok = report.values().all(|v| v == &Value::Bool(true));
            print_json(&report)?;
            Ok(exit_code(ok))
        }
        Commands::Encrypt { credential } => {
            let credential = load_credential(credential.as_deref(), &config)?;
            let payload = codec::encrypt_with(&credential, &config.secret_key, config.iv_mode)?;
            println!("{payload}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Decrypt { ciphertext } => {
            let credential = codec::decrypt_with(&ciphertext, &config.secret_key, config.iv_mode)?;
            print_json(&credential)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout stays machine-readable
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    run(cli).await
}
