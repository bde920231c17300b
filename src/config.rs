//! Configuration loading.
//!
//! Reads `config.json` from the pushrelay config directory and applies
//! environment overrides. The shared secret is never read from or written
//! to disk; it only comes from `PUSHRELAY_SECRET_KEY` (or is set in code).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::codec::IvMode;
use crate::constants::{DEFAULT_ENDPOINT, HTTP_REQUEST_TIMEOUT};

/// Configuration for the relay client.
#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Base URL of the relay service.
    pub endpoint: String,
    /// Shared secret used to encrypt credentials - NOT serialized.
    #[serde(skip)]
    pub secret_key: String,
    /// How the credential cipher picks its IV.
    pub iv_mode: IvMode,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Default credential document used by the CLI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            secret_key: String::new(),
            iv_mode: IvMode::Fixed,
            request_timeout_secs: HTTP_REQUEST_TIMEOUT.as_secs(),
            credential_path: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("secret_key", &"<redacted>")
            .field("iv_mode", &self.iv_mode)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("credential_path", &self.credential_path)
            .finish()
    }
}

impl Config {
    /// Build a config for an endpoint and secret, other fields defaulted.
    pub fn new(endpoint: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// Returns the configuration directory path.
    ///
    /// `PUSHRELAY_CONFIG_DIR` wins; otherwise the platform config directory
    /// (e.g. `~/.config/pushrelay` on Linux).
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = env::var("PUSHRELAY_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("pushrelay"))
    }

    /// Loads configuration from file, with environment variable overrides.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        let path = Self::config_dir()?.join("config.json");
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Reads a config file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(endpoint) = env::var("PUSHRELAY_ENDPOINT") {
            self.endpoint = endpoint;
        }

        if let Ok(secret) = env::var("PUSHRELAY_SECRET_KEY") {
            self.secret_key = secret;
        }

        if let Ok(mode) = env::var("PUSHRELAY_IV_MODE") {
            self.iv_mode = mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!("PUSHRELAY_IV_MODE: {e}"))?;
        }

        if let Ok(timeout) = env::var("PUSHRELAY_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.request_timeout_secs = secs;
            } else {
                log::warn!("Ignoring non-numeric PUSHRELAY_TIMEOUT_SECS={timeout}");
            }
        }

        if let Ok(path) = env::var("PUSHRELAY_CREDENTIAL_FILE") {
            self.credential_path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Check that the config can be used to dispatch.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.endpoint.trim().is_empty(), "Relay endpoint is not set");
        anyhow::ensure!(
            !self.secret_key.is_empty(),
            "Secret key is not set (export PUSHRELAY_SECRET_KEY)"
        );
        anyhow::ensure!(
            self.request_timeout_secs > 0,
            "Request timeout must be at least one second"
        );
        Ok(())
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Full URL for a relay path such as `/health`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }
}
