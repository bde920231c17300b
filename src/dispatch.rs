//! Notification dispatch through the relay.
//!
//! [`Dispatcher`] validates input, encrypts the caller's credential, POSTs
//! the wire request to `<endpoint>/sendNotification`, and folds whatever
//! comes back into a [`DispatchResult`]. Every failure after validation is
//! reported in-band (`success: false` plus an error string); nothing is
//! raised past this boundary.
//!
//! Batches are pre-validated as a whole, then sent strictly one item at a
//! time in input order. A failed item does not stop later items.

use std::sync::Arc;

use reqwest::Client;

use crate::codec::{self, CodecError, Credential};
use crate::config::Config;
use crate::constants::SEND_PATH;
use crate::types::{BatchItem, DispatchResult, NotificationData, SendRequest, SendResponse};
use crate::validation::{self, BatchValidationError};

/// Why a single dispatch failed. `Display` is the in-band error string.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Token failed validation.
    #[error("Invalid FCM token")]
    InvalidToken,
    /// Title or body failed validation.
    #[error("Invalid notification content")]
    InvalidContent,
    /// The credential could not be encrypted.
    #[error("Encryption failed: {0}")]
    Encryption(#[from] CodecError),
    /// The notification data could not be encoded.
    #[error("Invalid notification data: {0}")]
    Data(String),
    /// Connection, timeout, or body read failure.
    #[error("{0}")]
    Transport(String),
    /// The relay answered with a non-2xx status.
    #[error("{}", rejected_message(.status, .message))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, if any.
        message: Option<String>,
    },
    /// A 2xx response whose body is not the expected JSON.
    #[error("Invalid response body: {0}")]
    Protocol(String),
}

impl From<DispatchError> for DispatchResult {
    fn from(err: DispatchError) -> Self {
        DispatchResult::failure(err.to_string())
    }
}

/// Sends notifications to the relay with a shared, pooled HTTP client.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    config: Arc<Config>,
}

impl Dispatcher {
    /// Creates a dispatcher. The caller should share it (or its client)
    /// across calls for connection pooling.
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    /// The configuration this dispatcher sends with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Dispatch one notification. Never fails; see [`DispatchResult`].
    pub async fn send_one(
        &self,
        credential: &Credential,
        token: &str,
        title: &str,
        body: &str,
        data: Option<&NotificationData>,
    ) -> DispatchResult {
        match self.try_send(credential, token, title, body, data).await {
            Ok(result) => {
                if result.success {
                    log::info!(
                        "[Dispatch] Sent to {} (message_id={:?})",
                        token_prefix(token),
                        result.message_id
                    );
                } else {
                    log::warn!(
                        "[Dispatch] Relay reported failure for {}: {:?}",
                        token_prefix(token),
                        result.error
                    );
                }
                result
            }
            Err(err) => {
                log::warn!("[Dispatch] Failed for {}: {err}", token_prefix(token));
                err.into()
            }
        }
    }

    /// Dispatch a batch, one item at a time.
    ///
    /// Every item is validated before anything is sent; the first invalid
    /// item fails the whole call. Otherwise returns one result per item, in
    /// input order. `common_data` is attached to every item.
    pub async fn send_batch(
        &self,
        credential: &Credential,
        items: &[BatchItem],
        common_data: Option<&NotificationData>,
    ) -> Result<Vec<DispatchResult>, BatchValidationError> {
        if let Err(err) = validation::validate_batch(items) {
            log::warn!("[Dispatch] Rejected batch of {}: {err}", items.len());
            return Err(err);
        }

        log::info!("[Dispatch] Sending batch of {} notifications", items.len());
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let result = self
                .send_one(credential, &item.token, &item.title, &item.body, common_data)
                .await;
            results.push(result);
        }

        let delivered = results.iter().filter(|r| r.success).count();
        log::info!(
            "[Dispatch] Batch complete: {delivered}/{} delivered",
            results.len()
        );
        Ok(results)
    }

    async fn try_send(
        &self,
        credential: &Credential,
        token: &str,
        title: &str,
        body: &str,
        data: Option<&NotificationData>,
    ) -> Result<DispatchResult, DispatchError> {
        if !validation::validate_token(token) {
            return Err(DispatchError::InvalidToken);
        }
        if !validation::validate_content(title, body) {
            return Err(DispatchError::InvalidContent);
        }

        let firebase_config =
            codec::encrypt_with(credential, &self.config.secret_key, self.config.iv_mode)?;
        let data = data
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DispatchError::Data(e.to_string()))?;

        let request = SendRequest {
            firebase_config,
            token,
            title,
            body,
            data,
        };

        let url = self.config.url_for(SEND_PATH);
        log::debug!("[Dispatch] POST {url}");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(describe_transport_error(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DispatchError::Transport(describe_transport_error(&e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<SendResponse>(&text)
                .ok()
                .and_then(|r| r.error);
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SendResponse =
            serde_json::from_str(&text).map_err(|e| DispatchError::Protocol(e.to_string()))?;
        Ok(parsed.into())
    }
}

/// Describe a reqwest failure for an in-band error string.
pub(crate) fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        format!("Connection failed: {err}")
    } else {
        format!("Network error: {err}")
    }
}

fn rejected_message(status: &u16, message: &Option<String>) -> String {
    message.clone().unwrap_or_else(|| format!("HTTP {status}"))
}

/// First eight characters of a token, for logs.
fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}
