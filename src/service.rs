//! Caller-facing notification service.
//!
//! [`NotificationService`] bundles the fixed relay configuration, a pooled
//! HTTP client, and an optional push SDK collaborator. Build it once at
//! startup and clone the handle into every call site; clones share the
//! same client and configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;

use crate::codec::Credential;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::health;
use crate::messaging::{MessagingError, PushMessaging, RemoteMessage, TokenRefreshCallback};
use crate::types::{BatchItem, DispatchResult, HealthResult, NotificationData};
use crate::validation::{self, BatchValidationError};

/// Shared handle to the relay client.
#[derive(Debug, Clone)]
pub struct NotificationService {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    dispatcher: Dispatcher,
    messaging: Option<Arc<dyn PushMessaging>>,
}

impl NotificationService {
    /// Validate `config` and build the service with a fresh HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    /// Build the service around an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        log::debug!("[Service] Relay endpoint {}", config.endpoint);
        Self {
            inner: Arc::new(Inner {
                dispatcher: Dispatcher::new(client, Arc::new(config)),
                messaging: None,
            }),
        }
    }

    /// Attach the push SDK collaborator.
    ///
    /// Call during startup, before cloning the handle out; existing clones
    /// keep the previous collaborator.
    pub fn with_messaging(self, messaging: Arc<dyn PushMessaging>) -> Self {
        Self {
            inner: Arc::new(Inner {
                dispatcher: self.inner.dispatcher.clone(),
                messaging: Some(messaging),
            }),
        }
    }

    /// The relay configuration.
    pub fn config(&self) -> &Config {
        self.inner.dispatcher.config()
    }

    fn messaging(&self) -> Result<&Arc<dyn PushMessaging>, MessagingError> {
        self.inner.messaging.as_ref().ok_or(MessagingError::NotAttached)
    }

    /// Request permission, then fetch the device token.
    ///
    /// Returns `Ok(None)` when permission is denied or the SDK has no token.
    pub async fn get_device_token(&self) -> Result<Option<String>, MessagingError> {
        let messaging = self.messaging()?;
        if !messaging.request_permissions().await? {
            log::warn!("[Service] Notification permission denied; no device token");
            return Ok(None);
        }
        messaging.get_token().await
    }

    /// Ask the SDK for notification permission.
    pub async fn request_permissions(&self) -> Result<bool, MessagingError> {
        self.messaging()?.request_permissions().await
    }

    /// Send one notification through the relay.
    pub async fn send_notification(
        &self,
        credential: &Credential,
        token: &str,
        title: &str,
        body: &str,
        data: Option<&NotificationData>,
    ) -> DispatchResult {
        self.inner
            .dispatcher
            .send_one(credential, token, title, body, data)
            .await
    }

    /// Send a batch sequentially. Fails before sending if any item is invalid.
    pub async fn send_batch_notifications(
        &self,
        credential: &Credential,
        items: &[BatchItem],
        common_data: Option<&NotificationData>,
    ) -> Result<Vec<DispatchResult>, BatchValidationError> {
        self.inner
            .dispatcher
            .send_batch(credential, items, common_data)
            .await
    }

    /// Probe the relay's health endpoint.
    pub async fn check_service_health(&self) -> HealthResult {
        let dispatcher = &self.inner.dispatcher;
        health::check_health(dispatcher.client(), dispatcher.config()).await
    }

    /// See [`validation::validate_token`].
    pub fn validate_fcm_token(&self, token: &str) -> bool {
        validation::validate_token(token)
    }

    /// See [`validation::validate_content`].
    pub fn validate_notification(&self, title: &str, body: &str) -> bool {
        validation::validate_content(title, body)
    }

    /// Subscribe this device to a topic.
    pub async fn subscribe_to_topic(&self, topic: &str) -> Result<(), MessagingError> {
        self.messaging()?.subscribe_to_topic(topic).await?;
        log::info!("[Service] Subscribed to topic {topic}");
        Ok(())
    }

    /// Unsubscribe this device from a topic.
    pub async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), MessagingError> {
        self.messaging()?.unsubscribe_from_topic(topic).await?;
        log::info!("[Service] Unsubscribed from topic {topic}");
        Ok(())
    }

    /// Register a callback for device token rotation.
    pub fn on_token_refresh(&self, callback: TokenRefreshCallback) -> Result<(), MessagingError> {
        self.messaging()?.on_token_refresh(callback);
        Ok(())
    }

    /// The message that launched the app, if any.
    pub async fn initial_message(&self) -> Result<Option<RemoteMessage>, MessagingError> {
        self.messaging()?.get_initial_message().await
    }

    /// Subscribe to messages received in the foreground.
    pub fn foreground_messages(
        &self,
    ) -> Result<broadcast::Receiver<RemoteMessage>, MessagingError> {
        Ok(self.messaging()?.foreground_messages())
    }
}
