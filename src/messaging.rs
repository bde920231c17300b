//! Push-messaging SDK collaborator.
//!
//! The platform SDK that issues device tokens, prompts for permission,
//! manages topic subscriptions, and delivers inbound messages lives outside
//! this crate. [`PushMessaging`] is the narrow surface the service facade
//! consumes; an application plugs in its own implementation.
//!
//! # Usage
//!
//! ```ignore
//! let service = NotificationService::new(config)?
//!     .with_messaging(Arc::new(MySdkBridge::new()));
//!
//! if let Some(token) = service.get_device_token().await? {
//!     service.subscribe_to_topic("news").await?;
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Callback invoked with the new token whenever the SDK rotates it.
pub type TokenRefreshCallback = Box<dyn Fn(String) + Send + Sync>;

/// A message delivered to this device by the push service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMessage {
    /// Push-service message identifier.
    pub message_id: Option<String>,
    /// Notification title, if the message carried one.
    pub title: Option<String>,
    /// Notification body, if the message carried one.
    pub body: Option<String>,
    /// Data payload.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Errors from the messaging collaborator.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// No collaborator was attached to the service.
    #[error("no push messaging backend attached")]
    NotAttached,
    /// The user or platform denied notification permission.
    #[error("notification permission denied")]
    PermissionDenied,
    /// The SDK reported a failure.
    #[error("push messaging error: {0}")]
    Sdk(String),
}

/// The platform push SDK as seen by the service facade.
#[async_trait]
pub trait PushMessaging: Send + Sync {
    /// Ask for permission to show notifications. Returns `true` if granted.
    async fn request_permissions(&self) -> Result<bool, MessagingError>;

    /// Current device token, if the SDK has one.
    async fn get_token(&self) -> Result<Option<String>, MessagingError>;

    /// Register a callback for token rotation.
    fn on_token_refresh(&self, callback: TokenRefreshCallback);

    /// Subscribe this device to a topic.
    async fn subscribe_to_topic(&self, topic: &str) -> Result<(), MessagingError>;

    /// Unsubscribe this device from a topic.
    async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), MessagingError>;

    /// The message that launched the app, if any.
    async fn get_initial_message(&self) -> Result<Option<RemoteMessage>, MessagingError>;

    /// Stream of messages received while the app is in the foreground.
    fn foreground_messages(&self) -> broadcast::Receiver<RemoteMessage>;
}

impl std::fmt::Debug for dyn PushMessaging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PushMessaging")
    }
}
