//! Wire shapes exchanged with the relay and the results handed to callers.
//!
//! The relay speaks camelCase JSON. Wire structs mirror it exactly; result
//! structs are what callers see, with every optional field normalized to
//! `None` when the relay leaves it out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extra key/value payload attached to a notification.
pub type NotificationData = serde_json::Map<String, Value>;

/// Body of `POST /sendNotification`.
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    /// Base64 ciphertext of the caller's credential.
    #[serde(rename = "firebaseConfig")]
    pub firebase_config: String,
    /// Target device token.
    pub token: &'a str,
    /// Notification title.
    pub title: &'a str,
    /// Notification body.
    pub body: &'a str,
    /// JSON-encoded [`NotificationData`], omitted when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Body returned by `POST /sendNotification`, for any status.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendResponse {
    /// Whether the relay delivered the message.
    pub success: bool,
    /// Delivery details on success.
    pub data: Option<SendResponseData>,
    /// Relay-side error description.
    pub error: Option<String>,
    /// Relay timestamp.
    pub timestamp: Option<String>,
}

/// Nested `data` object of [`SendResponse`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendResponseData {
    /// Identifier assigned by the push service.
    pub message_id: Option<String>,
    /// Relay-reported processing time.
    pub total_duration: Option<String>,
}

/// Outcome of a single dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    /// Whether the notification was accepted for delivery.
    pub success: bool,
    /// Message identifier, meaningful when `success` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Relay-reported duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Failure description, meaningful when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Relay timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl DispatchResult {
    /// A failed result carrying only an error description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

impl From<SendResponse> for DispatchResult {
    fn from(response: SendResponse) -> Self {
        let (message_id, duration) = response
            .data
            .map(|d| (d.message_id, d.total_duration))
            .unwrap_or_default();
        Self {
            success: response.success,
            message_id,
            duration,
            error: response.error,
            timestamp: response.timestamp,
        }
    }
}

/// Outcome of a health probe. Same shape on the wire and for callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthResult {
    /// Whether the relay reports itself healthy.
    pub success: bool,
    /// Human-readable status or failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Diagnostic details from the relay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Relay timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HealthResult {
    /// A failed result carrying only a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// One notification in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Target device token.
    pub token: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}
