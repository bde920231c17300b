//! Pushrelay - secure push notification dispatch through a relay service.
//!
//! Callers hand over a service credential, a device token, and notification
//! content. The credential is encrypted with a shared secret before it leaves
//! the process, then the relay performs the actual push.
//!
//! # Architecture
//!
//! - **Codec** - AES-256-CBC credential encryption
//! - **Validation** - token and content checks
//! - **Dispatch** - request building, HTTP, response normalization
//! - **Health** - relay status probe
//! - **Service** - the cloneable handle callers hold
//!
//! # Modules
//!
//! - [`codec`] - Credential encrypt/decrypt
//! - [`dispatch`] - Single and batch dispatch
//! - [`service`] - Caller-facing facade
//! - [`config`] - Configuration loading

pub mod codec;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod health;
pub mod messaging;
pub mod service;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use codec::{CodecError, Credential, IvMode};
pub use config::Config;
pub use dispatch::{DispatchError, Dispatcher};
pub use messaging::{MessagingError, PushMessaging, RemoteMessage};
pub use service::NotificationService;
pub use types::{BatchItem, DispatchResult, HealthResult, NotificationData};
pub use validation::{BatchValidationError, InvalidField};
