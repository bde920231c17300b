//! Application-wide constants for pushrelay.
//!
//! Centralizes the relay wire paths, validation bounds, and codec
//! parameters so they can be found in one place.
//!
//! # Categories
//!
//! - **Relay**: endpoint defaults and request paths
//! - **Timeouts**: HTTP request timeout
//! - **Validation**: token and notification content bounds
//! - **Codec**: key derivation parameters

use std::time::Duration;

// ============================================================================
// Relay
// ============================================================================

/// Endpoint used when neither the config file nor the environment sets one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Path appended to the endpoint for notification dispatch.
pub const SEND_PATH: &str = "/sendNotification";

/// Path appended to the endpoint for health probes.
pub const HEALTH_PATH: &str = "/health";

// ============================================================================
// Timeouts
// ============================================================================

/// HTTP client request timeout for relay calls.
///
/// Applies to the whole request including reading the body. A timed-out
/// dispatch is reported in-band like any other transport fault.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Validation
// ============================================================================

/// Device tokens must be strictly longer than this.
pub const TOKEN_MIN_EXCLUSIVE: usize = 50;

/// Device tokens must be strictly shorter than this.
pub const TOKEN_MAX_EXCLUSIVE: usize = 1000;

/// Maximum notification title length (inclusive).
pub const TITLE_MAX_LEN: usize = 100;

/// Maximum notification body length (inclusive).
pub const BODY_MAX_LEN: usize = 1000;

// ============================================================================
// Codec
// ============================================================================

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES block size, which is also the CBC IV length.
pub const IV_LEN: usize = 16;

/// Byte used to right-pad short secrets up to [`KEY_LEN`].
pub const KEY_FILLER: u8 = b'0';
