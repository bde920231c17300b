//! Input validation for device tokens and notification content.
//!
//! All checks are pure and total. Lengths are counted in characters
//! (Unicode scalar values), not bytes.

use crate::constants::{BODY_MAX_LEN, TITLE_MAX_LEN, TOKEN_MAX_EXCLUSIVE, TOKEN_MIN_EXCLUSIVE};
use crate::types::BatchItem;

/// Which part of a batch item failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidField {
    /// The device token is out of bounds.
    Token,
    /// The title or body is empty or too long.
    Content,
}

impl std::fmt::Display for InvalidField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token => write!(f, "token"),
            Self::Content => write!(f, "content"),
        }
    }
}

/// A batch was rejected before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("batch item {index} has invalid {field}")]
pub struct BatchValidationError {
    /// Zero-based position of the first failing item.
    pub index: usize,
    /// The field that failed.
    pub field: InvalidField,
}

/// Returns `true` if `token` looks like a real device token.
pub fn validate_token(token: &str) -> bool {
    let len = token.chars().count();
    len > TOKEN_MIN_EXCLUSIVE && len < TOKEN_MAX_EXCLUSIVE
}

/// Returns `true` if both title and body are non-empty and within limits.
pub fn validate_content(title: &str, body: &str) -> bool {
    let title_len = title.chars().count();
    let body_len = body.chars().count();
    (1..=TITLE_MAX_LEN).contains(&title_len) && (1..=BODY_MAX_LEN).contains(&body_len)
}

/// Check every item of a batch, stopping at the first failure.
///
/// Token is checked before content, so an item failing both reports
/// [`InvalidField::Token`].
pub fn validate_batch(items: &[BatchItem]) -> Result<(), BatchValidationError> {
    for (index, item) in items.iter().enumerate() {
        if !validate_token(&item.token) {
            return Err(BatchValidationError {
                index,
                field: InvalidField::Token,
            });
        }
        if !validate_content(&item.title, &item.body) {
            return Err(BatchValidationError {
                index,
                field: InvalidField::Content,
            });
        }
    }
    Ok(())
}
