//! Error types for the Secret Santa core.

use thiserror::Error;

use crate::draft::DraftField;

/// Core errors raised while parsing identifiers or encoding values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid ciphertext handle: {0}")]
    InvalidHandle(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for creation drafts.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{field} is not a non-negative integer: {raw:?}")]
    InvalidNumber { field: DraftField, raw: String },

    #[error("participant count {0} is outside 2..=50")]
    ParticipantCountOutOfRange(u32),
}
