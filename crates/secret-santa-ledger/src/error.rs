//! Error types for the ledger boundary.

use secret_santa_core::CoreError;
use thiserror::Error;

/// Substring wallets put in the error text when the user declines to sign.
pub const USER_REJECTION_MARKER: &str = "user rejected";

/// Substring the registry contract reverts with on a repeated verification.
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";

/// Errors that can occur at the ledger boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The signer declined the transaction.
    #[error("user rejected transaction: {0}")]
    Rejected(String),

    /// The contract reverted.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// No entry with this id.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// Network or RPC failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed data crossing the boundary.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl LedgerError {
    /// Whether the signer declined, either as reported or as worded by the
    /// wallet inside some other error.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, LedgerError::Rejected(_)) || self.text_contains(USER_REJECTION_MARKER)
    }

    /// Whether the contract refused a verification because another one
    /// already landed.
    pub fn is_already_verified(&self) -> bool {
        self.text_contains(ALREADY_VERIFIED_MARKER)
    }

    fn text_contains(&self, marker: &str) -> bool {
        self.to_string().to_ascii_lowercase().contains(marker)
    }
}

impl From<CoreError> for LedgerError {
    fn from(e: CoreError) -> Self {
        LedgerError::Encoding(e.to_string())
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
