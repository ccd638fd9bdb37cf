//! Error types for the encryption boundary.

use secret_santa_core::{CipherHandle, CoreError};
use secret_santa_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur at the encryption boundary.
#[derive(Debug, Error)]
pub enum FheError {
    /// The service was used before `initialize` succeeded.
    #[error("encryption service not initialized")]
    NotInitialized,

    /// The service could not start.
    #[error("initialization failed: {0}")]
    Init(String),

    /// Encryption error.
    #[error("encryption error: {0}")]
    Encrypt(String),

    /// Decryption error.
    #[error("decryption error: {0}")]
    Decrypt(String),

    /// No ciphertext is known under this handle.
    #[error("unknown ciphertext handle: {0}")]
    UnknownHandle(CipherHandle),

    /// The proof submission callback failed.
    #[error("proof submission failed: {0}")]
    Submission(#[from] LedgerError),

    /// Core encoding error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl FheError {
    /// Whether the ledger refused the proof because the entry was verified
    /// by someone else first.
    pub fn is_already_verified(&self) -> bool {
        matches!(self, FheError::Submission(e) if e.is_already_verified())
    }

    /// Whether the signer declined the proof submission.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, FheError::Submission(e) if e.is_user_rejection())
    }
}

/// Result type for encryption operations.
pub type Result<T> = std::result::Result<T, FheError>;
