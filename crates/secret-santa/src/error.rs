//! Error types for the registry client.

use secret_santa_core::{DraftError, EntryId};
use secret_santa_fhe::FheError;
use secret_santa_ledger::LedgerError;
use thiserror::Error;

/// The encryption service could not be started.
///
/// Cloneable because every caller waiting on the same attempt receives it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("encryption service initialization failed: {0}")]
    Failed(String),

    /// The attempt was dropped before it finished.
    #[error("encryption service initialization was cancelled")]
    Cancelled,
}

/// The entry listing could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to list entries: {0}")]
    Listing(#[from] LedgerError),
}

/// Errors from the creation workflow.
#[derive(Debug, Error)]
pub enum CreationError {
    /// No account is connected.
    #[error("no account connected")]
    NotConnected,

    #[error("invalid draft: {0}")]
    Validation(#[from] DraftError),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("encryption failed: {0}")]
    Encryption(#[from] FheError),

    /// The signer declined the creation transaction.
    #[error("transaction rejected: {0}")]
    Rejected(LedgerError),

    #[error("submission failed: {0}")]
    Submission(LedgerError),

    #[error("confirmation failed: {0}")]
    Confirmation(LedgerError),

    /// The confirmed entry could not be read back.
    #[error("failed to read back entry {id}: {source}")]
    Lookup { id: EntryId, source: LedgerError },
}

/// Errors from the reveal workflow.
#[derive(Debug, Error)]
pub enum RevealError {
    /// No account is connected.
    #[error("no account connected")]
    NotConnected,

    /// Another reveal is still running.
    #[error("a reveal of {0} is already in progress")]
    Busy(EntryId),

    #[error(transparent)]
    Init(#[from] InitError),

    #[error("failed to read entry: {0}")]
    Fetch(#[from] LedgerError),

    #[error("decryption failed: {0}")]
    Decryption(#[from] FheError),

    /// The decryption result has no value for the entry's handle.
    #[error("no clear value returned for {0}")]
    MissingClearValue(EntryId),
}

/// Errors loading a [`RegistryConfig`](crate::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
