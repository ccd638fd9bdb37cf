//! Encryption boundary traits.

use async_trait::async_trait;
use bytes::Bytes;
use secret_santa_core::{Address, CipherHandle, ClearValues};
use secret_santa_ledger::{LedgerError, PendingTx, TxReceipt};

use crate::error::Result;

/// Encrypted gift value ready to be handed to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    /// Encrypted input handle.
    pub encrypted_data: Bytes,
    /// Proof binding the input to the registry and the submitting account.
    pub proof: Bytes,
}

/// Outcome of a decryption whose proof the ledger accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionResult {
    pub clear_values: ClearValues,
    /// Confirmation of the proof submission.
    pub receipt: TxReceipt,
}

impl DecryptionResult {
    /// Clear value decrypted from `handle`.
    pub fn value_of(&self, handle: &CipherHandle) -> Option<u64> {
        self.clear_values.get(handle).copied()
    }
}

/// Carries canonical clear values and their decryption proof to the ledger.
#[async_trait]
pub trait ProofSubmitter: Send + Sync {
    async fn submit(
        &self,
        clear_values: Bytes,
        proof: Bytes,
    ) -> std::result::Result<Box<dyn PendingTx>, LedgerError>;
}

/// The encryption service.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EncryptionService: Send + Sync {
    /// Start the service. Calling it again after success is a no-op.
    async fn initialize(&self) -> Result<()>;

    /// Whether `initialize` has succeeded.
    fn is_initialized(&self) -> bool;

    /// Encrypt `value` for use by `user` on `registry`.
    async fn encrypt(
        &self,
        registry: &Address,
        user: &Address,
        value: u64,
    ) -> Result<EncryptedInput>;

    /// Decrypt `handles` and have `submitter` prove the result on-ledger.
    ///
    /// Returns only after the submitted proof transaction is confirmed.
    async fn request_decryption(
        &self,
        handles: &[CipherHandle],
        registry: &Address,
        submitter: &dyn ProofSubmitter,
    ) -> Result<DecryptionResult>;
}

/// Submit clear values through `submitter` and wait for confirmation.
pub async fn submit_and_confirm(
    submitter: &dyn ProofSubmitter,
    clear_values: Bytes,
    proof: Bytes,
) -> Result<TxReceipt> {
    let pending = submitter.submit(clear_values, proof).await?;
    tracing::debug!(tx = %pending.hash(), "decryption proof submitted");
    Ok(pending.wait().await?)
}
