//! Ledger boundary traits.
//!
//! Reads need no identity. Writes are signed by the account passed as
//! `from`, and return a [`PendingTx`] the caller awaits separately, so the
//! client can report "submitted" and "confirmed" as distinct steps.

use async_trait::async_trait;
use bytes::Bytes;
use secret_santa_core::{Address, CipherHandle, EntryId, EntryRecord, TxHash};

use crate::error::Result;

/// Arguments of the registry's `createEntry` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEntryRequest {
    pub id: EntryId,
    pub name: String,
    /// Encrypted input handle as produced by the encryption service.
    pub encrypted_data: Bytes,
    /// Input proof binding the ciphertext to registry and creator.
    pub proof: Bytes,
    /// Plaintext mirror of the gift value, for display before reveal.
    pub public_value: u64,
    pub participant_count: u32,
    pub category: String,
}

/// Confirmation of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// Ledger timestamp of the including block, in seconds.
    pub block_timestamp: u64,
}

/// A submitted transaction.
#[async_trait]
pub trait PendingTx: Send + Sync {
    /// Hash the transaction was submitted under.
    fn hash(&self) -> TxHash;

    /// Wait until the transaction is confirmed or has failed.
    async fn wait(&self) -> Result<TxReceipt>;
}

/// Read side of the registry contract.
#[async_trait]
pub trait RegistryReader: Send + Sync {
    /// All entry ids, in ledger order.
    async fn list_entry_ids(&self) -> Result<Vec<EntryId>>;

    /// Public record of one entry.
    async fn get_entry(&self, id: &EntryId) -> Result<EntryRecord>;

    /// Ciphertext handle of an entry's encrypted gift value.
    async fn get_encrypted_value_handle(&self, id: &EntryId) -> Result<CipherHandle>;

    /// Whether the contract reports itself ready.
    async fn is_available(&self) -> Result<bool>;
}

/// Write side of the registry contract.
#[async_trait]
pub trait RegistryWriter: Send + Sync {
    /// Submit a new entry.
    async fn create_entry(
        &self,
        from: &Address,
        request: CreateEntryRequest,
    ) -> Result<Box<dyn PendingTx>>;

    /// Submit decrypted clear values and their proof for an entry.
    async fn verify_decryption(
        &self,
        from: &Address,
        id: &EntryId,
        clear_values: Bytes,
        proof: Bytes,
    ) -> Result<Box<dyn PendingTx>>;
}
