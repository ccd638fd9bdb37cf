//! In-memory implementation of the registry contract.
//!
//! This is primarily for testing. It follows the contract's rules (unique ids,
//! verify once) but keeps everything in memory, confirms transactions
//! immediately, and lets tests inject faults.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use secret_santa_core::{
    decode_clear_values, Address, CipherHandle, EntryId, EntryRecord, TxHash,
};

use crate::error::{LedgerError, Result};
use crate::traits::{CreateEntryRequest, PendingTx, RegistryReader, RegistryWriter, TxReceipt};

/// A write call observed by the ledger, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    CreateEntry { from: Address, id: EntryId },
    VerifyDecryption { from: Address, id: EntryId },
}

/// In-memory registry.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
pub struct MemoryLedger {
    inner: RwLock<MemoryLedgerInner>,
}

#[derive(Default)]
struct MemoryLedgerInner {
    /// Records indexed by id.
    entries: HashMap<EntryId, EntryRecord>,

    /// Ids in creation order.
    order: Vec<EntryId>,

    /// Fixed ledger time in seconds; `None` follows the system clock.
    now: Option<u64>,

    /// Transactions submitted so far.
    tx_count: u64,

    /// Write calls, for ordering assertions.
    calls: Vec<LedgerCall>,

    faults: Faults,
}

#[derive(Default)]
struct Faults {
    unreadable: HashSet<EntryId>,
    listing_down: bool,
    unavailable: bool,
    reject_next_submission: Option<String>,
    revert_next_confirmation: Option<String>,
    race_next_verification: bool,
}

impl MemoryLedger {
    /// Create a new empty ledger following the system clock.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryLedgerInner::default()),
        }
    }

    /// Pin the ledger clock to `secs`.
    pub fn set_time(&self, secs: u64) {
        self.write().now = Some(secs);
    }

    /// Insert a record directly, bypassing transactions.
    pub fn insert_record(&self, id: EntryId, record: EntryRecord) {
        let mut inner = self.write();
        if inner.entries.insert(id.clone(), record).is_none() {
            inner.order.push(id);
        }
    }

    /// Current record of an entry.
    pub fn record(&self, id: &EntryId) -> Option<EntryRecord> {
        self.read().entries.get(id).cloned()
    }

    /// Number of entries on the ledger.
    pub fn entry_count(&self) -> usize {
        self.read().order.len()
    }

    /// Write calls received so far.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.read().calls.clone()
    }

    /// Number of `verify_decryption` calls received so far.
    pub fn verification_count(&self) -> usize {
        self.read()
            .calls
            .iter()
            .filter(|c| matches!(c, LedgerCall::VerifyDecryption { .. }))
            .count()
    }

    /// Make `get_entry` fail for this id.
    pub fn fail_reads_of(&self, id: &EntryId) {
        self.write().faults.unreadable.insert(id.clone());
    }

    /// Make `list_entry_ids` fail (or recover).
    pub fn set_listing_down(&self, down: bool) {
        self.write().faults.listing_down = down;
    }

    /// Make `is_available` fail (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write().faults.unavailable = unavailable;
    }

    /// Have the signer decline the next write.
    pub fn reject_next_submission(&self, reason: &str) {
        self.write().faults.reject_next_submission = Some(reason.to_string());
    }

    /// Accept the next write but revert it on confirmation.
    pub fn revert_next_confirmation(&self, reason: &str) {
        self.write().faults.revert_next_confirmation = Some(reason.to_string());
    }

    /// Let another session verify the entry just before the next
    /// `verify_decryption` lands.
    pub fn race_next_verification(&self) {
        self.write().faults.race_next_verification = true;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryLedgerInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryLedgerInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedgerInner {
    fn now(&self) -> u64 {
        self.now.unwrap_or_else(now_secs)
    }

    fn next_tx_hash(&mut self) -> TxHash {
        self.tx_count += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&self.tx_count.to_be_bytes());
        TxHash::from_bytes(bytes)
    }

    fn take_rejection(&mut self) -> Result<()> {
        match self.faults.reject_next_submission.take() {
            Some(reason) => Err(LedgerError::Rejected(reason)),
            None => Ok(()),
        }
    }

    /// Finish a submission: either apply `effect` and confirm, or revert.
    fn settle(
        &mut self,
        effect: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Box<dyn PendingTx> {
        let hash = self.next_tx_hash();
        let outcome = match self.faults.revert_next_confirmation.take() {
            Some(reason) => Err(reason),
            None => effect(self).map_err(|e| e.to_string()),
        };

        let outcome = outcome.map(|()| TxReceipt {
            tx_hash: hash,
            block_timestamp: self.now(),
        });

        if let Err(reason) = &outcome {
            tracing::debug!(tx = %hash, %reason, "memory ledger reverted transaction");
        }

        Box::new(MemoryPendingTx { hash, outcome })
    }
}

#[async_trait]
impl RegistryReader for MemoryLedger {
    async fn list_entry_ids(&self) -> Result<Vec<EntryId>> {
        let inner = self.read();
        if inner.faults.listing_down {
            return Err(LedgerError::Transport("registry unreachable".into()));
        }
        Ok(inner.order.clone())
    }

    async fn get_entry(&self, id: &EntryId) -> Result<EntryRecord> {
        let inner = self.read();
        if inner.faults.unreadable.contains(id) {
            return Err(LedgerError::Transport(format!("failed to read entry {}", id)));
        }
        inner
            .entries
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    async fn get_encrypted_value_handle(&self, id: &EntryId) -> Result<CipherHandle> {
        let inner = self.read();
        inner
            .entries
            .get(id)
            .map(|r| r.encrypted_handle)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    async fn is_available(&self) -> Result<bool> {
        let inner = self.read();
        if inner.faults.unavailable {
            return Err(LedgerError::Transport("registry unreachable".into()));
        }
        Ok(true)
    }
}

#[async_trait]
impl RegistryWriter for MemoryLedger {
    async fn create_entry(
        &self,
        from: &Address,
        request: CreateEntryRequest,
    ) -> Result<Box<dyn PendingTx>> {
        let mut inner = self.write();
        inner.take_rejection()?;
        inner.calls.push(LedgerCall::CreateEntry {
            from: from.clone(),
            id: request.id.clone(),
        });

        let creator = from.clone();
        Ok(inner.settle(move |inner| {
            if inner.entries.contains_key(&request.id) {
                return Err(LedgerError::Reverted("Entry already exists".into()));
            }
            if request.proof.is_empty() {
                return Err(LedgerError::Reverted("invalid input proof".into()));
            }
            let encrypted_handle = CipherHandle::try_from(request.encrypted_data.as_ref())
                .map_err(|_| LedgerError::Reverted("invalid encrypted input".into()))?;

            let record = EntryRecord {
                name: request.name,
                encrypted_handle,
                public_value: request.public_value,
                participant_count: request.participant_count,
                creator,
                created_at: inner.now(),
                is_verified: false,
                decrypted_value: 0,
            };
            inner.entries.insert(request.id.clone(), record);
            inner.order.push(request.id);
            Ok(())
        }))
    }

    async fn verify_decryption(
        &self,
        from: &Address,
        id: &EntryId,
        clear_values: Bytes,
        proof: Bytes,
    ) -> Result<Box<dyn PendingTx>> {
        let mut inner = self.write();
        inner.take_rejection()?;
        inner.calls.push(LedgerCall::VerifyDecryption {
            from: from.clone(),
            id: id.clone(),
        });

        let id = id.clone();
        Ok(inner.settle(move |inner| {
            let racing = std::mem::take(&mut inner.faults.race_next_verification);
            let record = inner
                .entries
                .get_mut(&id)
                .ok_or_else(|| LedgerError::Reverted("Entry does not exist".into()))?;

            if proof.is_empty() {
                return Err(LedgerError::Reverted("invalid decryption proof".into()));
            }
            let values = decode_clear_values(&clear_values)?;
            let value = *values
                .get(&record.encrypted_handle)
                .ok_or_else(|| LedgerError::Reverted("clear value missing for handle".into()))?;

            if racing {
                record.is_verified = true;
                record.decrypted_value = value;
            }
            if record.is_verified {
                return Err(LedgerError::Reverted("Data already verified".into()));
            }

            record.is_verified = true;
            record.decrypted_value = value;
            Ok(())
        }))
    }
}

/// A transaction whose outcome was settled at submission.
struct MemoryPendingTx {
    hash: TxHash,
    outcome: std::result::Result<TxReceipt, String>,
}

#[async_trait]
impl PendingTx for MemoryPendingTx {
    fn hash(&self) -> TxHash {
        self.hash
    }

    async fn wait(&self) -> Result<TxReceipt> {
        tokio::task::yield_now().await;
        self.outcome.clone().map_err(LedgerError::Reverted)
    }
}

/// Get current time in seconds.
fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
