//! Revealing an entry's gift value.
//!
//! The value is decrypted by the encryption service, and the clear value
//! together with its proof is written back to the registry, which marks the
//! entry verified. A verified entry is never decrypted again.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use secret_santa_core::{Address, EntryId};
use secret_santa_fhe::{EncryptionService, ProofSubmitter};
use secret_santa_ledger::{LedgerError, PendingTx, RegistryReader, RegistryWriter};

use crate::error::RevealError;
use crate::messages;
use crate::registry::Registry;

/// Whether a reveal is running in this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Idle,
    Revealing(EntryId),
}

/// Admits one reveal at a time.
#[derive(Debug, Default)]
pub struct RevealGuard {
    state: Mutex<RevealState>,
}

impl RevealGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RevealState {
        self.lock().clone()
    }

    /// Start revealing `id`, or return the id of the reveal already running.
    ///
    /// The guard goes back to idle when the returned permit is dropped.
    pub fn try_begin(&self, id: &EntryId) -> Result<RevealPermit<'_>, EntryId> {
        let mut state = self.lock();
        if let RevealState::Revealing(current) = &*state {
            return Err(current.clone());
        }
        *state = RevealState::Revealing(id.clone());
        Ok(RevealPermit { guard: self })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RevealState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Proof that the holder is the running reveal.
#[must_use]
pub struct RevealPermit<'a> {
    guard: &'a RevealGuard,
}

impl Drop for RevealPermit<'_> {
    fn drop(&mut self) {
        *self.guard.lock() = RevealState::Idle;
    }
}

/// Sends a decryption proof as a `verify_decryption` call for one entry.
struct VerificationSubmitter<'a, W: ?Sized> {
    writer: &'a W,
    from: &'a Address,
    id: &'a EntryId,
}

#[async_trait]
impl<'a, W> ProofSubmitter for VerificationSubmitter<'a, W>
where
    W: RegistryWriter + ?Sized,
{
    async fn submit(
        &self,
        clear_values: Bytes,
        proof: Bytes,
    ) -> Result<Box<dyn PendingTx>, LedgerError> {
        tracing::debug!(entry = %self.id, "submitting decryption proof");
        self.writer
            .verify_decryption(self.from, self.id, clear_values, proof)
            .await
    }
}

impl<R, W, E> Registry<R, W, E>
where
    R: RegistryReader,
    W: RegistryWriter,
    E: EncryptionService,
{
    /// Reveal the gift value of `id` on behalf of `caller`.
    ///
    /// Returns `Ok(None)` when another session verified the entry first; the
    /// value is then in the refreshed snapshot.
    pub async fn reveal(
        &self,
        id: &EntryId,
        caller: Option<&Address>,
    ) -> Result<Option<u64>, RevealError> {
        let Some(caller) = caller else {
            self.tracker.error(messages::CONNECT_WALLET);
            return Err(RevealError::NotConnected);
        };

        let _permit = self.reveals.try_begin(id).map_err(|running| {
            tracing::debug!(entry = %id, %running, "reveal refused, another is running");
            RevealError::Busy(running)
        })?;

        let result = self.run_reveal(id, caller).await;
        if let Err(e) = &result {
            tracing::warn!(entry = %id, error = %e, "reveal failed");
            self.tracker.error(reveal_failure_message(e));
        }
        result
    }

    async fn run_reveal(
        &self,
        id: &EntryId,
        caller: &Address,
    ) -> Result<Option<u64>, RevealError> {
        let record = self.reader.get_entry(id).await?;
        if record.is_verified {
            tracing::debug!(entry = %id, "entry already verified, skipping decryption");
            self.tracker.success(messages::ALREADY_VERIFIED);
            return Ok(Some(record.decrypted_value));
        }

        self.gate.ensure_initialized(&*self.fhe).await?;

        let handle = self.reader.get_encrypted_value_handle(id).await?;

        self.tracker.pending(messages::VERIFYING);
        let submitter = VerificationSubmitter {
            writer: &*self.writer,
            from: caller,
            id,
        };

        let decryption = match self
            .fhe
            .request_decryption(&[handle], &self.config.registry_address, &submitter)
            .await
        {
            Ok(decryption) => decryption,
            Err(e) if e.is_already_verified() => {
                tracing::info!(entry = %id, "entry was verified concurrently");
                self.tracker.success(messages::ALREADY_VERIFIED);
                self.refresh_after_mutation(Some(caller)).await;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let value = decryption
            .value_of(&handle)
            .ok_or_else(|| RevealError::MissingClearValue(id.clone()))?;
        tracing::info!(entry = %id, tx = %decryption.receipt.tx_hash, "gift value revealed");

        self.refresh_after_mutation(Some(caller)).await;
        self.tracker.success(messages::REVEALED);
        Ok(Some(value))
    }
}

/// Status message for a failed reveal.
pub fn reveal_failure_message(e: &RevealError) -> String {
    match e {
        RevealError::NotConnected => messages::CONNECT_WALLET.into(),
        RevealError::Init(_) => messages::INIT_FAILED.into(),
        RevealError::Decryption(e) if e.is_user_rejection() => messages::REJECTED.into(),
        other => format!("{}{}", messages::REVEAL_FAILED_PREFIX, other),
    }
}
