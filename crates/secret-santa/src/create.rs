//! Creating entries with an encrypted gift value.
//!
//! ```text
//!   validate ─▶ gate ─▶ id ─▶ encrypt ─▶ submit ─▶ confirm ─▶ refresh
//! ```
//!
//! Nothing reaches the ledger before the encryption service has returned
//! both the encrypted input and its proof.

use std::sync::Mutex;

use secret_santa_core::{Address, CreationDraft, Entry, EntryId};
use secret_santa_fhe::{EncryptionService, FheError};
use secret_santa_ledger::{
    CreateEntryRequest, LedgerError, PendingTx, RegistryReader, RegistryWriter,
};

use crate::error::CreationError;
use crate::messages;
use crate::registry::{now_millis, Registry};

/// Issues `santa-<millis>` ids that never repeat within a session.
///
/// When the clock has not moved past the last issued millisecond, the next
/// millisecond is used instead.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: Mutex<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for a creation at `now_millis`.
    pub fn next_at(&self, now_millis: u64) -> EntryId {
        let mut last = self.last_millis.lock().unwrap_or_else(|e| e.into_inner());
        let millis = if now_millis > *last {
            now_millis
        } else {
            *last + 1
        };
        *last = millis;
        EntryId::from_millis(millis)
    }
}

impl<R, W, E> Registry<R, W, E>
where
    R: RegistryReader,
    W: RegistryWriter,
    E: EncryptionService,
{
    /// Create an entry from `draft` on behalf of `creator`.
    ///
    /// Returns the new entry once its transaction is confirmed. Every failure
    /// is also written to the status slot.
    pub async fn create_entry(
        &self,
        draft: &CreationDraft,
        creator: Option<&Address>,
    ) -> Result<Entry, CreationError> {
        let result = match creator {
            Some(creator) => self.run_creation(draft, creator).await,
            None => Err(CreationError::NotConnected),
        };

        if let Err(e) = &result {
            tracing::warn!(error = %e, "entry creation failed");
            self.tracker.error(creation_failure_message(e));
        }
        result
    }

    async fn run_creation(
        &self,
        draft: &CreationDraft,
        creator: &Address,
    ) -> Result<Entry, CreationError> {
        let draft = draft.validate(self.config.draft_policy())?;
        for field in &draft.coerced {
            tracing::warn!(%field, "unparsable draft field coerced to zero");
        }

        self.tracker.pending(messages::CREATING);
        self.gate.ensure_initialized(&*self.fhe).await?;

        let id = self.ids.next_at(now_millis());
        tracing::info!(entry = %id, %creator, "creating entry");

        let input = self
            .fhe
            .encrypt(&self.config.registry_address, creator, draft.gift_value)
            .await?;
        if input.encrypted_data.is_empty() || input.proof.is_empty() {
            return Err(CreationError::Encryption(FheError::Encrypt(
                "incomplete encrypted input".into(),
            )));
        }

        let request = CreateEntryRequest {
            id: id.clone(),
            name: draft.name,
            encrypted_data: input.encrypted_data,
            proof: input.proof,
            public_value: draft.gift_value,
            participant_count: draft.participant_count,
            category: self.config.category.clone(),
        };

        let pending = self
            .writer
            .create_entry(creator, request)
            .await
            .map_err(|e| rejected_or(e, CreationError::Submission))?;
        tracing::debug!(entry = %id, tx = %pending.hash(), "creation submitted");

        self.tracker.pending(messages::AWAITING_CONFIRMATION);
        let receipt = pending
            .wait()
            .await
            .map_err(|e| rejected_or(e, CreationError::Confirmation))?;
        tracing::info!(entry = %id, tx = %receipt.tx_hash, "creation confirmed");

        let refreshed = self
            .refresh_after_mutation(Some(creator))
            .await
            .and_then(|snapshot| snapshot.entry(&id).cloned());

        let entry = match refreshed {
            Some(entry) => entry,
            None => self.read_back(&id).await?,
        };

        self.tracker.success(messages::CREATED);
        Ok(entry)
    }

    async fn read_back(&self, id: &EntryId) -> Result<Entry, CreationError> {
        let record = self
            .reader
            .get_entry(id)
            .await
            .map_err(|source| CreationError::Lookup {
                id: id.clone(),
                source,
            })?;
        Ok(self.entry_from_record(id.clone(), record))
    }
}

fn rejected_or(e: LedgerError, other: fn(LedgerError) -> CreationError) -> CreationError {
    if e.is_user_rejection() {
        CreationError::Rejected(e)
    } else {
        other(e)
    }
}

/// Status message for a failed creation.
pub fn creation_failure_message(e: &CreationError) -> String {
    match e {
        CreationError::NotConnected => messages::CONNECT_WALLET.into(),
        CreationError::Init(_) => messages::INIT_FAILED.into(),
        CreationError::Rejected(_) => messages::REJECTED.into(),
        other => format!("{}{}", messages::CREATION_FAILED_PREFIX, other),
    }
}
