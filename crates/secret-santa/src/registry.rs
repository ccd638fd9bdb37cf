//! The Registry: the client's entry point.
//!
//! Owns the ledger and encryption boundaries together with every piece of
//! session state: the status slot, the initialization gate, the reveal guard,
//! the id generator and the current snapshot. Creation and reveal live in
//! their own modules as further `impl` blocks.

use std::sync::Arc;

use tokio::sync::watch;

use secret_santa_core::{Address, Entry, EntryId, EntryRecord, TransactionStatus};
use secret_santa_fhe::EncryptionService;
use secret_santa_ledger::{LedgerError, RegistryReader, RegistryWriter};

use crate::aggregator::{EntryAggregator, RegistrySnapshot};
use crate::config::RegistryConfig;
use crate::create::IdGenerator;
use crate::error::{InitError, LoadError};
use crate::gate::{GateState, InitializationGate};
use crate::messages;
use crate::reveal::{RevealGuard, RevealState};
use crate::state::RegistryState;
use crate::tracker::TransactionStatusTracker;

/// A registry client session.
pub struct Registry<R, W, E> {
    pub(crate) reader: Arc<R>,
    pub(crate) writer: Arc<W>,
    pub(crate) fhe: Arc<E>,
    pub(crate) config: RegistryConfig,
    pub(crate) tracker: TransactionStatusTracker,
    pub(crate) gate: InitializationGate,
    pub(crate) reveals: RevealGuard,
    pub(crate) ids: IdGenerator,
    aggregator: EntryAggregator,
    state: RegistryState,
}

impl<R, W, E> Registry<R, W, E>
where
    R: RegistryReader,
    W: RegistryWriter,
    E: EncryptionService,
{
    /// Create a session over the given boundaries.
    pub fn new(reader: Arc<R>, writer: Arc<W>, fhe: Arc<E>, config: RegistryConfig) -> Self {
        Self {
            tracker: TransactionStatusTracker::new(config.status_delays()),
            aggregator: EntryAggregator::new(config.active_window_secs),
            gate: InitializationGate::new(),
            reveals: RevealGuard::new(),
            ids: IdGenerator::new(),
            state: RegistryState::new(),
            reader,
            writer,
            fhe,
            config,
        }
    }

    pub fn registry_address(&self) -> &Address {
        &self.config.registry_address
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn encryption(&self) -> &E {
        &self.fhe
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────

    /// The current snapshot.
    pub async fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.state.snapshot().await
    }

    /// An entry from the current snapshot.
    pub async fn entry(&self, id: &EntryId) -> Option<Entry> {
        self.state.entry(id).await
    }

    /// Number of snapshots installed this session.
    pub async fn snapshot_generation(&self) -> u64 {
        self.state.generation().await
    }

    pub fn status(&self) -> TransactionStatus {
        self.tracker.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TransactionStatus> {
        self.tracker.subscribe()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveals.state()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Reload every entry and replace the snapshot.
    ///
    /// `current_user` selects which entries land in
    /// [`RegistrySnapshot::user_entries`].
    pub async fn refresh(
        &self,
        current_user: Option<&Address>,
    ) -> Result<Arc<RegistrySnapshot>, LoadError> {
        match self.load(current_user).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load registry");
                self.tracker.error(messages::LOAD_FAILED);
                Err(e)
            }
        }
    }

    /// Initialize the encryption service if no attempt has succeeded yet.
    pub async fn ensure_initialized(&self) -> Result<(), InitError> {
        self.gate
            .ensure_initialized(&*self.fhe)
            .await
            .map_err(|e| {
                self.tracker.error(messages::INIT_FAILED);
                e
            })
    }

    /// Ask the registry contract whether it is ready.
    pub async fn check_availability(&self) -> Result<bool, LedgerError> {
        match self.reader.is_available().await {
            Ok(available) => {
                tracing::info!(available, "availability checked");
                self.tracker.success(messages::AVAILABLE);
                Ok(available)
            }
            Err(e) => {
                tracing::warn!(error = %e, "availability check failed");
                self.tracker.error(messages::AVAILABILITY_FAILED);
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    async fn load(
        &self,
        current_user: Option<&Address>,
    ) -> Result<Arc<RegistrySnapshot>, LoadError> {
        let ticket = self.state.begin_load();
        let snapshot = self
            .aggregator
            .load(&*self.reader, current_user, now_secs())
            .await?;

        tracing::info!(
            entries = snapshot.entries.len(),
            skipped = snapshot.skipped.len(),
            "registry refreshed"
        );
        Ok(self.state.replace(ticket, snapshot).await)
    }

    /// Refresh after a confirmed transaction. A failure here does not undo
    /// the transaction, so it is only logged.
    pub(crate) async fn refresh_after_mutation(
        &self,
        current_user: Option<&Address>,
    ) -> Option<Arc<RegistrySnapshot>> {
        match self.load(current_user).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "refresh after transaction failed");
                None
            }
        }
    }

    pub(crate) fn entry_from_record(&self, id: EntryId, record: EntryRecord) -> Entry {
        Entry::from_record(id, record, now_secs(), self.config.active_window_secs)
    }
}

/// Current time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn now_secs() -> u64 {
    now_millis() / 1_000
}
