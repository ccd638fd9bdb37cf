//! The client-side registry state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use secret_santa_core::{Entry, EntryId};

use crate::aggregator::RegistrySnapshot;

/// Holds the current snapshot.
///
/// Readers get a shared handle to a complete snapshot. Writers swap in a new
/// one whole, so nobody ever observes a half-updated registry.
///
/// Every load takes a ticket before it starts reading the ledger. A snapshot
/// is installed only if no load that started later has installed one first.
#[derive(Debug, Default)]
pub struct RegistryState {
    current: RwLock<Installed>,
    tickets: AtomicU64,
}

#[derive(Debug, Default)]
struct Installed {
    snapshot: Arc<RegistrySnapshot>,
    generation: u64,
    ticket: u64,
}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read().await.snapshot)
    }

    /// Ticket for a load about to start.
    pub fn begin_load(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install `snapshot` loaded under `ticket`, returning the snapshot now
    /// current. A snapshot older than the installed one is dropped.
    pub async fn replace(
        &self,
        ticket: u64,
        snapshot: RegistrySnapshot,
    ) -> Arc<RegistrySnapshot> {
        let mut current = self.current.write().await;
        if ticket < current.ticket {
            tracing::debug!(
                ticket,
                installed = current.ticket,
                "dropping snapshot superseded by a newer load"
            );
            return Arc::clone(&current.snapshot);
        }

        let snapshot = Arc::new(snapshot);
        current.snapshot = Arc::clone(&snapshot);
        current.ticket = ticket;
        current.generation += 1;
        snapshot
    }

    /// Number of snapshots installed so far.
    pub async fn generation(&self) -> u64 {
        self.current.read().await.generation
    }

    pub async fn entry(&self, id: &EntryId) -> Option<Entry> {
        self.current.read().await.snapshot.entry(id).cloned()
    }
}
