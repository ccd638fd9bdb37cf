//! Entry: one gift-exchange registration held by the ledger.
//!
//! The ledger hands out [`EntryRecord`]s. The client maps them to [`Entry`]
//! values, deriving [`EntryStatus`] from the record's age, and summarizes a
//! collection of entries as [`RegistryStats`].

use serde::{Deserialize, Serialize};

use crate::types::{Address, CipherHandle, EntryId};

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Entries younger than this are [`EntryStatus::Active`].
pub const ACTIVE_WINDOW_SECS: u64 = 30 * SECONDS_PER_DAY;

/// Lifecycle status of an entry, derived from its creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Created within the active window.
    Active,
    /// Older than the active window.
    Completed,
}

impl EntryStatus {
    /// Classify an entry created at `created_at` (seconds) as seen at `now`.
    ///
    /// An entry created exactly `window_secs` ago is already completed.
    pub fn classify(created_at: u64, now: u64, window_secs: u64) -> Self {
        if created_at > now.saturating_sub(window_secs) {
            EntryStatus::Active
        } else {
            EntryStatus::Completed
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, EntryStatus::Active)
    }
}

/// Public fields of an entry exactly as the ledger exposes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    pub encrypted_handle: CipherHandle,
    /// Plaintext mirror of the gift value written at creation time.
    pub public_value: u64,
    pub participant_count: u32,
    pub creator: Address,
    /// Ledger timestamp in seconds.
    pub created_at: u64,
    pub is_verified: bool,
    /// Meaningless (usually zero) while `is_verified` is false.
    pub decrypted_value: u64,
}

/// A registry entry as held in the client snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub encrypted_value_handle: CipherHandle,
    /// Display hint only. The revealed value is authoritative.
    pub public_gift_value: u64,
    pub participant_count: u32,
    pub creator: Address,
    pub created_at: u64,
    /// `Some` exactly when a verification transaction has succeeded.
    pub decrypted_value: Option<u64>,
    pub status: EntryStatus,
}

impl Entry {
    /// Map a ledger record to an entry, classifying it against `now`.
    pub fn from_record(id: EntryId, record: EntryRecord, now: u64, window_secs: u64) -> Self {
        let status = EntryStatus::classify(record.created_at, now, window_secs);
        let decrypted_value = record.is_verified.then_some(record.decrypted_value);

        Self {
            id,
            name: record.name,
            encrypted_value_handle: record.encrypted_handle,
            public_gift_value: record.public_value,
            participant_count: record.participant_count,
            creator: record.creator,
            created_at: record.created_at,
            decrypted_value,
            status,
        }
    }

    /// Whether the encrypted value has been revealed and proven on-ledger.
    pub fn is_verified(&self) -> bool {
        self.decrypted_value.is_some()
    }

    /// Whether `account` created this entry.
    pub fn is_created_by(&self, account: &Address) -> bool {
        &self.creator == account
    }
}

/// Summary statistics over a snapshot of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_events: u64,
    pub active_events: u64,
    pub total_gifts: u64,
    pub average_value: u64,
}

impl RegistryStats {
    /// Compute statistics over the given entries.
    ///
    /// The average rounds half up and is zero for an empty collection.
    pub fn compute(entries: &[Entry]) -> Self {
        let total_events = entries.len() as u64;
        let active_events = entries.iter().filter(|e| e.status.is_active()).count() as u64;
        let total_gifts = entries
            .iter()
            .fold(0u64, |sum, e| sum.saturating_add(e.public_gift_value));

        let average_value = if total_events == 0 {
            0
        } else {
            let total = total_gifts as u128;
            let count = total_events as u128;
            ((2 * total + count) / (2 * count)) as u64
        };

        Self {
            total_events,
            active_events,
            total_gifts,
            average_value,
        }
    }
}
