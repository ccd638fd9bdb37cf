//! Builds registry snapshots from the read boundary.

use secret_santa_core::{Address, Entry, EntryId, RegistryStats};
use secret_santa_ledger::RegistryReader;

use crate::error::LoadError;

/// Everything the client knows about the registry at one point in time.
///
/// Always rebuilt as a whole, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// Every readable entry, in ledger order.
    pub entries: Vec<Entry>,
    /// The entries created by the account the snapshot was taken for.
    pub user_entries: Vec<Entry>,
    pub stats: RegistryStats,
    /// Ids that were listed but could not be read.
    pub skipped: Vec<EntryId>,
}

impl RegistrySnapshot {
    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Enumerates and classifies entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryAggregator {
    window_secs: u64,
}

impl EntryAggregator {
    /// An aggregator treating entries younger than `window_secs` as active.
    pub fn new(window_secs: u64) -> Self {
        Self { window_secs }
    }

    /// Load every entry and derive the snapshot as of `now_secs`.
    ///
    /// Only a failed listing is an error. Entries that fail to load are
    /// logged, recorded in [`RegistrySnapshot::skipped`] and left out of the
    /// statistics.
    pub async fn load<R>(
        &self,
        reader: &R,
        current_user: Option<&Address>,
        now_secs: u64,
    ) -> Result<RegistrySnapshot, LoadError>
    where
        R: RegistryReader + ?Sized,
    {
        let ids = reader.list_entry_ids().await?;
        tracing::debug!(count = ids.len(), "listed registry entries");

        let mut snapshot = RegistrySnapshot::default();

        for id in ids {
            let record = match reader.get_entry(&id).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(entry = %id, error = %e, "skipping unreadable entry");
                    snapshot.skipped.push(id);
                    continue;
                }
            };

            let entry = Entry::from_record(id, record, now_secs, self.window_secs);
            if current_user.is_some_and(|user| entry.is_created_by(user)) {
                snapshot.user_entries.push(entry.clone());
            }
            snapshot.entries.push(entry);
        }

        snapshot.stats = RegistryStats::compute(&snapshot.entries);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secret_santa_core::{CipherHandle, EntryRecord, EntryStatus, SECONDS_PER_DAY};
    use secret_santa_ledger::MemoryLedger;

    const NOW: u64 = 1_700_000_000;
    const WINDOW: u64 = 30 * SECONDS_PER_DAY;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn record(name: &str, value: u64, creator: Address, created_at: u64) -> EntryRecord {
        EntryRecord {
            name: name.into(),
            encrypted_handle: CipherHandle::from_bytes([value as u8; 32]),
            public_value: value,
            participant_count: 4,
            creator,
            created_at,
            is_verified: false,
            decrypted_value: 0,
        }
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let ledger = MemoryLedger::new();
        let snapshot = EntryAggregator::new(WINDOW)
            .load(&ledger, Some(&addr(1)), NOW)
            .await
            .unwrap();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.stats, RegistryStats::default());
    }

    #[tokio::test]
    async fn test_stats_and_partition() {
        let ledger = MemoryLedger::new();
        ledger.insert_record("a".into(), record("a", 10, addr(1), NOW - 10));
        ledger.insert_record("b".into(), record("b", 20, addr(2), NOW - 20));
        ledger.insert_record("c".into(), record("c", 0, addr(1), NOW - WINDOW - 1));

        let snapshot = EntryAggregator::new(WINDOW)
            .load(&ledger, Some(&addr(1)), NOW)
            .await
            .unwrap();

        assert_eq!(snapshot.stats.total_events, 3);
        assert_eq!(snapshot.stats.active_events, 2);
        assert_eq!(snapshot.stats.total_gifts, 30);
        assert_eq!(snapshot.stats.average_value, 10);

        let mine: Vec<_> = snapshot.user_entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(mine, vec!["a", "c"]);
        assert_eq!(
            snapshot.entry(&"c".into()).map(|e| e.status),
            Some(EntryStatus::Completed)
        );
    }

    #[tokio::test]
    async fn test_creator_match_ignores_case() {
        let ledger = MemoryLedger::new();
        let upper = Address::parse("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD").unwrap();
        let lower = Address::parse("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        ledger.insert_record("a".into(), record("a", 5, upper, NOW));

        let snapshot = EntryAggregator::new(WINDOW)
            .load(&ledger, Some(&lower), NOW)
            .await
            .unwrap();
        assert_eq!(snapshot.user_entries.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_skipped() {
        let ledger = MemoryLedger::new();
        ledger.insert_record("a".into(), record("a", 10, addr(1), NOW));
        ledger.insert_record("b".into(), record("b", 20, addr(1), NOW));
        ledger.fail_reads_of(&"b".into());

        let snapshot = EntryAggregator::new(WINDOW)
            .load(&ledger, None, NOW)
            .await
            .unwrap();

        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].id.as_str(), "a");
        assert_eq!(snapshot.skipped, vec![EntryId::new("b")]);
        assert_eq!(snapshot.stats.total_gifts, 10);
        assert!(snapshot.user_entries.is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let ledger = MemoryLedger::new();
        ledger.set_listing_down(true);

        let err = EntryAggregator::new(WINDOW)
            .load(&ledger, None, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Listing(_)));
    }

    #[tokio::test]
    async fn test_unverified_value_is_hidden() {
        let ledger = MemoryLedger::new();
        let mut r = record("a", 10, addr(1), NOW);
        r.decrypted_value = 99;
        ledger.insert_record("a".into(), r);

        let snapshot = EntryAggregator::new(WINDOW)
            .load(&ledger, None, NOW)
            .await
            .unwrap();
        assert_eq!(snapshot.entries[0].decrypted_value, None);
        assert!(!snapshot.entries[0].is_verified());
    }
}
