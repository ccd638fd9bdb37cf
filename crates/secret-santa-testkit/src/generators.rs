//! Proptest generators for property-based testing.

use proptest::prelude::*;

use secret_santa_core::{
    Address, CipherHandle, CreationDraft, Entry, EntryId, EntryRecord, EntryStatus,
    ACTIVE_WINDOW_SECS, MAX_PARTICIPANTS, MIN_PARTICIPANTS,
};

/// Generate a random account address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a random ciphertext handle.
pub fn cipher_handle() -> impl Strategy<Value = CipherHandle> {
    any::<[u8; 32]>().prop_map(CipherHandle::from_bytes)
}

/// Generate a client-style entry id.
pub fn entry_id() -> impl Strategy<Value = EntryId> {
    (1_600_000_000_000u64..=1_900_000_000_000u64).prop_map(EntryId::from_millis)
}

/// Generate a non-empty entry name.
pub fn entry_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,31}".prop_map(String::from)
}

/// Generate a gift value small enough that sums never saturate.
pub fn gift_value() -> impl Strategy<Value = u64> {
    0u64..=1_000_000
}

/// Generate a participant count within the accepted range.
pub fn participant_count() -> impl Strategy<Value = u32> {
    MIN_PARTICIPANTS..=MAX_PARTICIPANTS
}

/// Generate a creation time at most twice the active window before `now`.
pub fn created_at(now: u64) -> impl Strategy<Value = u64> {
    (0..=2 * ACTIVE_WINDOW_SECS).prop_map(move |age| now.saturating_sub(age))
}

/// Generate a ledger record as of `now`. Verified records carry a value.
pub fn entry_record(now: u64) -> impl Strategy<Value = EntryRecord> {
    (
        entry_name(),
        cipher_handle(),
        gift_value(),
        participant_count(),
        address(),
        created_at(now),
        any::<Option<u64>>(),
    )
        .prop_map(
            |(name, handle, value, count, creator, created_at, revealed)| EntryRecord {
                name,
                encrypted_handle: handle,
                public_value: value,
                participant_count: count,
                creator,
                created_at,
                is_verified: revealed.is_some(),
                decrypted_value: revealed.unwrap_or_default(),
            },
        )
}

/// Generate a list of entries as seen at `now`.
pub fn entries(now: u64, max_len: usize) -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec((entry_id(), entry_record(now)), 0..=max_len).prop_map(move |pairs| {
        pairs
            .into_iter()
            .map(|(id, record)| Entry::from_record(id, record, now, ACTIVE_WINDOW_SECS))
            .collect()
    })
}

/// Parameters for a draft that passes strict validation.
#[derive(Debug, Clone)]
pub struct DraftParams {
    pub name: String,
    pub gift_value: u64,
    pub participant_count: u32,
}

impl DraftParams {
    pub fn to_draft(&self) -> CreationDraft {
        CreationDraft::new(
            &self.name,
            &self.gift_value.to_string(),
            &self.participant_count.to_string(),
        )
    }
}

impl Arbitrary for DraftParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (entry_name(), gift_value(), participant_count())
            .prop_map(|(name, gift_value, participant_count)| DraftParams {
                name,
                gift_value,
                participant_count,
            })
            .boxed()
    }
}

/// Whether `status` is what an entry created at `created_at` should have.
pub fn expected_status(created_at: u64, now: u64) -> EntryStatus {
    if created_at > now.saturating_sub(ACTIVE_WINDOW_SECS) {
        EntryStatus::Active
    } else {
        EntryStatus::Completed
    }
}
