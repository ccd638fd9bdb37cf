//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use rand::RngCore;

use secret_santa::{Registry, RegistryConfig};
use secret_santa_core::{
    Address, CipherHandle, CreationDraft, Entry, EntryId, EntryRecord, SECONDS_PER_DAY,
};
use secret_santa_fhe::MemoryFhe;
use secret_santa_ledger::MemoryLedger;

/// A registry wired to the in-memory ledger and encryption service.
pub type MemoryRegistry = Registry<MemoryLedger, MemoryLedger, MemoryFhe>;

/// A registry session with direct access to its memory boundaries.
pub struct TestFixture {
    pub ledger: Arc<MemoryLedger>,
    pub fhe: Arc<MemoryFhe>,
    pub registry: MemoryRegistry,
    /// The connected account.
    pub user: Address,
}

impl TestFixture {
    /// A fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::for_registry(registry_address()))
    }

    /// A fixture with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        let ledger = Arc::new(MemoryLedger::new());
        let fhe = Arc::new(MemoryFhe::new());
        let registry = Registry::new(
            Arc::clone(&ledger),
            Arc::clone(&ledger),
            Arc::clone(&fhe),
            config,
        );
        Self {
            ledger,
            fhe,
            registry,
            user: user_address(1),
        }
    }

    /// Create an entry as the connected user.
    pub async fn create(&self, name: &str, gift_value: u64, participants: u32) -> Entry {
        let draft = CreationDraft::new(name, &gift_value.to_string(), &participants.to_string());
        self.registry
            .create_entry(&draft, Some(&self.user))
            .await
            .expect("fixture entry creation failed")
    }

    /// Put a record straight onto the ledger.
    pub fn seed(&self, id: &str, record: EntryRecord) -> EntryId {
        let id = EntryId::new(id);
        self.ledger.insert_record(id.clone(), record);
        id
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Address of the registry contract used by fixtures.
pub fn registry_address() -> Address {
    Address::from_bytes([0x5f; 20])
}

/// A deterministic account address.
pub fn user_address(index: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xa0;
    bytes[19] = index;
    Address::from_bytes(bytes)
}

/// A fresh random account address.
pub fn random_address() -> Address {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    Address::from_bytes(bytes)
}

/// Distinct accounts for multi-party tests.
pub fn multi_party_users(count: u8) -> Vec<Address> {
    (1..=count).map(user_address).collect()
}

/// An unverified record created `age_secs` before `now_secs`.
pub fn sample_record(
    creator: Address,
    gift_value: u64,
    now_secs: u64,
    age_secs: u64,
) -> EntryRecord {
    EntryRecord {
        name: format!("Exchange {}", gift_value),
        encrypted_handle: CipherHandle::from_bytes([gift_value as u8; 32]),
        public_value: gift_value,
        participant_count: 5,
        creator,
        created_at: now_secs.saturating_sub(age_secs),
        is_verified: false,
        decrypted_value: 0,
    }
}

/// Age of an entry that just fell out of the active window.
pub const fn just_expired_age() -> u64 {
    30 * SECONDS_PER_DAY + 1
}

/// Current time in seconds.
pub fn now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}
