//! # Secret Santa Core
//!
//! Pure primitives for the Secret Santa registry client: entries, creation
//! drafts, transaction statuses and canonical clear-value encoding.
//!
//! This crate contains no I/O, no ledger access and no encryption. It is pure
//! computation over the registry's data model.
//!
//! ## Key Types
//!
//! - [`Entry`] - One gift-exchange registration, as the client sees it
//! - [`EntryRecord`] - The raw public record the ledger returns
//! - [`EntryId`], [`Address`], [`CipherHandle`] - Strongly typed identifiers
//! - [`CreationDraft`] - User-editable form state, validated at submission
//! - [`TransactionStatus`] - The single status slot shown to the user
//!
//! ## Canonicalization
//!
//! Decrypted clear values travel to the ledger as deterministic CBOR. See the
//! [`canonical`] module.

pub mod canonical;
pub mod draft;
pub mod entry;
pub mod error;
pub mod status;
pub mod types;

pub use canonical::{decode_clear_values, encode_clear_values, ClearValues};
pub use draft::{
    CreationDraft, DraftField, DraftPolicy, ValidatedDraft, MAX_PARTICIPANTS, MIN_PARTICIPANTS,
};
pub use entry::{
    Entry, EntryRecord, EntryStatus, RegistryStats, ACTIVE_WINDOW_SECS, SECONDS_PER_DAY,
};
pub use error::{CoreError, DraftError};
pub use status::{TransactionStatus, TxPhase};
pub use types::{Address, CipherHandle, EntryId, TxHash};
