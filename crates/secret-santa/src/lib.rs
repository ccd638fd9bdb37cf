//! # Secret Santa
//!
//! Client for a privacy-preserving gift-exchange registry.
//!
//! Entries live on a ledger contract. Each carries a gift value encrypted by
//! an external encryption service; only a verified decryption, proven back to
//! the contract, reveals it.
//!
//! ## Overview
//!
//! - **Refresh**: list every entry, classify it active or completed, split
//!   out the current user's entries and compute statistics
//! - **Create**: encrypt the gift value, submit the entry, wait for
//!   confirmation
//! - **Reveal**: decrypt once, prove the clear value on-ledger, reuse the
//!   stored value afterwards
//! - **Status**: a single status slot the presentation layer watches
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use secret_santa::{CreationDraft, Registry, RegistryConfig};
//! use secret_santa::core::Address;
//! use secret_santa::fhe::MemoryFhe;
//! use secret_santa::ledger::MemoryLedger;
//!
//! async fn example() {
//!     let ledger = Arc::new(MemoryLedger::new());
//!     let fhe = Arc::new(MemoryFhe::new());
//!     let registry = Registry::new(ledger.clone(), ledger, fhe, RegistryConfig::default());
//!
//!     let alice = Address::from_bytes([0xa1; 20]);
//!     let draft = CreationDraft::new("Office party", "25", "8");
//!
//!     let entry = registry.create_entry(&draft, Some(&alice)).await.unwrap();
//!     let value = registry.reveal(&entry.id, Some(&alice)).await.unwrap();
//!     assert_eq!(value, Some(25));
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `secret_santa::core` - Domain types (Entry, CreationDraft, ...)
//! - `secret_santa::ledger` - Ledger boundary and in-memory ledger
//! - `secret_santa::fhe` - Encryption boundary and in-memory service

pub mod aggregator;
pub mod config;
pub mod create;
pub mod error;
pub mod gate;
pub mod messages;
pub mod registry;
pub mod reveal;
pub mod state;
pub mod tracker;

// Re-export component crates
pub use secret_santa_core as core;
pub use secret_santa_fhe as fhe;
pub use secret_santa_ledger as ledger;

// Re-export main types for convenience
pub use aggregator::{EntryAggregator, RegistrySnapshot};
pub use config::{RegistryConfig, DEFAULT_CATEGORY};
pub use create::{creation_failure_message, IdGenerator};
pub use error::{ConfigError, CreationError, InitError, LoadError, RevealError};
pub use gate::{GateEvent, GateState, InitializationGate};
pub use registry::Registry;
pub use reveal::{reveal_failure_message, RevealGuard, RevealPermit, RevealState};
pub use state::RegistryState;
pub use tracker::{StatusDelays, TransactionStatusTracker};

// Re-export commonly used core types
pub use secret_santa_core::{
    Address, CreationDraft, Entry, EntryId, EntryStatus, RegistryStats, TransactionStatus,
    TxPhase,
};
