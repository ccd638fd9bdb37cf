//! # Secret Santa Ledger
//!
//! The ledger boundary of the Secret Santa registry. The registry contract is
//! consumed through two narrow traits, so the client never depends on a
//! particular chain client.
//!
//! ## Key Types
//!
//! - [`RegistryReader`] - Public reads, no identity required
//! - [`RegistryWriter`] - Transactions, signed by the `from` account
//! - [`PendingTx`] - A submitted transaction awaiting confirmation
//! - [`MemoryLedger`] - In-memory registry for tests and demos
//! - [`LedgerError`] - Failures, with rejection and "already verified" checks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use secret_santa_ledger::{MemoryLedger, RegistryReader};
//!
//! async fn example() {
//!     let ledger = MemoryLedger::new();
//!     let ids = ledger.list_entry_ids().await.unwrap();
//!     for id in ids {
//!         let record = ledger.get_entry(&id).await.unwrap();
//!         println!("{}: {}", id, record.name);
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Opaque values**: the ledger only stores ciphertext handles; the
//!   plaintext mirror is a display hint written by the creator.
//! - **Verify once**: a second verification of the same entry reverts with
//!   "Data already verified".

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{LedgerError, Result, ALREADY_VERIFIED_MARKER, USER_REJECTION_MARKER};
pub use memory::{LedgerCall, MemoryLedger};
pub use traits::{CreateEntryRequest, PendingTx, RegistryReader, RegistryWriter, TxReceipt};
