//! # Secret Santa FHE
//!
//! The encryption boundary of the Secret Santa registry.
//!
//! Gift values are encrypted client-side into an input handle plus an input
//! proof, and revealed later through a decryption step that produces clear
//! values together with a proof the registry contract can check. The client
//! consumes this through the [`EncryptionService`] trait and never sees key
//! material.
//!
//! ## Key Types
//!
//! - [`EncryptionService`] - Initialize, encrypt, request decryption
//! - [`ProofSubmitter`] - Callback that carries clear values and proof to the ledger
//! - [`EncryptedInput`] - Encrypted payload and its input proof
//! - [`DecryptionResult`] - Clear values keyed by handle
//! - [`MemoryFhe`] - In-memory service for tests and demos
//!
//! ## Decryption Flow
//!
//! ```text
//! client                 service                      ledger
//!   |-- request_decryption -->|                           |
//!   |                         |-- decrypt handles         |
//!   |<-- submit(clear, proof)-|                           |
//!   |------------------ verify_decryption --------------->|
//!   |-- pending tx ---------->|-- wait for confirmation   |
//!   |<-- DecryptionResult ----|                           |
//! ```

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{FheError, Result};
pub use memory::{CallCounters, MemoryFhe};
pub use traits::{
    submit_and_confirm, DecryptionResult, EncryptedInput, EncryptionService, ProofSubmitter,
};
