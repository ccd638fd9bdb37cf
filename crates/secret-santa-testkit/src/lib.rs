//! # Secret Santa Testkit
//!
//! Testing utilities for the Secret Santa registry client.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A [`Registry`](secret_santa::Registry) wired to the
//!   in-memory ledger and encryption service, plus sample accounts and records
//! - **Generators**: Proptest strategies for records, entries and drafts
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use secret_santa_testkit::generators::DraftParams;
//!
//! proptest! {
//!     #[test]
//!     fn drafts_validate(params: DraftParams) {
//!         prop_assert!(params.to_draft().validate(Default::default()).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust,no_run
//! use secret_santa_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new();
//!     let entry = fixture.create("Office party", 25, 8).await;
//!     let value = fixture.registry.reveal(&entry.id, Some(&fixture.user)).await;
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    multi_party_users, random_address, registry_address, sample_record, user_address,
    MemoryRegistry, TestFixture,
};
pub use generators::{entries, entry_record, DraftParams};
