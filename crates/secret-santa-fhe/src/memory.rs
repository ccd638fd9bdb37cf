//! In-memory encryption service.
//!
//! Stands in for the real encryption network in tests. Nothing is actually
//! encrypted: each value is kept in a table under a fresh handle, and proofs
//! are tickets the service remembers issuing, so the registry side can ask
//! whether a proof is genuine. Tests can make initialization fail, slow it
//! down, or break encryption.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use secret_santa_core::{encode_clear_values, Address, CipherHandle, ClearValues};

use crate::error::{FheError, Result};
use crate::traits::{
    submit_and_confirm, DecryptionResult, EncryptedInput, EncryptionService, ProofSubmitter,
};

/// Marks handles issued by this service.
const HANDLE_TAG: &[u8; 4] = b"ssfh";

/// In-memory encryption service.
pub struct MemoryFhe {
    inner: RwLock<MemoryFheInner>,
}

#[derive(Default)]
struct MemoryFheInner {
    initialized: bool,
    values: HashMap<CipherHandle, Stored>,
    /// Decryption proofs issued so far, with the clear values they cover.
    decryption_proofs: HashMap<Bytes, Bytes>,
    issued: u64,
    init_failures: u32,
    init_delay: Option<Duration>,
    encrypt_failure: Option<String>,
    counters: CallCounters,
}

struct Stored {
    registry: Address,
    user: Address,
    value: u64,
    proof: Bytes,
}

/// How often each service operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounters {
    pub initialize: u32,
    pub encrypt: u32,
    pub request_decryption: u32,
}

impl MemoryFhe {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryFheInner::default()),
        }
    }

    /// Make the next `count` initialization attempts fail.
    pub fn fail_initializations(&self, count: u32) {
        self.write().init_failures = count;
    }

    /// Delay every initialization attempt.
    pub fn set_init_delay(&self, delay: Duration) {
        self.write().init_delay = Some(delay);
    }

    /// Make `encrypt` fail with `reason` until cleared with `None`.
    pub fn set_encrypt_failure(&self, reason: Option<&str>) {
        self.write().encrypt_failure = reason.map(String::from);
    }

    pub fn counters(&self) -> CallCounters {
        self.read().counters
    }

    /// Check an input proof as the registry contract would.
    pub fn verify_input_proof(
        &self,
        encrypted_data: &[u8],
        registry: &Address,
        user: &Address,
        proof: &[u8],
    ) -> bool {
        let Ok(handle) = CipherHandle::try_from(encrypted_data) else {
            return false;
        };
        self.read().values.get(&handle).is_some_and(|stored| {
            &stored.registry == registry && &stored.user == user && stored.proof == proof
        })
    }

    /// Check a decryption proof as the registry contract would.
    pub fn verify_decryption_proof(&self, clear_values: &[u8], proof: &[u8]) -> bool {
        self.read()
            .decryption_proofs
            .get(proof)
            .is_some_and(|covered| covered == clear_values)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryFheInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryFheInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn open(&self, handle: &CipherHandle, registry: &Address) -> Result<u64> {
        let inner = self.read();
        let stored = inner
            .values
            .get(handle)
            .ok_or(FheError::UnknownHandle(*handle))?;

        if &stored.registry != registry {
            return Err(FheError::Decrypt(format!(
                "handle {} is not bound to registry {}",
                handle, registry
            )));
        }
        Ok(stored.value)
    }
}

impl Default for MemoryFhe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFheInner {
    fn next_handle(&mut self) -> (u64, CipherHandle) {
        self.issued += 1;
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(HANDLE_TAG);
        bytes[24..].copy_from_slice(&self.issued.to_be_bytes());
        (self.issued, CipherHandle::from_bytes(bytes))
    }
}

#[async_trait]
impl EncryptionService for MemoryFhe {
    async fn initialize(&self) -> Result<()> {
        let delay = {
            let mut inner = self.write();
            inner.counters.initialize += 1;
            inner.init_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.write();
        if inner.init_failures > 0 {
            inner.init_failures -= 1;
            return Err(FheError::Init("relayer unreachable".into()));
        }
        inner.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    async fn encrypt(
        &self,
        registry: &Address,
        user: &Address,
        value: u64,
    ) -> Result<EncryptedInput> {
        let mut inner = self.write();
        inner.counters.encrypt += 1;

        if !inner.initialized {
            return Err(FheError::NotInitialized);
        }
        if let Some(reason) = &inner.encrypt_failure {
            return Err(FheError::Encrypt(reason.clone()));
        }

        let (seq, handle) = inner.next_handle();
        let proof = Bytes::from(format!("input-proof:{}:{}", seq, user.to_lowercase()));

        inner.values.insert(
            handle,
            Stored {
                registry: registry.clone(),
                user: user.clone(),
                value,
                proof: proof.clone(),
            },
        );
        tracing::debug!(%handle, "memory service stored encrypted input");

        Ok(EncryptedInput {
            encrypted_data: Bytes::copy_from_slice(handle.as_bytes()),
            proof,
        })
    }

    async fn request_decryption(
        &self,
        handles: &[CipherHandle],
        registry: &Address,
        submitter: &dyn ProofSubmitter,
    ) -> Result<DecryptionResult> {
        {
            let mut inner = self.write();
            inner.counters.request_decryption += 1;
            if !inner.initialized {
                return Err(FheError::NotInitialized);
            }
        }

        let mut clear_values = ClearValues::new();
        for handle in handles {
            clear_values.insert(*handle, self.open(handle, registry)?);
        }

        let encoded = Bytes::from(encode_clear_values(&clear_values)?);
        let proof = {
            let mut inner = self.write();
            let proof = Bytes::from(format!(
                "decryption-proof:{}",
                inner.decryption_proofs.len() + 1
            ));
            inner
                .decryption_proofs
                .insert(proof.clone(), encoded.clone());
            proof
        };

        let receipt = submit_and_confirm(submitter, encoded, proof).await?;

        Ok(DecryptionResult {
            clear_values,
            receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secret_santa_core::{decode_clear_values, TxHash};
    use secret_santa_ledger::{LedgerError, PendingTx, TxReceipt};
    use std::sync::Mutex;

    fn registry() -> Address {
        Address::from_bytes([0x5e; 20])
    }

    fn alice() -> Address {
        Address::from_bytes([0xa1; 20])
    }

    struct Confirmed;

    #[async_trait]
    impl PendingTx for Confirmed {
        fn hash(&self) -> TxHash {
            TxHash::from_bytes([0x01; 32])
        }

        async fn wait(&self) -> std::result::Result<TxReceipt, LedgerError> {
            Ok(TxReceipt {
                tx_hash: self.hash(),
                block_timestamp: 0,
            })
        }
    }

    /// Records what it was asked to submit.
    #[derive(Default)]
    struct RecordingSubmitter {
        submitted: Mutex<Vec<(Bytes, Bytes)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl ProofSubmitter for RecordingSubmitter {
        async fn submit(
            &self,
            clear_values: Bytes,
            proof: Bytes,
        ) -> std::result::Result<Box<dyn PendingTx>, LedgerError> {
            if let Some(reason) = &self.fail_with {
                return Err(LedgerError::Reverted(reason.clone()));
            }
            self.submitted.lock().unwrap().push((clear_values, proof));
            Ok(Box::new(Confirmed))
        }
    }

    async fn ready_service() -> MemoryFhe {
        let fhe = MemoryFhe::new();
        fhe.initialize().await.unwrap();
        fhe
    }

    #[tokio::test]
    async fn test_encrypt_requires_initialization() {
        let fhe = MemoryFhe::new();
        let err = fhe.encrypt(&registry(), &alice(), 1).await.unwrap_err();
        assert!(matches!(err, FheError::NotInitialized));
    }

    #[tokio::test]
    async fn test_initialization_failures_then_success() {
        let fhe = MemoryFhe::new();
        fhe.fail_initializations(1);

        assert!(matches!(fhe.initialize().await, Err(FheError::Init(_))));
        assert!(!fhe.is_initialized());

        fhe.initialize().await.unwrap();
        assert!(fhe.is_initialized());
        assert_eq!(fhe.counters().initialize, 2);
    }

    #[tokio::test]
    async fn test_input_proof_binds_registry_and_user() {
        let fhe = ready_service().await;
        let input = fhe.encrypt(&registry(), &alice(), 100).await.unwrap();

        assert_eq!(input.encrypted_data.len(), 32);
        assert!(!input.proof.is_empty());
        assert!(fhe.verify_input_proof(&input.encrypted_data, &registry(), &alice(), &input.proof));

        let mallory = Address::from_bytes([0x66; 20]);
        assert!(!fhe.verify_input_proof(&input.encrypted_data, &registry(), &mallory, &input.proof));
        assert!(!fhe.verify_input_proof(&input.encrypted_data, &mallory, &alice(), &input.proof));
    }

    #[tokio::test]
    async fn test_handles_are_distinct() {
        let fhe = ready_service().await;
        let a = fhe.encrypt(&registry(), &alice(), 5).await.unwrap();
        let b = fhe.encrypt(&registry(), &alice(), 5).await.unwrap();

        assert_ne!(a.encrypted_data, b.encrypted_data);
        assert!(!fhe.verify_input_proof(&a.encrypted_data, &registry(), &alice(), &b.proof));
    }

    #[tokio::test]
    async fn test_decryption_submits_canonical_values() {
        let fhe = ready_service().await;
        let input = fhe.encrypt(&registry(), &alice(), 100).await.unwrap();
        let handle = CipherHandle::try_from(input.encrypted_data.as_ref()).unwrap();

        let submitter = RecordingSubmitter::default();
        let result = fhe
            .request_decryption(&[handle], &registry(), &submitter)
            .await
            .unwrap();
        assert_eq!(result.value_of(&handle), Some(100));

        let submitted = submitter.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let (clear, proof) = &submitted[0];
        assert_eq!(decode_clear_values(clear).unwrap().get(&handle), Some(&100));
        assert!(fhe.verify_decryption_proof(clear, proof));
        assert!(!fhe.verify_decryption_proof(b"tampered", proof));
    }

    #[tokio::test]
    async fn test_decryption_rejects_foreign_registry() {
        let fhe = ready_service().await;
        let input = fhe.encrypt(&registry(), &alice(), 7).await.unwrap();
        let handle = CipherHandle::try_from(input.encrypted_data.as_ref()).unwrap();

        let other = Address::from_bytes([0x0f; 20]);
        let err = fhe
            .request_decryption(&[handle], &other, &RecordingSubmitter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FheError::Decrypt(_)));
    }

    #[tokio::test]
    async fn test_unknown_handle() {
        let fhe = ready_service().await;
        let handle = CipherHandle::from_bytes([0xee; 32]);
        let err = fhe
            .request_decryption(&[handle], &registry(), &RecordingSubmitter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FheError::UnknownHandle(h) if h == handle));
    }

    #[tokio::test]
    async fn test_submission_error_is_classified() {
        let fhe = ready_service().await;
        let input = fhe.encrypt(&registry(), &alice(), 7).await.unwrap();
        let handle = CipherHandle::try_from(input.encrypted_data.as_ref()).unwrap();

        let submitter = RecordingSubmitter {
            fail_with: Some("Data already verified".into()),
            ..Default::default()
        };
        let err = fhe
            .request_decryption(&[handle], &registry(), &submitter)
            .await
            .unwrap_err();
        assert!(err.is_already_verified());
    }
}
