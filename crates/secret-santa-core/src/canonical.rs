//! Canonical CBOR encoding of decrypted clear values.
//!
//! The decryption step hands the ledger a byte string describing which
//! ciphertext handle decrypted to which value. The encoding is:
//!
//! ```text
//! [ [handle: bytes(32), value: uint], ... ]
//! ```
//!
//! - Pairs sorted by handle bytes
//! - Integers use the smallest valid encoding
//! - Definite lengths only
//!
//! Identical clear values therefore produce identical bytes, which is what
//! the decryption proof commits to.

use ciborium::value::{Integer, Value};
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::types::CipherHandle;

/// Decrypted values keyed by the handle they were decrypted from.
pub type ClearValues = BTreeMap<CipherHandle, u64>;

/// Encode clear values to canonical bytes.
pub fn encode_clear_values(values: &ClearValues) -> Result<Vec<u8>, CoreError> {
    let pairs = values
        .iter()
        .map(|(handle, value)| {
            Value::Array(vec![
                Value::Bytes(handle.as_bytes().to_vec()),
                Value::Integer(Integer::from(*value)),
            ])
        })
        .collect();

    let mut buf = Vec::new();
    ciborium::into_writer(&Value::Array(pairs), &mut buf)
        .map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode canonical clear-value bytes.
///
/// Rejects duplicate or unsorted handles, so only canonical input decodes.
pub fn decode_clear_values(bytes: &[u8]) -> Result<ClearValues, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let Value::Array(pairs) = value else {
        return Err(CoreError::DecodingError("expected array of pairs".into()));
    };

    let mut values = ClearValues::new();
    let mut last: Option<CipherHandle> = None;

    for pair in pairs {
        let (handle, value) = decode_pair(pair)?;
        if last.is_some_and(|prev| prev >= handle) {
            return Err(CoreError::DecodingError(format!(
                "handles not in canonical order at {}",
                handle
            )));
        }
        last = Some(handle);
        values.insert(handle, value);
    }

    Ok(values)
}

fn decode_pair(pair: Value) -> Result<(CipherHandle, u64), CoreError> {
    let Value::Array(items) = pair else {
        return Err(CoreError::DecodingError("expected [handle, value] pair".into()));
    };

    match items.as_slice() {
        [Value::Bytes(handle), Value::Integer(value)] => {
            let handle = CipherHandle::try_from(handle.as_slice())
                .map_err(|e| CoreError::DecodingError(e.to_string()))?;
            let value = u64::try_from(*value)
                .map_err(|_| CoreError::DecodingError("value out of range".into()))?;
            Ok((handle, value))
        }
        _ => Err(CoreError::DecodingError("malformed clear-value pair".into())),
    }
}
