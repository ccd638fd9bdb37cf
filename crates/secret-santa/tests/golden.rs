//! Golden vectors for the clear-value encoding.
//!
//! The ledger checks decryption proofs over these exact bytes, so any client
//! talking to the same registry must produce them byte for byte.

use secret_santa::core::{decode_clear_values, encode_clear_values, CipherHandle, ClearValues};

struct GoldenVector {
    name: &'static str,
    values: Vec<([u8; 32], u64)>,
    encoded: String,
}

fn handle_hex(byte: u8) -> String {
    hex::encode([byte; 32])
}

fn vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty",
            values: vec![],
            encoded: "80".into(),
        },
        GoldenVector {
            name: "single small value",
            values: vec![([0x01; 32], 42)],
            encoded: format!("81825820{}182a", handle_hex(0x01)),
        },
        GoldenVector {
            name: "zero value",
            values: vec![([0xff; 32], 0)],
            encoded: format!("81825820{}00", handle_hex(0xff)),
        },
        GoldenVector {
            name: "two values sorted by handle",
            values: vec![([0x02; 32], 1_000), ([0x01; 32], 42)],
            encoded: format!(
                "82825820{}182a825820{}1903e8",
                handle_hex(0x01),
                handle_hex(0x02)
            ),
        },
        GoldenVector {
            name: "largest value",
            values: vec![([0x10; 32], u64::MAX)],
            encoded: format!("81825820{}1bffffffffffffffff", handle_hex(0x10)),
        },
    ]
}

fn clear_values(pairs: &[([u8; 32], u64)]) -> ClearValues {
    pairs
        .iter()
        .map(|(h, v)| (CipherHandle::from_bytes(*h), *v))
        .collect()
}

#[test]
fn test_golden_encodings() {
    for vector in vectors() {
        let encoded = encode_clear_values(&clear_values(&vector.values)).unwrap();
        assert_eq!(hex::encode(&encoded), vector.encoded, "vector: {}", vector.name);
    }
}

#[test]
fn test_golden_decodings() {
    for vector in vectors() {
        let bytes = hex::decode(&vector.encoded).unwrap();
        let decoded = decode_clear_values(&bytes).unwrap();
        assert_eq!(decoded, clear_values(&vector.values), "vector: {}", vector.name);
    }
}

#[test]
fn test_unsorted_encoding_is_rejected() {
    let unsorted = format!(
        "82825820{}1903e8825820{}182a",
        handle_hex(0x02),
        handle_hex(0x01)
    );
    assert!(decode_clear_values(&hex::decode(unsorted).unwrap()).is_err());
}

#[test]
fn test_non_minimal_integer_is_not_produced() {
    let encoded = encode_clear_values(&clear_values(&[([0x01; 32], 23)])).unwrap();
    assert_eq!(encoded.last(), Some(&0x17));
}
