//! Strong type definitions for the registry.
//!
//! All identifiers are newtypes so an entry id can never be passed where an
//! account address or a ciphertext handle is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::CoreError;

/// Opaque, unique identifier of a registry entry.
///
/// Entries created by this client use `santa-<unix millis>`, but ids read from
/// the ledger are taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(String);

impl EntryId {
    /// Prefix of ids generated by this client.
    pub const PREFIX: &'static str = "santa-";

    /// Wrap an id as found on the ledger.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from a creation timestamp in milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(format!("{}{}", Self::PREFIX, millis))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A `0x`-prefixed, 20-byte account address.
///
/// The original spelling (e.g. a mixed-case checksum form) is preserved for
/// display, but equality and hashing ignore ASCII case.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Number of raw bytes in an address.
    pub const LEN: usize = 20;

    /// Parse an address, accepting any hex case.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidAddress(s.to_string()))?;

        if digits.len() != Self::LEN * 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidAddress(s.to_string()));
        }

        Ok(Self(format!("0x{}", digits)))
    }

    /// Build an address from raw bytes (lowercase rendering).
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// The address as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase rendering, used for comparisons and logs.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl std::str::FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A 32-byte reference to an encrypted value held by the ledger.
///
/// The handle itself carries no information about the plaintext.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CipherHandle(pub [u8; 32]);

impl CipherHandle {
    /// Create a handle from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| CoreError::InvalidHandle(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Debug for CipherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherHandle({})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for CipherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<&[u8]> for CipherHandle {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into().map_err(|_| {
            CoreError::InvalidHandle(format!("expected 32 bytes, got {}", slice.len()))
        })?;
        Ok(Self(arr))
    }
}

/// Hash of a submitted ledger transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", &hex::encode(self.0)[..16])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entry_id_from_millis() {
        let id = EntryId::from_millis(1_700_000_000_123);
        assert_eq!(id.as_str(), "santa-1700000000123");
    }

    #[test]
    fn test_address_case_insensitive_eq() {
        let mixed = Address::parse("0xAbCdEf0123456789aBcDeF0123456789AbCdEf01").unwrap();
        let lower = Address::parse("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(mixed, lower);
        assert_eq!(mixed.as_str(), "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01");

        let mut set = HashSet::new();
        set.insert(mixed);
        assert!(set.contains(&lower));
    }

    #[test]
    fn test_address_rejects_malformed() {
        assert!(Address::parse("abcdef0123456789abcdef0123456789abcdef01").is_err());
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("0xzzcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn test_address_serde_validates() {
        let ok: Address =
            serde_json::from_str("\"0x00000000000000000000000000000000000000aa\"").unwrap();
        assert_eq!(ok, Address::from_bytes({
            let mut b = [0u8; 20];
            b[19] = 0xaa;
            b
        }));
        assert!(serde_json::from_str::<Address>("\"not-an-address\"").is_err());
    }

    #[test]
    fn test_cipher_handle_hex_roundtrip() {
        let handle = CipherHandle::from_bytes([0x42; 32]);
        let parsed = CipherHandle::from_hex(&handle.to_hex()).unwrap();
        assert_eq!(handle, parsed);
        assert!(CipherHandle::from_hex("0x1234").is_err());
    }
}
