//! Account addresses.

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use super::hash::sha256_with_domain;

/// Domain tag for label-derived addresses.
const ADDRESS_DOMAIN: &[u8] = b"broadside-address:";

/// A 32-byte account identity (player, delegate, admin, escrow, token).
///
/// Implements Ord so sessions and grants can live in BTreeMaps.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Address of an ed25519 account key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    /// Deterministic address for a human-readable label.
    pub fn derive(label: &str) -> Self {
        Self(sha256_with_domain(ADDRESS_DOMAIN, label.as_bytes()))
    }

    /// Parse from a 64-char hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First four bytes as hex, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(Address::derive("alice"), Address::derive("alice"));
        assert_ne!(Address::derive("alice"), Address::derive("bob"));
    }

    #[test]
    fn test_hex_parse() {
        let addr = Address::derive("alice");
        assert_eq!(Address::from_hex(&addr.to_string()), Some(addr));
        assert_eq!(Address::from_hex("abcd"), None);
        assert_eq!(Address::from_hex("zz"), None);
    }

    #[test]
    fn test_from_verifying_key() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let addr = Address::from_verifying_key(&key.verifying_key());
        assert_eq!(addr.as_bytes(), key.verifying_key().as_bytes());
    }
}
