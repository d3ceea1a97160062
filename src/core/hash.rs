//! Hashing Primitives
//!
//! Two hash functions are in play:
//! - keccak-256 for everything the ledger recomputes (cell commitments,
//!   commitment roots, proof hashes)
//! - SHA-256 for local identity derivation and snapshot fingerprints

use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

/// Hash output type (256 bits / 32 bytes)
pub type Hash32 = [u8; 32];

/// Incremental keccak-256 hasher with big-endian integer helpers.
///
/// Field order is part of the wire format: the ledger rebuilds the same
/// byte string and compares digests.
pub struct KeccakHasher {
    hasher: Keccak,
}

impl KeccakHasher {
    /// Create an empty hasher.
    pub fn new() -> Self {
        Self {
            hasher: Keccak::v256(),
        }
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update(&[value]);
    }

    /// Update with a u32 value (big-endian, as the ledger appends it).
    #[inline]
    pub fn update_u32_be(&mut self, value: u32) {
        self.hasher.update(&value.to_be_bytes());
    }

    /// Update with a boolean encoded as a single 0/1 byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> Hash32 {
        let mut out = [0u8; 32];
        self.hasher.finalize(&mut out);
        out
    }
}

impl Default for KeccakHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte-string builder for signed attestation messages.
///
/// Produces the exact payload an attestor signs, so the signer and the
/// verifier never drift apart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageBuilder {
    bytes: Vec<u8>,
}

impl MessageBuilder {
    /// Start a message with a one-byte domain tag.
    pub fn tagged(tag: u8) -> Self {
        Self { bytes: vec![tag] }
    }

    /// Append a u32 (big-endian).
    pub fn u32_be(mut self, value: u32) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append a 0/1 byte.
    pub fn flag(mut self, value: bool) -> Self {
        self.bytes.push(value as u8);
        self
    }

    /// Append raw bytes.
    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.bytes.extend_from_slice(value);
        self
    }

    /// Finish and return the message bytes.
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// keccak-256 of arbitrary data.
pub fn keccak256(data: &[u8]) -> Hash32 {
    let mut hasher = KeccakHasher::new();
    hasher.update_bytes(data);
    hasher.finalize()
}

/// SHA-256 with domain separator.
pub fn sha256_with_domain(domain: &[u8], data: &[u8]) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_input_vector() {
        // Well-known keccak-256("") digest.
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = KeccakHasher::new();
        hasher.update_bool(true);
        hasher.update_bytes(&[9u8; 32]);
        hasher.update_u32_be(7);

        let mut flat = vec![1u8];
        flat.extend_from_slice(&[9u8; 32]);
        flat.extend_from_slice(&7u32.to_be_bytes());

        assert_eq!(hasher.finalize(), keccak256(&flat));
    }

    #[test]
    fn test_message_builder_layout() {
        let msg = MessageBuilder::tagged(2)
            .u32_be(0x0102_0304)
            .flag(true)
            .bytes(&[0xaa, 0xbb])
            .build();
        assert_eq!(msg, vec![2, 1, 2, 3, 4, 1, 0xaa, 0xbb]);
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];
        assert_ne!(
            sha256_with_domain(b"DOMAIN_A", &data),
            sha256_with_domain(b"DOMAIN_B", &data)
        );
    }
}
