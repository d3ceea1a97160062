//! Attestation Messages
//!
//! Byte layouts signed by the attestation service and checked by the
//! authority. Two families exist:
//!
//! ```text
//! signature mode (legacy)
//!   board   0x01 | session | ship_cells | root | proof_hash
//!   attack  0x02 | session | x | y | is_ship | proof_hash
//!
//! proof mode (verifier contract)
//!   board   0x01 | session | ship_cells | root                    -> 64-byte proof
//!   attack  0x02 | session | x | y | expected_commitment | hit    -> 1 + 64-byte proof
//! ```
//!
//! All integers are big-endian u32.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::core::coord::Coord;
use crate::core::hash::{Hash32, MessageBuilder};
use crate::proof::commitment::Commitment;

/// Domain tag for board messages.
pub const BOARD_TAG: u8 = 1;

/// Domain tag for attack messages.
pub const ATTACK_TAG: u8 = 2;

/// Length of an ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// Length of a proof-mode attack proof (hit flag + signature).
pub const ATTACK_PROOF_LEN: usize = 1 + SIGNATURE_LEN;

/// Signature-mode board message.
pub fn board_signature_message(
    session_id: u32,
    ship_cells: u32,
    root: &Commitment,
    proof_hash: &Hash32,
) -> Vec<u8> {
    MessageBuilder::tagged(BOARD_TAG)
        .u32_be(session_id)
        .u32_be(ship_cells)
        .bytes(root)
        .bytes(proof_hash)
        .build()
}

/// Signature-mode attack message.
pub fn attack_signature_message(
    session_id: u32,
    coord: Coord,
    is_ship: bool,
    proof_hash: &Hash32,
) -> Vec<u8> {
    MessageBuilder::tagged(ATTACK_TAG)
        .u32_be(session_id)
        .u32_be(coord.x)
        .u32_be(coord.y)
        .flag(is_ship)
        .bytes(proof_hash)
        .build()
}

/// Proof-mode board message.
pub fn board_proof_message(session_id: u32, ship_cells: u32, root: &Commitment) -> Vec<u8> {
    MessageBuilder::tagged(BOARD_TAG)
        .u32_be(session_id)
        .u32_be(ship_cells)
        .bytes(root)
        .build()
}

/// Proof-mode attack message.
pub fn attack_proof_message(
    session_id: u32,
    coord: Coord,
    expected_commitment: &Commitment,
    is_ship: bool,
) -> Vec<u8> {
    MessageBuilder::tagged(ATTACK_TAG)
        .u32_be(session_id)
        .u32_be(coord.x)
        .u32_be(coord.y)
        .bytes(expected_commitment)
        .flag(is_ship)
        .build()
}

/// Check an ed25519 signature. Malformed keys verify as `false`.
pub fn verify_signature(public_key: &[u8; 32], message: &[u8], signature: &[u8; SIGNATURE_LEN]) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let signature = Signature::from_bytes(signature);
    key.verify(message, &signature).is_ok()
}

/// Holder of the attestation service's signing key.
///
/// This is the signature-based stand-in for a proving service: it vouches
/// for the messages above, nothing more.
#[derive(Clone)]
pub struct AttestationSigner {
    key: SigningKey,
}

impl AttestationSigner {
    /// Wrap an existing key.
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Key from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(&seed))
    }

    /// Public key the authority should be configured with.
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Sign arbitrary bytes.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.key.sign(message).to_bytes()
    }

    /// Proof-mode board proof (the bare signature).
    pub fn board_proof(&self, session_id: u32, ship_cells: u32, root: &Commitment) -> Vec<u8> {
        self.sign(&board_proof_message(session_id, ship_cells, root)).to_vec()
    }

    /// Proof-mode attack proof: hit flag followed by the signature.
    pub fn attack_proof(
        &self,
        session_id: u32,
        coord: Coord,
        expected_commitment: &Commitment,
        is_ship: bool,
    ) -> Vec<u8> {
        let signature = self.sign(&attack_proof_message(session_id, coord, expected_commitment, is_ship));
        let mut proof = Vec::with_capacity(ATTACK_PROOF_LEN);
        proof.push(is_ship as u8);
        proof.extend_from_slice(&signature);
        proof
    }
}

impl std::fmt::Debug for AttestationSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AttestationSigner({})", hex::encode(&self.public_key()[..4]))
    }
}
