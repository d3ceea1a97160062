//! Proof Verifier Interface
//!
//! The authority delegates proof-mode checks to an external verifier. The
//! verifier is trusted: proofs are not self-verifying.

use std::fmt;

use crate::core::address::Address;
use crate::core::coord::Coord;
use crate::proof::attestation::{
    attack_proof_message, board_proof_message, verify_signature, ATTACK_PROOF_LEN, SIGNATURE_LEN,
};
use crate::proof::commitment::Commitment;

/// Interface for proof-mode verification.
///
/// Implementations may wrap a real proving system; the bundled one checks
/// attestation signatures.
pub trait ZkVerifier: Send + Sync + fmt::Debug {
    /// Address the authority reports from `get_zk_verifier`.
    fn address(&self) -> Address;

    /// Verify a board proof against the commitment root.
    fn verify_board(
        &self,
        session_id: u32,
        ship_cells: u32,
        commitment_root: &Commitment,
        proof: &[u8],
    ) -> Result<(), ZkProofError>;

    /// Verify an attack proof against the stored cell commitment.
    ///
    /// Returns the hit flag the proof attests to.
    fn verify_attack(
        &self,
        session_id: u32,
        coord: Coord,
        expected_commitment: &Commitment,
        proof: &[u8],
    ) -> Result<bool, ZkProofError>;
}

/// Errors during proof verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZkProofError {
    /// Verifier has no key to check against.
    #[error("verifier key not configured")]
    VerifierNotConfigured,

    /// Proof has the wrong size.
    #[error("invalid proof length: expected {expected}, got {got}")]
    InvalidProofLength {
        /// Required length.
        expected: usize,
        /// Supplied length.
        got: usize,
    },

    /// First byte of an attack proof is not 0 or 1.
    #[error("invalid hit flag {0}")]
    InvalidHitFlag(u8),

    /// Signature does not match the message.
    #[error("proof signature rejected")]
    InvalidSignature,
}

/// Signature-backed verifier.
///
/// A board proof is a 64-byte signature; an attack proof is a hit flag
/// followed by a 64-byte signature.
#[derive(Clone)]
pub struct SignatureZkVerifier {
    address: Address,
    verifier_key: Option<[u8; 32]>,
}

impl SignatureZkVerifier {
    /// Create a verifier reachable at `address`.
    pub fn new(address: Address, verifier_key: Option<[u8; 32]>) -> Self {
        Self { address, verifier_key }
    }

    /// Forget the trusted key; every proof is rejected afterwards.
    pub fn clear_verifier_key(&mut self) {
        self.verifier_key = None;
    }

    fn key(&self) -> Result<&[u8; 32], ZkProofError> {
        self.verifier_key.as_ref().ok_or(ZkProofError::VerifierNotConfigured)
    }
}

impl fmt::Debug for SignatureZkVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureZkVerifier")
            .field("address", &self.address)
            .field("configured", &self.verifier_key.is_some())
            .finish()
    }
}

impl ZkVerifier for SignatureZkVerifier {
    fn address(&self) -> Address {
        self.address
    }

    fn verify_board(
        &self,
        session_id: u32,
        ship_cells: u32,
        commitment_root: &Commitment,
        proof: &[u8],
    ) -> Result<(), ZkProofError> {
        let key = self.key()?;
        let signature: &[u8; SIGNATURE_LEN] = proof.try_into().map_err(|_| ZkProofError::InvalidProofLength {
            expected: SIGNATURE_LEN,
            got: proof.len(),
        })?;

        let message = board_proof_message(session_id, ship_cells, commitment_root);
        if verify_signature(key, &message, signature) {
            Ok(())
        } else {
            Err(ZkProofError::InvalidSignature)
        }
    }

    fn verify_attack(
        &self,
        session_id: u32,
        coord: Coord,
        expected_commitment: &Commitment,
        proof: &[u8],
    ) -> Result<bool, ZkProofError> {
        let key = self.key()?;
        if proof.len() != ATTACK_PROOF_LEN {
            return Err(ZkProofError::InvalidProofLength {
                expected: ATTACK_PROOF_LEN,
                got: proof.len(),
            });
        }

        let is_ship = match proof[0] {
            0 => false,
            1 => true,
            other => return Err(ZkProofError::InvalidHitFlag(other)),
        };
        let signature: &[u8; SIGNATURE_LEN] = proof[1..]
            .try_into()
            .map_err(|_| ZkProofError::InvalidProofLength { expected: ATTACK_PROOF_LEN, got: proof.len() })?;

        let message = attack_proof_message(session_id, coord, expected_commitment, is_ship);
        if verify_signature(key, &message, signature) {
            Ok(is_ship)
        } else {
            Err(ZkProofError::InvalidSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::attestation::AttestationSigner;

    fn setup() -> (AttestationSigner, SignatureZkVerifier) {
        let signer = AttestationSigner::from_seed([11u8; 32]);
        let verifier = SignatureZkVerifier::new(Address::derive("zk-verifier"), Some(signer.public_key()));
        (signer, verifier)
    }

    #[test]
    fn test_board_proof_roundtrip() {
        let (signer, verifier) = setup();
        let proof = signer.board_proof(9, 17, &[4u8; 32]);

        assert_eq!(verifier.verify_board(9, 17, &[4u8; 32], &proof), Ok(()));
        assert_eq!(
            verifier.verify_board(9, 16, &[4u8; 32], &proof),
            Err(ZkProofError::InvalidSignature)
        );
    }

    #[test]
    fn test_attack_proof_returns_hit_flag() {
        let (signer, verifier) = setup();
        let coord = Coord::new(2, 5).unwrap();

        let hit = signer.attack_proof(9, coord, &[4u8; 32], true);
        assert_eq!(verifier.verify_attack(9, coord, &[4u8; 32], &hit), Ok(true));

        let miss = signer.attack_proof(9, coord, &[4u8; 32], false);
        assert_eq!(verifier.verify_attack(9, coord, &[4u8; 32], &miss), Ok(false));
    }

    #[test]
    fn test_flipped_hit_flag_rejected() {
        let (signer, verifier) = setup();
        let coord = Coord::new(2, 5).unwrap();

        let mut proof = signer.attack_proof(9, coord, &[4u8; 32], false);
        proof[0] = 1;
        assert_eq!(
            verifier.verify_attack(9, coord, &[4u8; 32], &proof),
            Err(ZkProofError::InvalidSignature)
        );

        proof[0] = 7;
        assert_eq!(
            verifier.verify_attack(9, coord, &[4u8; 32], &proof),
            Err(ZkProofError::InvalidHitFlag(7))
        );
    }

    #[test]
    fn test_wrong_lengths_and_missing_key() {
        let (_, mut verifier) = setup();
        let coord = Coord::new(0, 0).unwrap();

        assert!(matches!(
            verifier.verify_board(1, 1, &[0u8; 32], &[0u8; 10]),
            Err(ZkProofError::InvalidProofLength { expected: 64, got: 10 })
        ));
        assert!(matches!(
            verifier.verify_attack(1, coord, &[0u8; 32], &[0u8; 64]),
            Err(ZkProofError::InvalidProofLength { expected: 65, got: 64 })
        ));

        verifier.clear_verifier_key();
        assert_eq!(
            verifier.verify_board(1, 1, &[0u8; 32], &[0u8; 64]),
            Err(ZkProofError::VerifierNotConfigured)
        );
    }
}
