//! Commitment & Attestation
//!
//! Everything that binds a hidden board to the authority and vouches for
//! a reveal:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF LAYER                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  commitment.rs  - Cell commitments, board root, proof hashes│
//! │  attestation.rs - Signed attestation messages (ed25519)     │
//! │  verifier.rs    - Proof-mode verifier interface             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod attestation;
pub mod commitment;
pub mod verifier;

// Re-export key types
pub use attestation::{verify_signature, AttestationSigner, ATTACK_PROOF_LEN, SIGNATURE_LEN};
pub use commitment::{
    board_proof_hash, commit_board, commit_cell, commitment_root, resolution_proof_hash, verify_cell_reveal,
    BoardCommitment, CellSecret, Commitment, CommitmentError, Salt,
};
pub use verifier::{SignatureZkVerifier, ZkProofError, ZkVerifier};
