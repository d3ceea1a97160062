//! Board Commitment Codec
//!
//! Commit to every cell of a board before play starts, reveal one cell at a
//! time when it is attacked.
//!
//! ```text
//! cell commitment   = keccak(is_ship_byte ++ salt)
//! commitment root   = keccak(commitment_0 ++ ... ++ commitment_99)
//! resolution proof  = keccak(is_ship_byte ++ salt ++ x_be32 ++ y_be32)
//! board proof       = keccak(ship_cells_be32 ++ root)
//! ```
//!
//! A defender cannot claim "miss" on a cell it committed as a ship: the
//! revealed `(is_ship, salt)` must hash to the commitment stored at commit time.

use std::fmt;

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::core::coord::Coord;
use crate::core::hash::{Hash32, KeccakHasher};
use crate::{BOARD_CELLS, SALT_LEN};

/// A single cell commitment (or the board root).
pub type Commitment = Hash32;

/// Fixed-size secret salt for one cell.
///
/// The length is checked once on ingestion ([`Salt::from_slice`]); short or
/// long salts cannot be represented afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt(pub [u8; SALT_LEN]);

impl Salt {
    /// Fresh random salt.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SALT_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Validate an untrusted byte string.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CommitmentError> {
        let arr: [u8; SALT_LEN] = bytes
            .try_into()
            .map_err(|_| CommitmentError::InvalidSaltLength { got: bytes.len() })?;
        Ok(Self(arr))
    }

    /// Validate an untrusted hex string.
    pub fn from_hex(s: &str) -> Result<Self, CommitmentError> {
        let bytes = hex::decode(s).map_err(|_| CommitmentError::InvalidHex)?;
        Self::from_slice(&bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never log the full secret
        write!(f, "Salt({}..)", hex::encode(&self.0[..2]))
    }
}

/// Secret material for one cell, owned by the player who placed the ships.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSecret {
    /// Random salt.
    pub salt: Salt,
    /// Whether a ship occupies the cell.
    pub is_ship: bool,
}

impl CellSecret {
    /// Commitment for this cell.
    pub fn commitment(&self) -> Commitment {
        commit_cell(self.is_ship, &self.salt)
    }
}

/// Full set of board commitments plus their root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCommitment {
    /// One commitment per cell, in board order.
    pub commitments: Vec<Commitment>,
    /// Hash over the concatenated commitments.
    pub root: Commitment,
}

impl BoardCommitment {
    /// Root as lowercase hex (the attestation wire format).
    pub fn root_hex(&self) -> String {
        hex::encode(self.root)
    }
}

/// Errors from the commitment codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitmentError {
    /// Board does not have exactly `BOARD_CELLS` cells.
    #[error("board must have {expected} cells, got {got}")]
    InvalidBoardLength {
        /// Required cell count.
        expected: usize,
        /// Supplied cell count.
        got: usize,
    },

    /// Salt is not exactly `SALT_LEN` bytes.
    #[error("salt must be {} bytes, got {got}", SALT_LEN)]
    InvalidSaltLength {
        /// Supplied length.
        got: usize,
    },

    /// Hex input could not be decoded.
    #[error("invalid hex encoding")]
    InvalidHex,
}

/// `keccak(byte(is_ship) ++ salt)`.
pub fn commit_cell(is_ship: bool, salt: &Salt) -> Commitment {
    let mut hasher = KeccakHasher::new();
    hasher.update_bool(is_ship);
    hasher.update_bytes(salt.as_bytes());
    hasher.finalize()
}

/// Commit to a whole board.
pub fn commit_board(cells: &[CellSecret]) -> Result<BoardCommitment, CommitmentError> {
    if cells.len() != BOARD_CELLS as usize {
        return Err(CommitmentError::InvalidBoardLength {
            expected: BOARD_CELLS as usize,
            got: cells.len(),
        });
    }

    let commitments: Vec<Commitment> = cells.iter().map(CellSecret::commitment).collect();
    let root = commitment_root(&commitments);
    Ok(BoardCommitment { commitments, root })
}

/// `keccak(concat(commitments))`.
pub fn commitment_root(commitments: &[Commitment]) -> Commitment {
    let mut hasher = KeccakHasher::new();
    for commitment in commitments {
        hasher.update_bytes(commitment);
    }
    hasher.finalize()
}

/// Recompute a cell commitment from a reveal and compare.
pub fn verify_cell_reveal(commitment: &Commitment, is_ship: bool, salt: &Salt) -> bool {
    commit_cell(is_ship, salt) == *commitment
}

/// Hash binding a reveal to the attacked coordinate.
pub fn resolution_proof_hash(is_ship: bool, salt: &Salt, coord: Coord) -> Hash32 {
    let mut hasher = KeccakHasher::new();
    hasher.update_bool(is_ship);
    hasher.update_bytes(salt.as_bytes());
    hasher.update_u32_be(coord.x);
    hasher.update_u32_be(coord.y);
    hasher.finalize()
}

/// Hash binding a declared fleet size to a board root.
pub fn board_proof_hash(ship_cells: u32, root: &Commitment) -> Hash32 {
    let mut hasher = KeccakHasher::new();
    hasher.update_u32_be(ship_cells);
    hasher.update_bytes(root);
    hasher.finalize()
}
