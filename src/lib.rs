//! # Broadside
//!
//! Commit-reveal battleship between two mutually distrusting players, with
//! an authority that adjudicates every turn, detects cheating and releases
//! the wagered stake to the winner.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         BROADSIDE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── hash.rs     - keccak-256 messages, sha-256 identities   │
//! │  ├── address.rs  - 32-byte account identity                  │
//! │  └── coord.rs    - Board coordinates                         │
//! │                                                              │
//! │  proof/          - Commit-reveal cryptography                │
//! │  ├── commitment.rs  - Cell commitments, board root           │
//! │  ├── attestation.rs - Signed attestation messages            │
//! │  └── verifier.rs    - Proof-mode verifier interface          │
//! │                                                              │
//! │  game/           - Rules (deterministic, no I/O)             │
//! │  ├── state.rs    - Session aggregate                         │
//! │  ├── rules.rs    - Commit / attack / resolve transitions     │
//! │  ├── delegation.rs - Bounded delegate grants                 │
//! │  ├── escrow.rs   - Stakes and payout                         │
//! │  ├── events.rs   - Transition events                         │
//! │  └── error.rs    - Rejection taxonomy                        │
//! │                                                              │
//! │  authority/      - System of record                          │
//! │  └── contract.rs - Atomic call surface                       │
//! │                                                              │
//! │  client/         - Player side (async)                       │
//! │  ├── api.rs      - Authority API trait                       │
//! │  ├── attestation.rs - Attestation client + transports        │
//! │  ├── board.rs    - Secret board                              │
//! │  ├── prediction.rs - Local rule mirror                       │
//! │  └── orchestrator.rs - Poll-driven turn loop                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Trust Model
//!
//! Boards stay on the client. The authority stores one keccak commitment
//! per cell and checks every reveal against it, so a defender cannot turn a
//! committed ship into a miss. What the authority never sees is the layout
//! of unattacked cells; attacked cells are revealed in the clear unless the
//! session runs in proof mode.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod authority;
pub mod client;
pub mod core;
pub mod game;
pub mod proof;

// Re-export commonly used types
pub use authority::{AuthorityConfig, BattleshipAuthority, BoardAttestation, CellReveal};
pub use crate::core::address::Address;
pub use crate::core::coord::Coord;
pub use game::error::GameError;
pub use game::state::GameSession;
pub use proof::commitment::{CellSecret, Commitment, Salt};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Board edge length.
pub const BOARD_SIZE: u32 = 10;

/// Cells per board.
pub const BOARD_CELLS: u32 = BOARD_SIZE * BOARD_SIZE;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// Fleet size assumed when none was declared (5 + 4 + 3 + 3 + 2).
pub const DEFAULT_SHIP_CELLS: u32 = 17;

/// Protocol fee out of the box (5%).
pub const DEFAULT_FEE_BPS: u32 = 500;

/// Fee ceiling (20%).
pub const MAX_FEE_BPS: u32 = 2000;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Longest delegation grant, in ledgers.
pub const MAX_SESSION_TTL_LEDGERS: u32 = 172_800;
