//! Game Logic Module
//!
//! The session aggregate and the pure rules that move it forward.
//!
//! ## Module Structure
//!
//! - `state`: Session, player slots, pending attack
//! - `rules`: Board commit, attack and resolution transitions
//! - `delegation`: Time- and use-bounded delegate grants
//! - `escrow`: Token ledger, pot split, payout
//! - `events`: Events emitted on committed transitions
//! - `error`: Rejection taxonomy

pub mod delegation;
pub mod error;
pub mod escrow;
pub mod events;
pub mod rules;
pub mod state;

// Re-export key types
pub use delegation::{GrantKey, GrantStore, SessionGrant};
pub use error::{ErrorClass, GameError};
pub use escrow::{split_pot, Payout, SettlementTerms, TokenLedger};
pub use events::{GameEvent, GameEventData};
pub use rules::Resolution;
pub use state::{GamePhase, GameSession, PendingAttack, PlayerSlot, Seat};
