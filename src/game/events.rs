//! Game Events
//!
//! Events emitted by the authority on every committed transition, in the
//! order they happened. Clients and logs consume them; nothing reads them
//! back to decide rules.

use serde::{Deserialize, Serialize};

use crate::core::address::Address;
use crate::core::coord::Coord;
use crate::game::escrow::Payout;

/// Event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Session created.
    GameStarted {
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
    },

    /// Stake moved into escrow.
    StakeDeposited { player: Address, amount: i128 },

    /// Board commitments stored.
    BoardCommitted {
        player: Address,
        ship_cells: u32,
        zk: bool,
    },

    /// Attack recorded as pending.
    AttackMade {
        attacker: Address,
        defender: Address,
        coord: Coord,
        delegated: bool,
    },

    /// Defender revealed the targeted cell.
    AttackResolved {
        attacker: Address,
        defender: Address,
        coord: Coord,
        hit: bool,
        attacker_hits: u32,
    },

    /// Winner decided.
    GameEnded { winner: Address },

    /// Escrow released.
    PayoutSettled { payout: Payout },

    /// Delegate grant created or replaced.
    SessionAuthorized {
        player: Address,
        delegate: Address,
        expires_ledger: u32,
        uses_left: u32,
    },

    /// Delegate grant removed.
    SessionRevoked { player: Address, delegate: Address },
}

/// An event with its ledger position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Ledger sequence when the event was emitted.
    pub ledger: u32,

    /// Monotonic emission index, breaks ties within a ledger.
    pub seq: u64,

    /// Session the event belongs to.
    pub session_id: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(ledger: u32, seq: u64, session_id: u32, data: GameEventData) -> Self {
        Self {
            ledger,
            seq,
            session_id,
            data,
        }
    }

    /// Player the event is about, if any.
    pub fn actor(&self) -> Option<Address> {
        match &self.data {
            GameEventData::GameStarted { .. } => None,
            GameEventData::StakeDeposited { player, .. } => Some(*player),
            GameEventData::BoardCommitted { player, .. } => Some(*player),
            GameEventData::AttackMade { attacker, .. } => Some(*attacker),
            GameEventData::AttackResolved { defender, .. } => Some(*defender),
            GameEventData::GameEnded { winner } => Some(*winner),
            GameEventData::PayoutSettled { payout } => Some(payout.winner),
            GameEventData::SessionAuthorized { player, .. } => Some(*player),
            GameEventData::SessionRevoked { player, .. } => Some(*player),
        }
    }

    /// Whether this event finished a game.
    pub fn is_terminal(&self) -> bool {
        matches!(self.data, GameEventData::GameEnded { .. })
    }
}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: ledger, then emission order
        self.ledger.cmp(&other.ledger).then(self.seq.cmp(&other.seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let a = Address::derive("a");
        let e1 = GameEvent::new(10, 0, 1, GameEventData::StakeDeposited { player: a, amount: 5 });
        let e2 = GameEvent::new(10, 1, 1, GameEventData::GameEnded { winner: a });
        let e3 = GameEvent::new(9, 2, 1, GameEventData::GameEnded { winner: a });

        assert!(e1 < e2);
        assert!(e3 < e1);
        assert!(e2.is_terminal());
        assert_eq!(e1.actor(), Some(a));
    }
}
