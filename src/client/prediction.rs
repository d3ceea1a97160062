//! Local Prediction
//!
//! Side-effect-free mirrors of the authority's transitions. A client uses
//! them to show the expected state before the authority confirms it; the
//! authority's snapshot always wins, and a prediction that disagrees with it
//! is thrown away.

use tracing::debug;

use crate::core::address::Address;
use crate::core::coord::Coord;
use crate::core::hash::Hash32;
use crate::game::error::GameError;
use crate::game::rules;
use crate::game::state::GameSession;
use crate::proof::commitment::Commitment;

/// Expected state after a board commit.
pub fn predict_board_commit(
    game: &GameSession,
    player: &Address,
    commitments: Vec<Commitment>,
    ship_cells: u32,
) -> Result<GameSession, GameError> {
    let mut next = game.clone();
    rules::apply_board_commit(&mut next, player, commitments, ship_cells)?;
    Ok(next)
}

/// Expected state after an attack.
pub fn predict_attack(game: &GameSession, attacker: &Address, coord: Coord) -> Result<GameSession, GameError> {
    let mut next = game.clone();
    rules::apply_attack(&mut next, attacker, coord.x, coord.y)?;
    Ok(next)
}

/// Expected state after `defender` reveals `is_ship`.
///
/// A winning reveal is expected to settle the pot in the same step.
pub fn predict_resolution(game: &GameSession, defender: &Address, is_ship: bool) -> Result<GameSession, GameError> {
    let mut next = game.clone();
    rules::check_resolution(&next, defender)?;
    let resolution = rules::apply_resolution(&mut next, is_ship)?;
    if resolution.winner.is_some() {
        next.payout_processed = true;
    }
    Ok(next)
}

/// Result of comparing a prediction with the authority's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing was predicted.
    NoPrediction,
    /// Authority agrees.
    Confirmed,
    /// Authority disagrees; the prediction is discarded.
    Diverged {
        /// Fingerprint of the predicted state.
        predicted: Hash32,
        /// Fingerprint of the authority state.
        actual: Hash32,
    },
}

/// Compare and consume a prediction.
pub fn reconcile(prediction: Option<GameSession>, actual: &GameSession) -> Reconciliation {
    let Some(predicted) = prediction else {
        return Reconciliation::NoPrediction;
    };
    let predicted = predicted.fingerprint();
    let actual_fp = actual.fingerprint();
    if predicted == actual_fp {
        Reconciliation::Confirmed
    } else {
        debug!(
            "Session {}: prediction {} diverged from authority {}",
            actual.session_id,
            hex::encode(&predicted[..4]),
            hex::encode(&actual_fp[..4])
        );
        Reconciliation::Diverged {
            predicted,
            actual: actual_fp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BOARD_CELLS;

    fn ready() -> GameSession {
        let a = Address::derive("a");
        let b = Address::derive("b");
        let board: Vec<Commitment> = (0..BOARD_CELLS).map(|i| [i as u8; 32]).collect();
        let game = GameSession::new(1, a, b, 0, 0);
        let game = predict_board_commit(&game, &a, board.clone(), 1).unwrap();
        predict_board_commit(&game, &b, board, 1).unwrap()
    }

    #[test]
    fn test_prediction_does_not_touch_input() {
        let game = ready();
        let before = game.clone();
        let next = predict_attack(&game, &Address::derive("a"), Coord::new(1, 1).unwrap()).unwrap();
        assert_eq!(game, before);
        assert!(next.pending.is_some());
    }

    #[test]
    fn test_prediction_surfaces_rule_errors() {
        let game = ready();
        assert_eq!(
            predict_attack(&game, &Address::derive("b"), Coord::new(1, 1).unwrap()),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(
            predict_resolution(&game, &Address::derive("b"), false),
            Err(GameError::NoPendingAttack)
        );
    }

    #[test]
    fn test_winning_prediction_expects_settlement() {
        let game = ready();
        let game = predict_attack(&game, &Address::derive("a"), Coord::new(0, 0).unwrap()).unwrap();
        let done = predict_resolution(&game, &Address::derive("b"), true).unwrap();
        assert_eq!(done.winner, Some(Address::derive("a")));
        assert!(done.payout_processed);
    }

    #[test]
    fn test_reconcile() {
        let game = ready();
        assert_eq!(reconcile(None, &game), Reconciliation::NoPrediction);
        assert_eq!(reconcile(Some(game.clone()), &game), Reconciliation::Confirmed);

        let mut other = game.clone();
        other.player2.hits = 3;
        assert!(matches!(reconcile(Some(other), &game), Reconciliation::Diverged { .. }));
    }
}
