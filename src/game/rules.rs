//! Turn Rules
//!
//! Pure transition functions over [`GameSession`]. The authority runs them
//! on a working copy and commits the copy on success; clients run the same
//! functions to predict the next state.
//!
//! ```text
//! AwaitingBoards --commit x2--> Turn(p1) --attack--> PendingResolution
//!        ^                         ^                      |
//!        |                         +------resolve---------+
//!                                                         |
//!                                  Finished(attacker) <---+ (hits == fleet)
//! ```
//!
//! Each `check_*` function validates without mutating; each `apply_*`
//! function assumes its check passed.

use crate::core::address::Address;
use crate::core::coord::Coord;
use crate::game::error::GameError;
use crate::game::state::{GameSession, PendingAttack};
use crate::proof::commitment::Commitment;
use crate::BOARD_CELLS;

/// Outcome of a resolved attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Player who fired.
    pub attacker: Address,
    /// Player who revealed.
    pub defender: Address,
    /// Targeted cell.
    pub coord: Coord,
    /// Whether the reveal was a ship.
    pub hit: bool,
    /// Attacker's hit count after this resolution.
    pub attacker_hits: u32,
    /// Set when this resolution ended the game.
    pub winner: Option<Address>,
}

/// Validate a board commit by `player`.
pub fn check_board_commit(
    game: &GameSession,
    player: &Address,
    commitment_count: usize,
    ship_cells: u32,
) -> Result<(), GameError> {
    if game.winner.is_some() {
        return Err(GameError::GameAlreadyEnded);
    }
    if commitment_count != BOARD_CELLS as usize {
        return Err(GameError::InvalidBoardCommitmentLength);
    }
    if ship_cells == 0 || ship_cells > BOARD_CELLS {
        return Err(GameError::InvalidShipCount);
    }

    let seat = game.seat_of(player).ok_or(GameError::NotPlayer)?;
    let slot = game.slot(seat);
    if !slot.deposited {
        return Err(GameError::StakesNotFunded);
    }
    if slot.board.is_some() {
        return Err(GameError::BoardAlreadyCommitted);
    }
    Ok(())
}

/// Store a board. Starts play with player 1 once both boards are in.
pub fn apply_board_commit(
    game: &mut GameSession,
    player: &Address,
    commitments: Vec<Commitment>,
    ship_cells: u32,
) -> Result<(), GameError> {
    check_board_commit(game, player, commitments.len(), ship_cells)?;
    let seat = game.seat_of(player).ok_or(GameError::NotPlayer)?;

    let slot = game.slot_mut(seat);
    slot.board = Some(commitments);
    slot.ship_cells = Some(ship_cells);

    if game.boards_ready() && game.turn.is_none() {
        game.turn = Some(game.player1.address);
    }
    Ok(())
}

/// Validate an attack and return the pending attack it would create.
pub fn check_attack(game: &GameSession, attacker: &Address, x: u32, y: u32) -> Result<PendingAttack, GameError> {
    if game.winner.is_some() {
        return Err(GameError::GameAlreadyEnded);
    }
    if !game.stakes_funded() {
        return Err(GameError::StakesNotFunded);
    }
    let coord = Coord::new(x, y).ok_or(GameError::InvalidCoordinate)?;
    if !game.boards_ready() {
        return Err(GameError::BoardsNotReady);
    }
    if game.pending.is_some() {
        return Err(GameError::PendingAttackResolution);
    }

    let turn = game.turn.ok_or(GameError::BoardsNotReady)?;
    if *attacker != turn {
        return Err(GameError::NotYourTurn);
    }

    let seat = game.seat_of(attacker).ok_or(GameError::NotPlayer)?;
    if game.slot(seat).has_attacked(coord.index()) {
        return Err(GameError::AlreadyAttacked);
    }

    Ok(PendingAttack {
        attacker: *attacker,
        defender: game.slot(seat.other()).address,
        coord,
    })
}

/// Record an attack as pending. The turn does not move until resolution.
pub fn apply_attack(game: &mut GameSession, attacker: &Address, x: u32, y: u32) -> Result<PendingAttack, GameError> {
    let pending = check_attack(game, attacker, x, y)?;
    game.pending = Some(pending);
    Ok(pending)
}

/// Validate that `defender` may resolve; returns the pending attack and the
/// commitment stored for the targeted cell.
pub fn check_resolution(game: &GameSession, defender: &Address) -> Result<(PendingAttack, Commitment), GameError> {
    if game.winner.is_some() {
        return Err(GameError::GameAlreadyEnded);
    }
    let pending = game.pending.ok_or(GameError::NoPendingAttack)?;
    if pending.defender != *defender {
        return Err(GameError::NotPendingDefender);
    }

    let seat = game.seat_of(defender).ok_or(GameError::NotPlayer)?;
    let board = game.slot(seat).board.as_ref().ok_or(GameError::BoardsNotReady)?;
    let expected = board
        .get(pending.coord.index() as usize)
        .copied()
        .ok_or(GameError::InvalidCoordinate)?;

    Ok((pending, expected))
}

/// Apply a verified resolution: record the shot, clear pending, pass the
/// turn to the defender, and decide the winner.
pub fn apply_resolution(game: &mut GameSession, is_ship: bool) -> Result<Resolution, GameError> {
    let pending = game.pending.ok_or(GameError::NoPendingAttack)?;
    let attacker_seat = game.seat_of(&pending.attacker).ok_or(GameError::NotPlayer)?;
    let fleet = game.slot(attacker_seat.other()).fleet_size();
    let index = pending.coord.index();

    let attacker = game.slot_mut(attacker_seat);
    attacker.attacks.push(index);
    if is_ship {
        attacker.hits = attacker.hits.saturating_add(1);
        attacker.hit_attacks.push(index);
    }
    let attacker_hits = attacker.hits;

    game.pending = None;
    game.turn = Some(pending.defender);

    // hits grow by at most one per resolution, so the first to reach the
    // opponent's fleet size wins and no count can pass it
    let winner = if attacker_hits >= fleet {
        game.winner = Some(pending.attacker);
        game.turn = None;
        Some(pending.attacker)
    } else {
        None
    };

    Ok(Resolution {
        attacker: pending.attacker,
        defender: pending.defender,
        coord: pending.coord,
        hit: is_ship,
        attacker_hits,
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GamePhase;

    fn addr(label: &str) -> Address {
        Address::derive(label)
    }

    fn board() -> Vec<Commitment> {
        (0..BOARD_CELLS).map(|i| [i as u8; 32]).collect()
    }

    fn ready_game(ships: u32) -> GameSession {
        let mut game = GameSession::new(1, addr("a"), addr("b"), 0, 0);
        apply_board_commit(&mut game, &addr("a"), board(), ships).unwrap();
        apply_board_commit(&mut game, &addr("b"), board(), ships).unwrap();
        game
    }

    #[test]
    fn test_turn_starts_after_both_boards() {
        let mut game = GameSession::new(1, addr("a"), addr("b"), 0, 0);
        apply_board_commit(&mut game, &addr("b"), board(), 3).unwrap();
        assert_eq!(game.turn, None);
        assert_eq!(check_attack(&game, &addr("a"), 0, 0), Err(GameError::BoardsNotReady));

        apply_board_commit(&mut game, &addr("a"), board(), 3).unwrap();
        assert_eq!(game.phase(), GamePhase::Turn(addr("a")));
    }

    #[test]
    fn test_board_commit_validation() {
        let mut game = GameSession::new(1, addr("a"), addr("b"), 0, 0);
        assert_eq!(
            apply_board_commit(&mut game, &addr("a"), board()[..99].to_vec(), 3),
            Err(GameError::InvalidBoardCommitmentLength)
        );
        assert_eq!(apply_board_commit(&mut game, &addr("a"), board(), 0), Err(GameError::InvalidShipCount));
        assert_eq!(apply_board_commit(&mut game, &addr("a"), board(), 101), Err(GameError::InvalidShipCount));
        assert_eq!(apply_board_commit(&mut game, &addr("c"), board(), 3), Err(GameError::NotPlayer));

        apply_board_commit(&mut game, &addr("a"), board(), 3).unwrap();
        assert_eq!(
            apply_board_commit(&mut game, &addr("a"), board(), 3),
            Err(GameError::BoardAlreadyCommitted)
        );
    }

    #[test]
    fn test_wager_commit_requires_own_deposit() {
        let mut game = GameSession::new(1, addr("a"), addr("b"), 100, 100);
        assert_eq!(apply_board_commit(&mut game, &addr("a"), board(), 3), Err(GameError::StakesNotFunded));
        game.player1.deposited = true;
        assert!(apply_board_commit(&mut game, &addr("a"), board(), 3).is_ok());
    }

    #[test]
    fn test_attack_rules() {
        let mut game = ready_game(3);
        assert_eq!(check_attack(&game, &addr("b"), 0, 0), Err(GameError::NotYourTurn));
        assert_eq!(check_attack(&game, &addr("a"), 10, 0), Err(GameError::InvalidCoordinate));

        apply_attack(&mut game, &addr("a"), 1, 2).unwrap();
        assert_eq!(game.pending_defender(), Some(addr("b")));
        // turn does not move until resolution
        assert_eq!(game.turn, Some(addr("a")));
        assert_eq!(check_attack(&game, &addr("a"), 3, 3), Err(GameError::PendingAttackResolution));
    }

    #[test]
    fn test_resolution_flips_turn_and_records_shot() {
        let mut game = ready_game(3);
        apply_attack(&mut game, &addr("a"), 1, 2).unwrap();

        let (pending, expected) = check_resolution(&game, &addr("b")).unwrap();
        assert_eq!(pending.coord.index(), 21);
        assert_eq!(expected, [21u8; 32]);
        assert_eq!(check_resolution(&game, &addr("a")), Err(GameError::NotPendingDefender));

        let res = apply_resolution(&mut game, false).unwrap();
        assert!(!res.hit);
        assert_eq!(res.winner, None);
        assert_eq!(game.player1.attacks, vec![21]);
        assert!(game.player1.hit_attacks.is_empty());
        assert_eq!(game.turn, Some(addr("b")));
        assert_eq!(check_resolution(&game, &addr("b")), Err(GameError::NoPendingAttack));
    }

    #[test]
    fn test_no_reattack_of_same_cell() {
        let mut game = ready_game(3);
        apply_attack(&mut game, &addr("a"), 0, 0).unwrap();
        apply_resolution(&mut game, true).unwrap();
        apply_attack(&mut game, &addr("b"), 0, 0).unwrap();
        apply_resolution(&mut game, true).unwrap();
        assert_eq!(check_attack(&game, &addr("a"), 0, 0), Err(GameError::AlreadyAttacked));
    }

    #[test]
    fn test_win_clears_turn_and_blocks_play() {
        let mut game = ready_game(1);
        apply_attack(&mut game, &addr("a"), 0, 0).unwrap();
        let res = apply_resolution(&mut game, true).unwrap();

        assert_eq!(res.winner, Some(addr("a")));
        assert_eq!(game.phase(), GamePhase::Finished(addr("a")));
        assert_eq!(game.turn, None);
        assert_eq!(game.pending, None);
        assert_eq!(check_attack(&game, &addr("b"), 0, 0), Err(GameError::GameAlreadyEnded));
        assert_eq!(check_resolution(&game, &addr("b")), Err(GameError::GameAlreadyEnded));
    }
}
