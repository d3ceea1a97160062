//! Escrow & Payout
//!
//! Stakes move from players into the escrow account on deposit and out to
//! the winner (minus the protocol fee) exactly once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::address::Address;
use crate::game::error::GameError;
use crate::game::state::GameSession;
use crate::{BPS_DENOMINATOR, MAX_FEE_BPS};

/// Balance ledger for the bet token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Token contract identity.
    pub token: Address,
    balances: BTreeMap<Address, i128>,
}

impl TokenLedger {
    /// Empty ledger for `token`.
    pub fn new(token: Address) -> Self {
        Self {
            token,
            balances: BTreeMap::new(),
        }
    }

    /// Credit an account out of thin air (faucet / test setup).
    pub fn mint(&mut self, to: Address, amount: i128) {
        let balance = self.balances.entry(to).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Current balance.
    pub fn balance(&self, account: &Address) -> i128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Move `amount` between accounts.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: i128) -> Result<(), GameError> {
        if amount < 0 {
            return Err(GameError::InvalidStakeAmount);
        }
        let available = self.balance(from);
        if available < amount {
            return Err(GameError::InsufficientBalance);
        }
        self.balances.insert(*from, available - amount);
        self.mint(*to, amount);
        Ok(())
    }
}

/// Funds released when a game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Winner account.
    pub winner: Address,
    /// Amount sent to the winner.
    pub winner_amount: i128,
    /// Fee account.
    pub fee_recipient: Address,
    /// Amount sent to the fee account.
    pub fee_amount: i128,
}

/// Fee must lie in `0..=MAX_FEE_BPS`.
pub fn validate_fee_bps(fee_bps: u32) -> Result<u32, GameError> {
    if fee_bps > MAX_FEE_BPS {
        Err(GameError::InvalidFeeBps)
    } else {
        Ok(fee_bps)
    }
}

/// Split a pot into `(winner_amount, fee_amount)`.
///
/// The winner share is rounded down; the remainder goes to the fee.
pub fn split_pot(pot: i128, fee_bps: u32) -> (i128, i128) {
    let keep = BPS_DENOMINATOR - i128::from(fee_bps.min(MAX_FEE_BPS));
    let winner_amount = pot.saturating_mul(keep) / BPS_DENOMINATOR;
    (winner_amount, pot.saturating_sub(winner_amount))
}

/// Escrow parameters fixed for a settlement.
#[derive(Clone, Copy, Debug)]
pub struct SettlementTerms {
    /// Account holding the stakes.
    pub escrow: Address,
    /// Fee in basis points.
    pub fee_bps: u32,
    /// Fee account.
    pub fee_recipient: Address,
}

/// Pay out a finished game.
///
/// Returns `Ok(None)` when the payout already happened; nothing moves twice.
pub fn settle(
    game: &mut GameSession,
    token: Option<&mut TokenLedger>,
    terms: SettlementTerms,
) -> Result<Option<Payout>, GameError> {
    if game.payout_processed {
        return Ok(None);
    }
    let winner = game.winner.ok_or(GameError::GameNotFinished)?;

    if !game.is_wager() {
        game.payout_processed = true;
        return Ok(Some(Payout {
            winner,
            winner_amount: 0,
            fee_recipient: terms.fee_recipient,
            fee_amount: 0,
        }));
    }

    if !game.stakes_funded() {
        return Err(GameError::StakesNotFunded);
    }
    let token = token.ok_or(GameError::BetTokenNotConfigured)?;

    let pot = game.pot();
    let (winner_amount, fee_amount) = split_pot(pot, terms.fee_bps);
    if token.balance(&terms.escrow) < pot {
        return Err(GameError::InsufficientBalance);
    }

    if winner_amount > 0 {
        token.transfer(&terms.escrow, &winner, winner_amount)?;
    }
    if fee_amount > 0 {
        token.transfer(&terms.escrow, &terms.fee_recipient, fee_amount)?;
    }
    game.payout_processed = true;

    info!(
        "Session {} paid out: {} to winner {}, {} fee to {}",
        game.session_id,
        winner_amount,
        winner.short(),
        fee_amount,
        terms.fee_recipient.short()
    );

    Ok(Some(Payout {
        winner,
        winner_amount,
        fee_recipient: terms.fee_recipient,
        fee_amount,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> SettlementTerms {
        SettlementTerms {
            escrow: Address::derive("escrow"),
            fee_bps: 500,
            fee_recipient: Address::derive("fees"),
        }
    }

    fn finished_wager() -> (GameSession, TokenLedger) {
        let a = Address::derive("a");
        let mut game = GameSession::new(1, a, Address::derive("b"), 1000, 1000);
        game.player1.deposited = true;
        game.player2.deposited = true;
        game.winner = Some(a);

        let mut token = TokenLedger::new(Address::derive("token"));
        token.mint(terms().escrow, 2000);
        (game, token)
    }

    #[test]
    fn test_split_pot() {
        assert_eq!(split_pot(2000, 500), (1900, 100));
        assert_eq!(split_pot(2000, 0), (2000, 0));
        assert_eq!(split_pot(2000, 2000), (1600, 400));
        // remainder goes to the fee
        assert_eq!(split_pot(3, 500), (2, 1));
    }

    #[test]
    fn test_fee_bounds() {
        assert_eq!(validate_fee_bps(2000), Ok(2000));
        assert_eq!(validate_fee_bps(2001), Err(GameError::InvalidFeeBps));
    }

    #[test]
    fn test_settle_pays_once() {
        let (mut game, mut token) = finished_wager();
        let winner = game.winner.unwrap();

        let payout = settle(&mut game, Some(&mut token), terms()).unwrap().unwrap();
        assert_eq!(payout.winner_amount, 1900);
        assert_eq!(payout.fee_amount, 100);
        assert_eq!(token.balance(&winner), 1900);
        assert_eq!(token.balance(&terms().fee_recipient), 100);
        assert_eq!(token.balance(&terms().escrow), 0);
        assert!(game.payout_processed);

        assert_eq!(settle(&mut game, Some(&mut token), terms()), Ok(None));
        assert_eq!(token.balance(&winner), 1900);
    }

    #[test]
    fn test_settle_requires_winner_and_token() {
        let (mut game, mut token) = finished_wager();
        game.winner = None;
        assert_eq!(settle(&mut game, Some(&mut token), terms()), Err(GameError::GameNotFinished));

        game.winner = Some(Address::derive("a"));
        assert_eq!(settle(&mut game, None, terms()), Err(GameError::BetTokenNotConfigured));
        assert!(!game.payout_processed);
    }

    #[test]
    fn test_free_play_settles_without_transfers() {
        let a = Address::derive("a");
        let mut game = GameSession::new(1, a, Address::derive("b"), 0, 0);
        game.winner = Some(a);

        let payout = settle(&mut game, None, terms()).unwrap().unwrap();
        assert_eq!(payout.winner_amount, 0);
        assert!(game.payout_processed);
    }

    #[test]
    fn test_transfer_checks_balance() {
        let mut token = TokenLedger::new(Address::derive("token"));
        let a = Address::derive("a");
        let b = Address::derive("b");
        token.mint(a, 10);
        assert_eq!(token.transfer(&a, &b, 11), Err(GameError::InsufficientBalance));
        token.transfer(&a, &b, 10).unwrap();
        assert_eq!(token.balance(&b), 10);
    }
}
