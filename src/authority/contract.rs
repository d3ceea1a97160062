//! Battleship Authority
//!
//! The system of record. Owns every [`GameSession`], the delegation grants,
//! the bet token ledger and the verifier settings, and exposes the contract
//! surface the clients call.
//!
//! ## Atomicity
//!
//! Each state-changing call validates against a working copy of the session
//! (and of the token ledger when funds move) and writes the copies back only
//! when every check passed. A failed call leaves no trace, except that an
//! expired delegation grant is dropped when a delegate tries to use it.
//!
//! ## Callers
//!
//! The first argument of every state-changing call is the authenticated
//! caller. Direct calls require `caller == player`; the `_by_session`
//! variants take the delegate as caller and consult the grant store.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::authority::config::AuthorityConfig;
use crate::core::address::Address;
use crate::core::hash::Hash32;
use crate::game::delegation::{GrantKey, GrantStore, SessionGrant};
use crate::game::error::GameError;
use crate::game::escrow::{self, Payout, SettlementTerms, TokenLedger};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::rules::{self, Resolution};
use crate::game::state::{GameSession, PendingAttack};
use crate::proof::attestation::{
    attack_signature_message, board_signature_message, verify_signature, SIGNATURE_LEN,
};
use crate::proof::commitment::{
    board_proof_hash, commitment_root, resolution_proof_hash, verify_cell_reveal, Commitment, Salt,
};
use crate::proof::verifier::ZkVerifier;

/// Signature-mode attestation attached to a board commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardAttestation {
    /// `keccak(ship_cells_be32 ++ root)`.
    pub proof_hash: Hash32,
    /// Prover signature over the board message.
    pub signature: [u8; SIGNATURE_LEN],
}

/// Public reveal of the attacked cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellReveal {
    /// Claimed cell content.
    pub is_ship: bool,
    /// Salt used at commit time.
    pub salt: Salt,
    /// `keccak(is_ship ++ salt ++ x ++ y)`.
    pub proof_hash: Hash32,
    /// Prover signature, required when a verifier key is configured.
    pub signature: Option<[u8; SIGNATURE_LEN]>,
}

/// Authoritative game ledger.
#[derive(Debug)]
pub struct BattleshipAuthority {
    admin: Address,
    escrow: Address,
    verifier_key: Option<[u8; 32]>,
    zk_verifier: Option<Arc<dyn ZkVerifier>>,
    bet_token: Option<Address>,
    token_ledgers: BTreeMap<Address, TokenLedger>,
    fee_bps: u32,
    fee_recipient: Address,
    sessions: BTreeMap<u32, GameSession>,
    grants: GrantStore,
    ledger: u32,
    events: VecDeque<GameEvent>,
    event_buffer: usize,
    event_seq: u64,
}

impl BattleshipAuthority {
    /// Create an authority from configuration.
    pub fn new(config: AuthorityConfig) -> Self {
        info!(
            "Authority online (admin {}, fee {} bps, signature verifier {})",
            config.admin.short(),
            config.fee_bps,
            if config.verifier_key.is_some() { "on" } else { "off" }
        );
        Self {
            admin: config.admin,
            escrow: config.escrow,
            verifier_key: config.verifier_key,
            zk_verifier: None,
            bet_token: None,
            token_ledgers: BTreeMap::new(),
            fee_bps: config.fee_bps.min(crate::MAX_FEE_BPS),
            fee_recipient: config.fee_recipient,
            sessions: BTreeMap::new(),
            grants: GrantStore::new(),
            ledger: config.initial_ledger,
            events: VecDeque::new(),
            event_buffer: config.event_buffer.max(1),
            event_seq: 0,
        }
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Open a new session. Either player may submit it.
    pub fn start_game(
        &mut self,
        caller: &Address,
        session_id: u32,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
    ) -> Result<(), GameError> {
        if *caller != player1 && *caller != player2 {
            return Err(GameError::Unauthorized);
        }
        if player1 == player2 {
            return Err(GameError::NotPlayer);
        }
        if player1_points < 0 || player2_points < 0 {
            return Err(GameError::InvalidStakeAmount);
        }
        if self.sessions.contains_key(&session_id) {
            return Err(GameError::SessionAlreadyExists);
        }

        let game = GameSession::new(session_id, player1, player2, player1_points, player2_points);
        self.sessions.insert(session_id, game);

        info!(
            "Session {} started: {} ({}) vs {} ({})",
            session_id,
            player1.short(),
            player1_points,
            player2.short(),
            player2_points
        );
        self.emit(
            session_id,
            GameEventData::GameStarted {
                player1,
                player2,
                player1_points,
                player2_points,
            },
        );
        Ok(())
    }

    /// Move a player's agreed stake into escrow.
    ///
    /// Free-play sessions accept the call as a no-op.
    pub fn deposit_stake(
        &mut self,
        caller: &Address,
        session_id: u32,
        player: &Address,
        amount: i128,
    ) -> Result<(), GameError> {
        if caller != player {
            return Err(GameError::Unauthorized);
        }
        let mut game = self.working_copy(session_id)?;
        if game.winner.is_some() || game.payout_processed {
            return Err(GameError::GameAlreadyEnded);
        }
        let seat = game.seat_of(player).ok_or(GameError::NotPlayer)?;
        if !game.is_wager() {
            return Ok(());
        }

        let slot = game.slot(seat);
        if amount <= 0 || amount != slot.points {
            return Err(GameError::InvalidStakeAmount);
        }
        if slot.deposited {
            return Err(GameError::AlreadyDeposited);
        }

        let mut token = self.active_ledger().ok_or(GameError::BetTokenNotConfigured)?;
        token.transfer(player, &self.escrow, amount)?;
        game.slot_mut(seat).deposited = true;

        self.sessions.insert(session_id, game);
        self.store_ledger(Some(token));

        info!("Session {}: {} deposited {}", session_id, player.short(), amount);
        self.emit(session_id, GameEventData::StakeDeposited { player: *player, amount });
        Ok(())
    }

    // =========================================================================
    // Board commitment
    // =========================================================================

    /// Store a board in signature (or open) mode.
    ///
    /// With a verifier key configured the attestation is mandatory and must
    /// carry the board proof hash signed by the prover.
    pub fn commit_board(
        &mut self,
        caller: &Address,
        session_id: u32,
        player: &Address,
        commitments: Vec<Commitment>,
        ship_cells: u32,
        attestation: Option<BoardAttestation>,
    ) -> Result<(), GameError> {
        if caller != player {
            return Err(GameError::Unauthorized);
        }
        let mut game = self.working_copy(session_id)?;
        rules::check_board_commit(&game, player, commitments.len(), ship_cells)?;

        if self.zk_verifier.is_some() {
            return Err(GameError::ZkProofRequired);
        }
        if let Some(key) = &self.verifier_key {
            let attestation = attestation.ok_or(GameError::MissingProofSignature)?;
            let root = commitment_root(&commitments);
            if attestation.proof_hash != board_proof_hash(ship_cells, &root) {
                return Err(GameError::InvalidProofHash);
            }
            let message = board_signature_message(session_id, ship_cells, &root, &attestation.proof_hash);
            if !verify_signature(key, &message, &attestation.signature) {
                warn!("Session {}: board signature from {} rejected", session_id, player.short());
                return Err(GameError::InvalidProofSignature);
            }
        }

        rules::apply_board_commit(&mut game, player, commitments, ship_cells)?;
        self.commit_board_state(game, player, ship_cells, false);
        Ok(())
    }

    /// Store a board in proof mode.
    pub fn commit_board_zk(
        &mut self,
        caller: &Address,
        session_id: u32,
        player: &Address,
        commitments: Vec<Commitment>,
        ship_cells: u32,
        proof: &[u8],
    ) -> Result<(), GameError> {
        if caller != player {
            return Err(GameError::Unauthorized);
        }
        let verifier = self.zk_verifier.clone().ok_or(GameError::ZkVerifierNotConfigured)?;
        let mut game = self.working_copy(session_id)?;
        rules::check_board_commit(&game, player, commitments.len(), ship_cells)?;

        let root = commitment_root(&commitments);
        verifier.verify_board(session_id, ship_cells, &root, proof).map_err(|e| {
            warn!("Session {}: board proof from {} rejected: {}", session_id, player.short(), e);
            GameError::ZkVerificationFailed
        })?;

        rules::apply_board_commit(&mut game, player, commitments, ship_cells)?;
        self.commit_board_state(game, player, ship_cells, true);
        Ok(())
    }

    fn commit_board_state(&mut self, game: GameSession, player: &Address, ship_cells: u32, zk: bool) {
        let session_id = game.session_id;
        let ready = game.boards_ready();
        self.sessions.insert(session_id, game);

        info!(
            "Session {}: board committed by {} ({} ship cells{})",
            session_id,
            player.short(),
            ship_cells,
            if zk { ", proof mode" } else { "" }
        );
        if ready {
            info!("Session {}: both boards in, player 1 to move", session_id);
        }
        self.emit(
            session_id,
            GameEventData::BoardCommitted {
                player: *player,
                ship_cells,
                zk,
            },
        );
    }

    // =========================================================================
    // Attack
    // =========================================================================

    /// Fire at `(x, y)` on the opponent's board.
    pub fn attack(
        &mut self,
        caller: &Address,
        session_id: u32,
        attacker: &Address,
        x: u32,
        y: u32,
    ) -> Result<PendingAttack, GameError> {
        if caller != attacker {
            return Err(GameError::Unauthorized);
        }
        self.attack_inner(session_id, attacker, x, y, false)
    }

    /// [`Self::attack`] submitted by a delegate.
    pub fn attack_by_session(
        &mut self,
        caller: &Address,
        session_id: u32,
        attacker: &Address,
        x: u32,
        y: u32,
    ) -> Result<PendingAttack, GameError> {
        let key = GrantKey::new(session_id, *attacker, *caller);
        self.grants.check(&key, self.ledger)?;
        let pending = self.attack_inner(session_id, attacker, x, y, true)?;
        self.grants.consume(&key, self.ledger)?;
        Ok(pending)
    }

    fn attack_inner(
        &mut self,
        session_id: u32,
        attacker: &Address,
        x: u32,
        y: u32,
        delegated: bool,
    ) -> Result<PendingAttack, GameError> {
        let mut game = self.working_copy(session_id)?;
        let pending = rules::apply_attack(&mut game, attacker, x, y)?;
        self.sessions.insert(session_id, game);

        info!(
            "Session {}: {} attacks {} ({})",
            session_id,
            attacker.short(),
            pending.coord,
            if delegated { "delegate" } else { "direct" }
        );
        self.emit(
            session_id,
            GameEventData::AttackMade {
                attacker: pending.attacker,
                defender: pending.defender,
                coord: pending.coord,
                delegated,
            },
        );
        Ok(pending)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Reveal the attacked cell.
    pub fn resolve_attack(
        &mut self,
        caller: &Address,
        session_id: u32,
        defender: &Address,
        reveal: &CellReveal,
    ) -> Result<Resolution, GameError> {
        if caller != defender {
            return Err(GameError::Unauthorized);
        }
        self.resolve_inner(session_id, defender, reveal)
    }

    /// [`Self::resolve_attack`] submitted by a delegate.
    pub fn resolve_attack_by_session(
        &mut self,
        caller: &Address,
        session_id: u32,
        defender: &Address,
        reveal: &CellReveal,
    ) -> Result<Resolution, GameError> {
        let key = GrantKey::new(session_id, *defender, *caller);
        self.grants.check(&key, self.ledger)?;
        let resolution = self.resolve_inner(session_id, defender, reveal)?;
        self.grants.consume(&key, self.ledger)?;
        Ok(resolution)
    }

    /// Resolve with an opaque proof instead of a public reveal.
    pub fn resolve_attack_zk(
        &mut self,
        caller: &Address,
        session_id: u32,
        defender: &Address,
        proof: &[u8],
    ) -> Result<Resolution, GameError> {
        if caller != defender {
            return Err(GameError::Unauthorized);
        }
        self.resolve_zk_inner(session_id, defender, proof)
    }

    /// [`Self::resolve_attack_zk`] submitted by a delegate.
    pub fn resolve_attack_zk_by_session(
        &mut self,
        caller: &Address,
        session_id: u32,
        defender: &Address,
        proof: &[u8],
    ) -> Result<Resolution, GameError> {
        let key = GrantKey::new(session_id, *defender, *caller);
        self.grants.check(&key, self.ledger)?;
        let resolution = self.resolve_zk_inner(session_id, defender, proof)?;
        self.grants.consume(&key, self.ledger)?;
        Ok(resolution)
    }

    fn resolve_inner(
        &mut self,
        session_id: u32,
        defender: &Address,
        reveal: &CellReveal,
    ) -> Result<Resolution, GameError> {
        let game = self.working_copy(session_id)?;
        let (pending, expected) = rules::check_resolution(&game, defender)?;

        if self.zk_verifier.is_some() {
            return Err(GameError::ZkProofRequired);
        }
        if !verify_cell_reveal(&expected, reveal.is_ship, &reveal.salt) {
            warn!(
                "Session {}: reveal from {} at {} does not match commitment",
                session_id,
                defender.short(),
                pending.coord
            );
            return Err(GameError::InvalidCellReveal);
        }
        if reveal.proof_hash != resolution_proof_hash(reveal.is_ship, &reveal.salt, pending.coord) {
            return Err(GameError::InvalidProofHash);
        }
        if let Some(key) = &self.verifier_key {
            let signature = reveal.signature.ok_or(GameError::MissingProofSignature)?;
            let message = attack_signature_message(session_id, pending.coord, reveal.is_ship, &reveal.proof_hash);
            if !verify_signature(key, &message, &signature) {
                return Err(GameError::InvalidProofSignature);
            }
        }

        self.finish_resolution(game, reveal.is_ship)
    }

    fn resolve_zk_inner(&mut self, session_id: u32, defender: &Address, proof: &[u8]) -> Result<Resolution, GameError> {
        let verifier = self.zk_verifier.clone().ok_or(GameError::ZkVerifierNotConfigured)?;
        let game = self.working_copy(session_id)?;
        let (pending, expected) = rules::check_resolution(&game, defender)?;

        let is_ship = verifier
            .verify_attack(session_id, pending.coord, &expected, proof)
            .map_err(|e| {
                warn!("Session {}: attack proof from {} rejected: {}", session_id, defender.short(), e);
                GameError::ZkVerificationFailed
            })?;

        self.finish_resolution(game, is_ship)
    }

    /// Apply a verified reveal; settles the pot in the same step when the
    /// shot wins the game.
    fn finish_resolution(&mut self, mut game: GameSession, is_ship: bool) -> Result<Resolution, GameError> {
        let session_id = game.session_id;
        let resolution = rules::apply_resolution(&mut game, is_ship)?;

        let mut token = self.active_ledger();
        let payout = match resolution.winner {
            Some(_) => escrow::settle(&mut game, token.as_mut(), self.terms())?,
            None => None,
        };

        self.sessions.insert(session_id, game);
        self.store_ledger(token);

        info!(
            "Session {}: {} at {} ({} hits for {})",
            session_id,
            if resolution.hit { "HIT" } else { "miss" },
            resolution.coord,
            resolution.attacker_hits,
            resolution.attacker.short()
        );
        self.emit(
            session_id,
            GameEventData::AttackResolved {
                attacker: resolution.attacker,
                defender: resolution.defender,
                coord: resolution.coord,
                hit: resolution.hit,
                attacker_hits: resolution.attacker_hits,
            },
        );
        if let Some(winner) = resolution.winner {
            info!("Session {} won by {}", session_id, winner.short());
            self.emit(session_id, GameEventData::GameEnded { winner });
        }
        if let Some(payout) = payout {
            self.emit(session_id, GameEventData::PayoutSettled { payout });
        }
        Ok(resolution)
    }

    // =========================================================================
    // Payout
    // =========================================================================

    /// Release escrow for a finished game. Anyone may call it.
    ///
    /// Returns `Ok(None)` once the payout was processed.
    pub fn settle_payout(&mut self, session_id: u32) -> Result<Option<Payout>, GameError> {
        let mut game = self.working_copy(session_id)?;
        let mut token = self.active_ledger();
        let payout = escrow::settle(&mut game, token.as_mut(), self.terms())?;

        self.sessions.insert(session_id, game);
        self.store_ledger(token);
        if let Some(payout) = payout {
            self.emit(session_id, GameEventData::PayoutSettled { payout });
        }
        Ok(payout)
    }

    fn active_ledger(&self) -> Option<TokenLedger> {
        self.bet_token.and_then(|token| self.token_ledgers.get(&token).cloned())
    }

    fn store_ledger(&mut self, ledger: Option<TokenLedger>) {
        if let Some(ledger) = ledger {
            self.token_ledgers.insert(ledger.token, ledger);
        }
    }

    /// Some wagered game has real stakes in escrow and no payout yet.
    fn escrow_locked(&self) -> bool {
        self.sessions.values().any(|game| {
            game.is_wager()
                && !game.payout_processed
                && [&game.player1, &game.player2]
                    .iter()
                    .any(|slot| slot.deposited && slot.points > 0)
        })
    }

    fn terms(&self) -> SettlementTerms {
        SettlementTerms {
            escrow: self.escrow,
            fee_bps: self.fee_bps,
            fee_recipient: self.fee_recipient,
        }
    }

    // =========================================================================
    // Delegation
    // =========================================================================

    /// Let `delegate` attack and resolve for `player` in this session.
    pub fn authorize_session(
        &mut self,
        caller: &Address,
        session_id: u32,
        player: &Address,
        delegate: &Address,
        ttl_ledgers: u32,
        uses_left: u32,
    ) -> Result<SessionGrant, GameError> {
        if caller != player {
            return Err(GameError::Unauthorized);
        }
        let game = self.sessions.get(&session_id).ok_or(GameError::GameNotFound)?;
        if game.seat_of(player).is_none() {
            return Err(GameError::NotPlayer);
        }

        let key = GrantKey::new(session_id, *player, *delegate);
        let grant = self.grants.authorize(key, self.ledger, ttl_ledgers, uses_left)?;
        self.emit(
            session_id,
            GameEventData::SessionAuthorized {
                player: *player,
                delegate: *delegate,
                expires_ledger: grant.expires_ledger,
                uses_left: grant.uses_left,
            },
        );
        Ok(grant)
    }

    /// Delete a grant. Revoking a missing grant succeeds.
    pub fn revoke_session(
        &mut self,
        caller: &Address,
        session_id: u32,
        player: &Address,
        delegate: &Address,
    ) -> Result<(), GameError> {
        if caller != player {
            return Err(GameError::Unauthorized);
        }
        if self.grants.revoke(&GrantKey::new(session_id, *player, *delegate)) {
            debug!("Session {}: {} revoked {}", session_id, player.short(), delegate.short());
            self.emit(
                session_id,
                GameEventData::SessionRevoked {
                    player: *player,
                    delegate: *delegate,
                },
            );
        }
        Ok(())
    }

    /// Current grant, if any.
    pub fn get_session(&self, session_id: u32, player: &Address, delegate: &Address) -> Option<SessionGrant> {
        self.grants.get(&GrantKey::new(session_id, *player, *delegate))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of a session.
    pub fn get_game(&self, session_id: u32) -> Result<GameSession, GameError> {
        self.sessions.get(&session_id).cloned().ok_or(GameError::GameNotFound)
    }

    /// Signature-mode verifier key.
    pub fn get_verifier(&self) -> Option<[u8; 32]> {
        self.verifier_key
    }

    /// Proof-mode verifier address.
    pub fn get_zk_verifier(&self) -> Option<Address> {
        self.zk_verifier.as_ref().map(|v| v.address())
    }

    /// Bet token address.
    pub fn get_bet_token(&self) -> Option<Address> {
        self.bet_token
    }

    /// Fee in basis points.
    pub fn get_fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Fee account.
    pub fn get_fee_recipient(&self) -> Address {
        self.fee_recipient
    }

    /// Admin account.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Escrow account.
    pub fn escrow(&self) -> Address {
        self.escrow
    }

    /// Balance in the active bet token (0 without a token).
    pub fn token_balance(&self, account: &Address) -> i128 {
        self.bet_token
            .and_then(|token| self.token_ledgers.get(&token))
            .map_or(0, |ledger| ledger.balance(account))
    }

    /// Number of sessions ever started.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // =========================================================================
    // Admin
    // =========================================================================

    fn require_admin(&self, caller: &Address) -> Result<(), GameError> {
        if *caller == self.admin {
            Ok(())
        } else {
            Err(GameError::Unauthorized)
        }
    }

    /// Hand admin rights to another account.
    pub fn set_admin(&mut self, caller: &Address, new_admin: Address) -> Result<(), GameError> {
        self.require_admin(caller)?;
        info!("Admin changed {} -> {}", self.admin.short(), new_admin.short());
        self.admin = new_admin;
        Ok(())
    }

    /// Trust a signature-mode attestation key.
    pub fn set_verifier(&mut self, caller: &Address, key: [u8; 32]) -> Result<(), GameError> {
        self.require_admin(caller)?;
        self.verifier_key = Some(key);
        Ok(())
    }

    /// Turn signature mode off.
    pub fn clear_verifier(&mut self, caller: &Address) -> Result<(), GameError> {
        self.require_admin(caller)?;
        self.verifier_key = None;
        Ok(())
    }

    /// Switch to proof mode.
    pub fn set_zk_verifier(&mut self, caller: &Address, verifier: Arc<dyn ZkVerifier>) -> Result<(), GameError> {
        self.require_admin(caller)?;
        info!("Proof mode on (verifier {})", verifier.address().short());
        self.zk_verifier = Some(verifier);
        Ok(())
    }

    /// Leave proof mode.
    pub fn clear_zk_verifier(&mut self, caller: &Address) -> Result<(), GameError> {
        self.require_admin(caller)?;
        self.zk_verifier = None;
        Ok(())
    }

    /// Select the bet token. Every token keeps its own balances, so
    /// switching back restores them. The active token cannot change while
    /// escrow holds stakes of an unsettled game.
    pub fn set_bet_token(&mut self, caller: &Address, token: Address) -> Result<(), GameError> {
        self.require_admin(caller)?;
        if self.bet_token != Some(token) && self.escrow_locked() {
            return Err(GameError::EscrowLocked);
        }
        self.token_ledgers.entry(token).or_insert_with(|| TokenLedger::new(token));
        self.bet_token = Some(token);
        Ok(())
    }

    /// Deselect the bet token; wagered deposits fail afterwards.
    pub fn clear_bet_token(&mut self, caller: &Address) -> Result<(), GameError> {
        self.require_admin(caller)?;
        if self.bet_token.is_some() && self.escrow_locked() {
            return Err(GameError::EscrowLocked);
        }
        self.bet_token = None;
        Ok(())
    }

    /// Credit bet tokens to an account.
    pub fn mint_bet_token(&mut self, caller: &Address, to: Address, amount: i128) -> Result<(), GameError> {
        self.require_admin(caller)?;
        if amount <= 0 {
            return Err(GameError::InvalidStakeAmount);
        }
        let token = self.bet_token.ok_or(GameError::BetTokenNotConfigured)?;
        self.token_ledgers
            .entry(token)
            .or_insert_with(|| TokenLedger::new(token))
            .mint(to, amount);
        Ok(())
    }

    /// Protocol fee, `0..=2000` bps.
    pub fn set_fee_bps(&mut self, caller: &Address, fee_bps: u32) -> Result<(), GameError> {
        self.require_admin(caller)?;
        self.fee_bps = escrow::validate_fee_bps(fee_bps)?;
        Ok(())
    }

    /// Fee account.
    pub fn set_fee_recipient(&mut self, caller: &Address, recipient: Address) -> Result<(), GameError> {
        self.require_admin(caller)?;
        self.fee_recipient = recipient;
        Ok(())
    }

    // =========================================================================
    // Ledger clock & events
    // =========================================================================

    /// Current ledger sequence.
    pub fn ledger_sequence(&self) -> u32 {
        self.ledger
    }

    /// Close `n` ledgers.
    pub fn advance_ledger(&mut self, n: u32) -> u32 {
        self.ledger = self.ledger.saturating_add(n);
        self.ledger
    }

    /// Take all events emitted since the last drain.
    ///
    /// The host is expected to drain regularly; only the newest
    /// `event_buffer` events are kept in between.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, session_id: u32, data: GameEventData) {
        let event = GameEvent::new(self.ledger, self.event_seq, session_id, data);
        self.event_seq += 1;
        if self.events.len() >= self.event_buffer {
            if let Some(dropped) = self.events.pop_front() {
                debug!("Event buffer full, dropping event {}", dropped.seq);
            }
        }
        self.events.push_back(event);
    }

    fn working_copy(&self, session_id: u32) -> Result<GameSession, GameError> {
        self.get_game(session_id)
    }
}

impl Default for BattleshipAuthority {
    fn default() -> Self {
        Self::new(AuthorityConfig::default())
    }
}
