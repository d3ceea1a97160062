//! Authority API
//!
//! The call surface a client needs from the authority, abstracted from any
//! RPC encoding. [`SharedAuthority`] serves it from an in-process
//! [`BattleshipAuthority`]; a ledger-backed client would implement the same
//! trait over its transaction plumbing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use crate::authority::{BattleshipAuthority, BoardAttestation, CellReveal};
use crate::core::address::Address;
use crate::game::delegation::SessionGrant;
use crate::game::error::GameError;
use crate::game::rules::Resolution;
use crate::game::state::{GameSession, PendingAttack};
use crate::proof::commitment::Commitment;

/// Authority calls used by players and orchestrators.
///
/// `caller` is the key that signs the call: the player for direct calls,
/// the delegate for `_by_session` calls.
#[async_trait]
pub trait AuthorityApi: Send + Sync {
    /// Open a session.
    async fn start_game(
        &self,
        caller: Address,
        session_id: u32,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
    ) -> Result<(), GameError>;

    /// Escrow a stake.
    async fn deposit_stake(&self, caller: Address, session_id: u32, player: Address, amount: i128)
        -> Result<(), GameError>;

    /// Commit a board (open or signature mode).
    async fn commit_board(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        commitments: Vec<Commitment>,
        ship_cells: u32,
        attestation: Option<BoardAttestation>,
    ) -> Result<(), GameError>;

    /// Commit a board with a proof.
    async fn commit_board_zk(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        commitments: Vec<Commitment>,
        ship_cells: u32,
        proof: Vec<u8>,
    ) -> Result<(), GameError>;

    /// Fire directly.
    async fn attack(&self, caller: Address, session_id: u32, attacker: Address, x: u32, y: u32)
        -> Result<PendingAttack, GameError>;

    /// Fire through a delegate.
    async fn attack_by_session(
        &self,
        caller: Address,
        session_id: u32,
        attacker: Address,
        x: u32,
        y: u32,
    ) -> Result<PendingAttack, GameError>;

    /// Reveal directly.
    async fn resolve_attack(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        reveal: CellReveal,
    ) -> Result<Resolution, GameError>;

    /// Reveal through a delegate.
    async fn resolve_attack_by_session(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        reveal: CellReveal,
    ) -> Result<Resolution, GameError>;

    /// Resolve with a proof directly.
    async fn resolve_attack_zk(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        proof: Vec<u8>,
    ) -> Result<Resolution, GameError>;

    /// Resolve with a proof through a delegate.
    async fn resolve_attack_zk_by_session(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        proof: Vec<u8>,
    ) -> Result<Resolution, GameError>;

    /// Grant a delegate.
    async fn authorize_session(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        delegate: Address,
        ttl_ledgers: u32,
        uses_left: u32,
    ) -> Result<SessionGrant, GameError>;

    /// Remove a grant.
    async fn revoke_session(&self, caller: Address, session_id: u32, player: Address, delegate: Address)
        -> Result<(), GameError>;

    /// Look up a grant.
    async fn get_session(&self, session_id: u32, player: Address, delegate: Address) -> Option<SessionGrant>;

    /// Session snapshot.
    async fn get_game(&self, session_id: u32) -> Result<GameSession, GameError>;

    /// Signature-mode key.
    async fn get_verifier(&self) -> Option<[u8; 32]>;

    /// Proof-mode verifier.
    async fn get_zk_verifier(&self) -> Option<Address>;

    /// Bet token.
    async fn get_bet_token(&self) -> Option<Address>;

    /// Fee in basis points.
    async fn get_fee_bps(&self) -> u32;
}

/// In-process authority behind an async mutex.
///
/// The mutex serializes calls, so each call sees and leaves a consistent
/// session, matching one-transition-at-a-time ledger semantics.
#[derive(Clone, Debug)]
pub struct SharedAuthority {
    inner: Arc<Mutex<BattleshipAuthority>>,
}

impl SharedAuthority {
    /// Wrap an authority.
    pub fn new(authority: BattleshipAuthority) -> Self {
        Self {
            inner: Arc::new(Mutex::new(authority)),
        }
    }

    /// Direct access for admin calls and inspection.
    pub async fn lock(&self) -> MutexGuard<'_, BattleshipAuthority> {
        self.inner.lock().await
    }
}

#[async_trait]
impl AuthorityApi for SharedAuthority {
    async fn start_game(
        &self,
        caller: Address,
        session_id: u32,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
    ) -> Result<(), GameError> {
        self.lock()
            .await
            .start_game(&caller, session_id, player1, player2, player1_points, player2_points)
    }

    async fn deposit_stake(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        amount: i128,
    ) -> Result<(), GameError> {
        self.lock().await.deposit_stake(&caller, session_id, &player, amount)
    }

    async fn commit_board(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        commitments: Vec<Commitment>,
        ship_cells: u32,
        attestation: Option<BoardAttestation>,
    ) -> Result<(), GameError> {
        self.lock()
            .await
            .commit_board(&caller, session_id, &player, commitments, ship_cells, attestation)
    }

    async fn commit_board_zk(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        commitments: Vec<Commitment>,
        ship_cells: u32,
        proof: Vec<u8>,
    ) -> Result<(), GameError> {
        self.lock()
            .await
            .commit_board_zk(&caller, session_id, &player, commitments, ship_cells, &proof)
    }

    async fn attack(
        &self,
        caller: Address,
        session_id: u32,
        attacker: Address,
        x: u32,
        y: u32,
    ) -> Result<PendingAttack, GameError> {
        self.lock().await.attack(&caller, session_id, &attacker, x, y)
    }

    async fn attack_by_session(
        &self,
        caller: Address,
        session_id: u32,
        attacker: Address,
        x: u32,
        y: u32,
    ) -> Result<PendingAttack, GameError> {
        self.lock().await.attack_by_session(&caller, session_id, &attacker, x, y)
    }

    async fn resolve_attack(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        reveal: CellReveal,
    ) -> Result<Resolution, GameError> {
        self.lock().await.resolve_attack(&caller, session_id, &defender, &reveal)
    }

    async fn resolve_attack_by_session(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        reveal: CellReveal,
    ) -> Result<Resolution, GameError> {
        self.lock()
            .await
            .resolve_attack_by_session(&caller, session_id, &defender, &reveal)
    }

    async fn resolve_attack_zk(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        proof: Vec<u8>,
    ) -> Result<Resolution, GameError> {
        self.lock().await.resolve_attack_zk(&caller, session_id, &defender, &proof)
    }

    async fn resolve_attack_zk_by_session(
        &self,
        caller: Address,
        session_id: u32,
        defender: Address,
        proof: Vec<u8>,
    ) -> Result<Resolution, GameError> {
        self.lock()
            .await
            .resolve_attack_zk_by_session(&caller, session_id, &defender, &proof)
    }

    async fn authorize_session(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        delegate: Address,
        ttl_ledgers: u32,
        uses_left: u32,
    ) -> Result<SessionGrant, GameError> {
        self.lock()
            .await
            .authorize_session(&caller, session_id, &player, &delegate, ttl_ledgers, uses_left)
    }

    async fn revoke_session(
        &self,
        caller: Address,
        session_id: u32,
        player: Address,
        delegate: Address,
    ) -> Result<(), GameError> {
        self.lock().await.revoke_session(&caller, session_id, &player, &delegate)
    }

    async fn get_session(&self, session_id: u32, player: Address, delegate: Address) -> Option<SessionGrant> {
        self.lock().await.get_session(session_id, &player, &delegate)
    }

    async fn get_game(&self, session_id: u32) -> Result<GameSession, GameError> {
        self.lock().await.get_game(session_id)
    }

    async fn get_verifier(&self) -> Option<[u8; 32]> {
        self.lock().await.get_verifier()
    }

    async fn get_zk_verifier(&self) -> Option<Address> {
        self.lock().await.get_zk_verifier()
    }

    async fn get_bet_token(&self) -> Option<Address> {
        self.lock().await.get_bet_token()
    }

    async fn get_fee_bps(&self) -> u32 {
        self.lock().await.get_fee_bps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shared_authority_round_trip() {
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        let a = Address::derive("a");
        let b = Address::derive("b");

        shared.start_game(a, 1, a, b, 0, 0).await.unwrap();
        let game = shared.get_game(1).await.unwrap();
        assert_eq!(game.player1.address, a);
        assert_eq!(shared.get_fee_bps().await, 500);
        assert_eq!(shared.get_zk_verifier().await, None);

        // clones share the same authority
        let other = shared.clone();
        assert_eq!(other.lock().await.session_count(), 1);
    }
}
