//! Turn Orchestrator
//!
//! Drives one player's side of a session against the authority:
//!
//! ```text
//!            ┌──────────── poll (interval) ────────────┐
//!            ▼                                          │
//!      get_game(session)                                │
//!            │                                          │
//!   winner? ─┼─► Finished                               │
//!            │                                          │
//!   pending_defender == me? ─► reveal cell ─► resolve ──┤
//!            │                                          │
//!   turn == me? ─► pick target ─► attack ───────────────┤
//!            │                                          │
//!            └─► Waiting ───────────────────────────────┘
//! ```
//!
//! `tick` performs exactly one step so tests can drive the loop by hand;
//! `run` wraps it in a timer with a shutdown channel.
//!
//! A `NoPendingAttack` rejection while resolving means another actor got
//! there first and is reported as [`TickOutcome::AlreadyResolved`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::authority::CellReveal;
use crate::client::api::AuthorityApi;
use crate::client::attestation::{
    AttestationClient, AttestationError, AttestationPolicy, BoardEvidence, ResolutionEvidence,
};
use crate::client::board::LocalBoard;
use crate::client::prediction::{self, Reconciliation};
use crate::core::address::Address;
use crate::core::coord::Coord;
use crate::game::delegation::SessionGrant;
use crate::game::error::GameError;
use crate::game::rules::Resolution;
use crate::game::state::{GameSession, PendingAttack};

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Time between polls.
    pub poll_interval: Duration,
    /// Lifetime of a delegation grant, in ledgers.
    pub delegation_ttl_ledgers: u32,
    /// Calls a delegation grant allows.
    pub delegation_uses: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            delegation_ttl_ledgers: 720,
            delegation_uses: 100,
        }
    }
}

impl OrchestratorConfig {
    /// Load from `BROADSIDE_POLL_MS`, `BROADSIDE_DELEGATION_TTL` and
    /// `BROADSIDE_DELEGATION_USES`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: std::env::var("BROADSIDE_POLL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            delegation_ttl_ledgers: std::env::var("BROADSIDE_DELEGATION_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.delegation_ttl_ledgers),
            delegation_uses: std::env::var("BROADSIDE_DELEGATION_USES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.delegation_uses),
        }
    }
}

/// What one poll step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing for this player to do.
    Waiting,
    /// Fired at a cell.
    Attacked(Coord),
    /// Revealed the cell the opponent fired at.
    Resolved {
        /// Revealed cell.
        coord: Coord,
        /// Whether it was a ship.
        hit: bool,
    },
    /// Someone else resolved the pending attack first.
    AlreadyResolved,
    /// Game over.
    Finished {
        /// Winning player.
        winner: Address,
    },
    /// Our turn, but no target is queued.
    NoTarget,
}

/// Orchestrator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    /// Authority rejected a call.
    #[error("authority rejected the call: {0}")]
    Game(#[from] GameError),

    /// Attestation could not be obtained.
    #[error(transparent)]
    Attestation(#[from] AttestationError),
}

impl OrchestratorError {
    /// Transient failures worth retrying on the next poll.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrchestratorError::Attestation(AttestationError::Transport(_) | AttestationError::Timeout(_))
        )
    }
}

/// Counters for one orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    /// Poll steps taken.
    pub ticks: u64,
    /// Attacks submitted.
    pub attacks: u64,
    /// Resolutions submitted.
    pub resolutions: u64,
    /// Resolutions lost to another actor.
    pub already_resolved: u64,
    /// Predictions the authority agreed with.
    pub predictions_confirmed: u64,
    /// Predictions thrown away.
    pub predictions_discarded: u64,
    /// Delegated calls retried directly.
    pub delegation_fallbacks: u64,
}

// =============================================================================
// Target selection
// =============================================================================

/// Chooses where to fire next.
pub trait TargetSource: Send {
    /// Next untried coordinate, or `None` to wait.
    fn next_target(&mut self, game: &GameSession, player: &Address) -> Option<Coord>;
}

fn already_attacked(game: &GameSession, player: &Address, coord: Coord) -> bool {
    game.seat_of(player)
        .map(|seat| game.slot(seat).has_attacked(coord.index()))
        .unwrap_or(false)
}

/// Fires at the first untried cell in board order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanTargets;

impl TargetSource for ScanTargets {
    fn next_target(&mut self, game: &GameSession, player: &Address) -> Option<Coord> {
        Coord::all().find(|&coord| !already_attacked(game, player, coord))
    }
}

/// User-chosen targets, consumed in order; already-tried cells are skipped.
#[derive(Clone, Debug, Default)]
pub struct QueuedTargets {
    queue: VecDeque<Coord>,
}

impl QueuedTargets {
    /// Queue pre-filled with `targets`.
    pub fn new(targets: impl IntoIterator<Item = Coord>) -> Self {
        Self {
            queue: targets.into_iter().collect(),
        }
    }

    /// Add a target.
    pub fn push(&mut self, coord: Coord) {
        self.queue.push_back(coord);
    }

    /// Targets left.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Nothing queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl TargetSource for QueuedTargets {
    fn next_target(&mut self, game: &GameSession, player: &Address) -> Option<Coord> {
        while let Some(coord) = self.queue.pop_front() {
            if !already_attacked(game, player, coord) {
                return Some(coord);
            }
            debug!("Skipping {}: already attacked", coord);
        }
        None
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

enum ResolveMove {
    Reveal(CellReveal),
    Proof(Vec<u8>),
}

/// One player's turn loop.
pub struct TurnOrchestrator {
    api: Arc<dyn AuthorityApi>,
    attestation: AttestationClient,
    session_id: u32,
    player: Address,
    board: LocalBoard,
    targets: Box<dyn TargetSource>,
    config: OrchestratorConfig,
    delegate: Option<Address>,
    prediction: Option<GameSession>,
    stats: OrchestratorStats,
}

impl TurnOrchestrator {
    /// Orchestrator for `player` in `session_id`, scanning targets in order.
    pub fn new(
        api: Arc<dyn AuthorityApi>,
        attestation: AttestationClient,
        session_id: u32,
        player: Address,
        board: LocalBoard,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            api,
            attestation,
            session_id,
            player,
            board,
            targets: Box::new(ScanTargets),
            config,
            delegate: None,
            prediction: None,
            stats: OrchestratorStats::default(),
        }
    }

    /// Replace the target source.
    pub fn with_targets(mut self, targets: Box<dyn TargetSource>) -> Self {
        self.targets = targets;
        self
    }

    /// Player this orchestrator acts for.
    pub fn player(&self) -> Address {
        self.player
    }

    /// Session id.
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Secret board.
    pub fn board(&self) -> &LocalBoard {
        &self.board
    }

    /// Counters.
    pub fn stats(&self) -> OrchestratorStats {
        self.stats
    }

    /// Active delegate, if delegation is enabled.
    pub fn delegate(&self) -> Option<Address> {
        self.delegate
    }

    /// Deposit the agreed stake (wagered sessions) and commit the board.
    ///
    /// Steps already done on the authority are skipped.
    pub async fn join(&mut self) -> Result<(), OrchestratorError> {
        let game = self.api.get_game(self.session_id).await?;
        let seat = game.seat_of(&self.player).ok_or(GameError::NotPlayer)?;
        let slot = game.slot(seat);

        if game.is_wager() && !slot.deposited {
            self.api
                .deposit_stake(self.player, self.session_id, self.player, slot.points)
                .await?;
            info!("Session {}: {} deposited {}", self.session_id, self.player.short(), slot.points);
        }
        if slot.board.is_none() {
            self.commit_board().await?;
        }
        Ok(())
    }

    /// Commit the local board with whatever attestation the authority expects.
    pub async fn commit_board(&mut self) -> Result<(), OrchestratorError> {
        let policy = AttestationPolicy::from_authority(self.api.as_ref()).await;
        let ship_cells = self.board.ship_cells();
        let commitment = self.board.commitment().clone();

        let evidence = self
            .attestation
            .board_evidence(&policy, self.session_id, ship_cells, &commitment)
            .await?;

        match evidence {
            Some(BoardEvidence::Proof(proof)) => {
                self.api
                    .commit_board_zk(self.player, self.session_id, self.player, commitment.commitments, ship_cells, proof)
                    .await?
            }
            Some(BoardEvidence::Signature(attestation)) => {
                self.api
                    .commit_board(
                        self.player,
                        self.session_id,
                        self.player,
                        commitment.commitments,
                        ship_cells,
                        Some(attestation),
                    )
                    .await?
            }
            None => {
                self.api
                    .commit_board(self.player, self.session_id, self.player, commitment.commitments, ship_cells, None)
                    .await?
            }
        }

        info!(
            "Session {}: {} committed board {} ({:?} mode)",
            self.session_id,
            self.player.short(),
            hex::encode(&commitment.root[..4]),
            policy.mode
        );
        Ok(())
    }

    /// Authorize `delegate` and route attacks and resolutions through it.
    pub async fn enable_delegation(&mut self, delegate: Address) -> Result<SessionGrant, OrchestratorError> {
        let grant = self
            .api
            .authorize_session(
                self.player,
                self.session_id,
                self.player,
                delegate,
                self.config.delegation_ttl_ledgers,
                self.config.delegation_uses,
            )
            .await?;
        self.delegate = Some(delegate);
        info!(
            "Session {}: delegation to {} enabled until ledger {}",
            self.session_id,
            delegate.short(),
            grant.expires_ledger
        );
        Ok(grant)
    }

    /// Revoke the active grant and sign directly again.
    pub async fn disable_delegation(&mut self) -> Result<(), OrchestratorError> {
        if let Some(delegate) = self.delegate.take() {
            self.api
                .revoke_session(self.player, self.session_id, self.player, delegate)
                .await?;
            info!("Session {}: delegation to {} revoked", self.session_id, delegate.short());
        }
        Ok(())
    }

    /// One poll step.
    pub async fn tick(&mut self) -> Result<TickOutcome, OrchestratorError> {
        self.stats.ticks += 1;
        let game = self.api.get_game(self.session_id).await?;

        if let Some(winner) = game.winner {
            return Ok(TickOutcome::Finished { winner });
        }
        if game.pending_defender() == Some(self.player) {
            return self.resolve_pending(&game).await;
        }
        if game.pending.is_none() && game.turn == Some(self.player) {
            return self.attack_from(&game).await;
        }
        Ok(TickOutcome::Waiting)
    }

    /// Resolve the attack pending in `snapshot`, if it targets this player.
    pub async fn resolve_pending(&mut self, snapshot: &GameSession) -> Result<TickOutcome, OrchestratorError> {
        let Some(pending) = snapshot.pending.filter(|p| p.defender == self.player) else {
            return Ok(TickOutcome::Waiting);
        };
        let coord = pending.coord;
        let mut reveal = self.board.reveal(coord);
        let policy = AttestationPolicy::from_authority(self.api.as_ref()).await;

        let evidence = self
            .attestation
            .resolution_evidence(
                &policy,
                self.session_id,
                coord,
                reveal.is_ship,
                &reveal.proof_hash,
                &self.board.commitment_at(coord),
            )
            .await?;
        let resolve = match evidence {
            Some(ResolutionEvidence::Proof(proof)) => ResolveMove::Proof(proof),
            Some(ResolutionEvidence::Signature(signature)) => {
                reveal.signature = Some(signature);
                ResolveMove::Reveal(reveal)
            }
            None => ResolveMove::Reveal(reveal),
        };

        let predicted = prediction::predict_resolution(snapshot, &self.player, reveal.is_ship).ok();
        match self.submit_resolution(&resolve).await {
            Ok(resolution) => {
                self.stats.resolutions += 1;
                self.prediction = predicted;
                self.reconcile().await?;
                if let Some(winner) = resolution.winner {
                    info!("Session {}: {} sank the fleet", self.session_id, winner.short());
                }
                Ok(TickOutcome::Resolved {
                    coord,
                    hit: resolution.hit,
                })
            }
            Err(e @ (GameError::NoPendingAttack | GameError::GameAlreadyEnded | GameError::NotPendingDefender)) => {
                // another resolver may have won the race, possibly with the winning shot
                let current = self.api.get_game(self.session_id).await?;
                if let Some(winner) = current.winner {
                    self.stats.already_resolved += 1;
                    info!("Session {}: attack at {} already resolved, game over", self.session_id, coord);
                    return Ok(TickOutcome::Finished { winner });
                }
                if current.pending != Some(pending) {
                    self.stats.already_resolved += 1;
                    info!("Session {}: attack at {} already resolved", self.session_id, coord);
                    return Ok(TickOutcome::AlreadyResolved);
                }
                warn!("Session {}: resolve at {} rejected: {}", self.session_id, coord, e);
                Err(e.into())
            }
            Err(e) => {
                warn!("Session {}: resolve at {} rejected: {}", self.session_id, coord, e);
                Err(e.into())
            }
        }
    }

    /// Fire at the next target if `snapshot` says it is our move.
    pub async fn attack_from(&mut self, snapshot: &GameSession) -> Result<TickOutcome, OrchestratorError> {
        if snapshot.pending.is_some() || snapshot.turn != Some(self.player) {
            return Ok(TickOutcome::Waiting);
        }
        let Some(coord) = self.targets.next_target(snapshot, &self.player) else {
            return Ok(TickOutcome::NoTarget);
        };

        let predicted = prediction::predict_attack(snapshot, &self.player, coord).ok();
        let pending = self.submit_attack(coord).await.map_err(|e| {
            warn!("Session {}: attack at {} rejected: {}", self.session_id, coord, e);
            e
        })?;
        self.stats.attacks += 1;
        self.prediction = predicted;
        self.reconcile().await?;
        Ok(TickOutcome::Attacked(pending.coord))
    }

    async fn submit_attack(&mut self, coord: Coord) -> Result<PendingAttack, GameError> {
        if let Some(delegate) = self.delegate {
            match self
                .api
                .attack_by_session(delegate, self.session_id, self.player, coord.x, coord.y)
                .await
            {
                Err(e) if e.falls_back_to_direct() => self.drop_delegation(e),
                other => return other,
            }
        }
        self.api
            .attack(self.player, self.session_id, self.player, coord.x, coord.y)
            .await
    }

    async fn submit_resolution(&mut self, resolve: &ResolveMove) -> Result<Resolution, GameError> {
        if let Some(delegate) = self.delegate {
            let delegated = match resolve {
                ResolveMove::Reveal(reveal) => {
                    self.api
                        .resolve_attack_by_session(delegate, self.session_id, self.player, *reveal)
                        .await
                }
                ResolveMove::Proof(proof) => {
                    self.api
                        .resolve_attack_zk_by_session(delegate, self.session_id, self.player, proof.clone())
                        .await
                }
            };
            match delegated {
                Err(e) if e.falls_back_to_direct() => self.drop_delegation(e),
                other => return other,
            }
        }
        match resolve {
            ResolveMove::Reveal(reveal) => {
                self.api
                    .resolve_attack(self.player, self.session_id, self.player, *reveal)
                    .await
            }
            ResolveMove::Proof(proof) => {
                self.api
                    .resolve_attack_zk(self.player, self.session_id, self.player, proof.clone())
                    .await
            }
        }
    }

    fn drop_delegation(&mut self, reason: GameError) {
        warn!(
            "Session {}: delegated call failed ({}), signing directly; re-enable delegation to resume",
            self.session_id, reason
        );
        self.delegate = None;
        self.stats.delegation_fallbacks += 1;
    }

    async fn reconcile(&mut self) -> Result<Reconciliation, OrchestratorError> {
        let actual = self.api.get_game(self.session_id).await?;
        let result = prediction::reconcile(self.prediction.take(), &actual);
        match result {
            Reconciliation::Confirmed => self.stats.predictions_confirmed += 1,
            Reconciliation::Diverged { .. } => self.stats.predictions_discarded += 1,
            Reconciliation::NoPrediction => {}
        }
        Ok(result)
    }

    /// Poll until the game ends or `shutdown` fires.
    ///
    /// Returns the winner, or `None` on shutdown. Transient attestation
    /// failures are retried on the next poll; rule and verification
    /// failures stop the loop.
    #[instrument(skip_all, fields(session = self.session_id, player = %self.player.short()))]
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) -> Result<Option<Address>, OrchestratorError> {
        let mut poll = interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    match self.tick().await {
                        Ok(TickOutcome::Finished { winner }) => {
                            info!("Game over, winner {}", winner.short());
                            return Ok(Some(winner));
                        }
                        Ok(outcome) => debug!("Tick: {:?}", outcome),
                        Err(e) if e.is_retryable() => warn!("Tick failed, retrying next poll: {}", e),
                        Err(e) => {
                            error!("Tick failed: {}", e);
                            return Err(e);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutdown signal received");
                    return Ok(None);
                }
            }
        }
    }
}

impl std::fmt::Debug for TurnOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnOrchestrator")
            .field("session_id", &self.session_id)
            .field("player", &self.player)
            .field("delegate", &self.delegate)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::BattleshipAuthority;
    use crate::client::api::SharedAuthority;
    use crate::client::attestation::{AttestationMode, LocalAttestor};
    use crate::game::events::GameEventData;
    use crate::proof::attestation::AttestationSigner;
    use crate::proof::verifier::SignatureZkVerifier;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ID: u32 = 3;

    fn a() -> Address {
        Address::derive("alice")
    }

    fn b() -> Address {
        Address::derive("bob")
    }

    async fn setup(shared: &SharedAuthority) -> (TurnOrchestrator, TurnOrchestrator) {
        setup_with(shared, AttestationClient::disabled()).await
    }

    async fn setup_with(shared: &SharedAuthority, attestation: AttestationClient) -> (TurnOrchestrator, TurnOrchestrator) {
        let mut rng = StdRng::seed_from_u64(11);
        let board_a = LocalBoard::with_ships(&mut rng, &[Coord::new(9, 9).unwrap()]);
        let board_b = LocalBoard::with_ships(&mut rng, &[Coord::new(3, 0).unwrap()]);
        shared.start_game(a(), ID, a(), b(), 0, 0).await.unwrap();

        let api: Arc<dyn AuthorityApi> = Arc::new(shared.clone());
        let mut alice = TurnOrchestrator::new(
            api.clone(),
            attestation.clone(),
            ID,
            a(),
            board_a,
            OrchestratorConfig::default(),
        );
        let mut bob = TurnOrchestrator::new(
            api,
            attestation,
            ID,
            b(),
            board_b,
            OrchestratorConfig::default(),
        );
        alice.join().await.unwrap();
        bob.join().await.unwrap();
        (alice, bob)
    }

    #[tokio::test]
    async fn test_alternating_ticks_play_to_the_end() {
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        let (mut alice, mut bob) = setup(&shared).await;

        assert_eq!(bob.tick().await.unwrap(), TickOutcome::Waiting);
        assert_eq!(alice.tick().await.unwrap(), TickOutcome::Attacked(Coord::new(0, 0).unwrap()));
        assert_eq!(
            bob.tick().await.unwrap(),
            TickOutcome::Resolved {
                coord: Coord::new(0, 0).unwrap(),
                hit: false
            }
        );

        let mut winner = None;
        for _ in 0..50 {
            if let TickOutcome::Finished { winner: w } = alice.tick().await.unwrap() {
                winner = Some(w);
                break;
            }
            bob.tick().await.unwrap();
        }
        assert_eq!(winner, Some(a()));
        assert_eq!(bob.tick().await.unwrap(), TickOutcome::Finished { winner: a() });
        assert_eq!(alice.stats().predictions_discarded, 0);
        assert_eq!(bob.stats().predictions_discarded, 0);
        assert_eq!(alice.stats().attacks, 4);
    }

    #[tokio::test]
    async fn test_exhausted_grant_falls_back_to_direct() {
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        let (mut alice, mut bob) = setup(&shared).await;
        alice.config.delegation_uses = 1;
        alice.enable_delegation(Address::derive("alice-hot")).await.unwrap();

        // first attack spends the only use
        assert!(matches!(alice.tick().await.unwrap(), TickOutcome::Attacked(_)));
        assert_eq!(alice.delegate(), Some(Address::derive("alice-hot")));
        bob.tick().await.unwrap();
        bob.tick().await.unwrap();

        // grant is gone: the delegated resolve fails and is retried directly
        assert!(matches!(alice.tick().await.unwrap(), TickOutcome::Resolved { .. }));
        assert_eq!(alice.delegate(), None);
        assert_eq!(alice.stats().delegation_fallbacks, 1);

        bob.tick().await.unwrap();
        assert!(matches!(alice.tick().await.unwrap(), TickOutcome::Attacked(_)));
        assert_eq!(alice.stats().delegation_fallbacks, 1);
    }

    #[tokio::test]
    async fn test_queued_targets_skip_tried_cells() {
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        let (alice, mut bob) = setup(&shared).await;
        let coord = Coord::new(2, 2).unwrap();
        let mut alice = alice.with_targets(Box::new(QueuedTargets::new([coord, coord])));

        assert_eq!(alice.tick().await.unwrap(), TickOutcome::Attacked(coord));
        assert!(matches!(bob.tick().await.unwrap(), TickOutcome::Resolved { .. }));

        let mut game = shared.get_game(ID).await.unwrap();
        game.turn = Some(a());
        // second copy of the same cell is skipped
        assert_eq!(alice.attack_from(&game).await.unwrap(), TickOutcome::NoTarget);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        let (mut alice, _) = setup(&shared).await;
        let (tx, rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move { alice.run(rx).await });
        tokio::time::sleep(Duration::from_secs(5)).await;
        tx.send(()).unwrap();

        assert_eq!(handle.await.unwrap(), Ok(None));
    }

    fn local_attestation(signer: &AttestationSigner) -> AttestationClient {
        AttestationClient::new(Some(Arc::new(LocalAttestor::new(signer.clone()))), Duration::from_secs(1))
    }

    async fn play_out(alice: &mut TurnOrchestrator, bob: &mut TurnOrchestrator) -> Option<Address> {
        for _ in 0..50 {
            if let TickOutcome::Finished { winner } = alice.tick().await.unwrap() {
                return Some(winner);
            }
            bob.tick().await.unwrap();
        }
        None
    }

    #[tokio::test]
    async fn test_signature_mode_game_with_delegation() {
        let signer = AttestationSigner::from_seed([21; 32]);
        let config = crate::authority::AuthorityConfig::default().with_verifier_key(signer.public_key());
        let shared = SharedAuthority::new(BattleshipAuthority::new(config));
        let (mut alice, mut bob) = setup_with(&shared, local_attestation(&signer)).await;

        let boards = shared.get_game(ID).await.unwrap();
        assert!(boards.boards_ready());

        let alice_hot = Address::derive("alice-hot");
        let bob_hot = Address::derive("bob-hot");
        alice.enable_delegation(alice_hot).await.unwrap();
        bob.enable_delegation(bob_hot).await.unwrap();

        assert_eq!(play_out(&mut alice, &mut bob).await, Some(a()));
        assert_eq!(alice.stats().delegation_fallbacks, 0);
        assert_eq!(bob.stats().delegation_fallbacks, 0);
        assert_eq!(alice.stats().predictions_discarded, 0);

        let auth = shared.lock().await;
        // alice: 4 attacks and 3 resolutions; bob: 3 attacks and 4 resolutions
        assert_eq!(auth.get_session(ID, &a(), &alice_hot).map(|g| g.uses_left), Some(93));
        assert_eq!(auth.get_session(ID, &b(), &bob_hot).map(|g| g.uses_left), Some(93));
    }

    #[tokio::test]
    async fn test_strict_mode_game_with_delegation() {
        let signer = AttestationSigner::from_seed([22; 32]);
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        {
            let mut auth = shared.lock().await;
            let admin = auth.admin();
            let verifier = SignatureZkVerifier::new(Address::derive("zk"), Some(signer.public_key()));
            auth.set_zk_verifier(&admin, Arc::new(verifier)).unwrap();
        }
        let (mut alice, mut bob) = setup_with(&shared, local_attestation(&signer)).await;
        bob.enable_delegation(Address::derive("bob-hot")).await.unwrap();

        assert_eq!(play_out(&mut alice, &mut bob).await, Some(a()));
        assert_eq!(bob.stats().delegation_fallbacks, 0);

        let events = shared.lock().await.drain_events();
        let zk_boards = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::BoardCommitted { zk: true, .. }))
            .count();
        let delegated_attacks = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::AttackMade { delegated: true, .. }))
            .count();
        assert_eq!(zk_boards, 2);
        assert_eq!(delegated_attacks, 3);
    }

    #[tokio::test]
    async fn test_strict_mode_without_attestor_fails_commit() {
        let signer = AttestationSigner::from_seed([23; 32]);
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        {
            let mut auth = shared.lock().await;
            let admin = auth.admin();
            let verifier = SignatureZkVerifier::new(Address::derive("zk"), Some(signer.public_key()));
            auth.set_zk_verifier(&admin, Arc::new(verifier)).unwrap();
        }
        shared.start_game(a(), ID, a(), b(), 0, 0).await.unwrap();
        let api: Arc<dyn AuthorityApi> = Arc::new(shared.clone());
        let mut rng = StdRng::seed_from_u64(5);
        let mut alice = TurnOrchestrator::new(
            api,
            AttestationClient::disabled(),
            ID,
            a(),
            LocalBoard::with_ships(&mut rng, &[Coord::new(1, 1).unwrap()]),
            OrchestratorConfig::default(),
        );

        assert_eq!(
            alice.join().await,
            Err(OrchestratorError::Attestation(AttestationError::Required(AttestationMode::Strict)))
        );
        assert!(shared.get_game(ID).await.unwrap().player1.board.is_none());
    }

    #[tokio::test]
    async fn test_losing_race_on_winning_shot_reports_finished() {
        let shared = SharedAuthority::new(BattleshipAuthority::default());
        let (alice, mut bob) = setup(&shared).await;
        // bob's only ship
        let ship = Coord::new(3, 0).unwrap();
        let mut alice = alice.with_targets(Box::new(QueuedTargets::new([ship])));
        let mut bob_again = TurnOrchestrator::new(
            Arc::new(shared.clone()),
            AttestationClient::disabled(),
            ID,
            b(),
            bob.board().clone(),
            OrchestratorConfig::default(),
        );

        assert_eq!(alice.tick().await.unwrap(), TickOutcome::Attacked(ship));
        let snapshot = shared.get_game(ID).await.unwrap();

        assert_eq!(
            bob.resolve_pending(&snapshot).await.unwrap(),
            TickOutcome::Resolved { coord: ship, hit: true }
        );
        assert_eq!(
            bob_again.resolve_pending(&snapshot).await.unwrap(),
            TickOutcome::Finished { winner: a() }
        );
        assert_eq!(bob_again.stats().already_resolved, 1);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(OrchestratorError::from(AttestationError::Timeout(Duration::from_secs(1))).is_retryable());
        assert!(!OrchestratorError::from(GameError::InvalidCellReveal).is_retryable());
    }
}
