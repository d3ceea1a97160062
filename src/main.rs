//! Broadside demo
//!
//! Plays one wagered game between two orchestrators against an in-process
//! authority, with a local attestor standing in for the attestation
//! service (or the HTTP service at `BROADSIDE_ATTESTATION_URL`).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use broadside::{
    client::{
        AttestationClient, AttestationConfig, AuthorityApi, LocalAttestor, LocalBoard, OrchestratorConfig,
        SharedAuthority, TurnOrchestrator,
    },
    proof::attestation::AttestationSigner,
    Address, AuthorityConfig, BattleshipAuthority, VERSION,
};

const SESSION_ID: u32 = 42;
const STAKE: i128 = 1000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let default_level = if cfg!(feature = "debug-tracing") { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("Broadside v{}", VERSION);

    let alice = Address::derive("alice");
    let bob = Address::derive("bob");

    // Attestation: remote service if configured, otherwise a local signer
    let attestation_config = AttestationConfig::from_env();
    let (attestation, verifier_key) = match &attestation_config.endpoint {
        Some(url) => {
            info!("Using attestation service at {}", url);
            (AttestationClient::from_config(&attestation_config), None)
        }
        None => {
            let attestor = LocalAttestor::new(AttestationSigner::new(SigningKey::generate(&mut OsRng)));
            let key = attestor.public_key();
            info!("Using local attestor {}", hex::encode(&key[..4]));
            (
                AttestationClient::new(Some(Arc::new(attestor)), attestation_config.timeout),
                Some(key),
            )
        }
    };

    let mut authority_config = AuthorityConfig::from_env();
    if let Some(key) = verifier_key {
        authority_config = authority_config.with_verifier_key(key);
    }
    let authority = SharedAuthority::new(BattleshipAuthority::new(authority_config));

    {
        let mut auth = authority.lock().await;
        let admin = auth.admin();
        auth.set_bet_token(&admin, Address::derive("bet-token"))?;
        auth.mint_bet_token(&admin, alice, STAKE)?;
        auth.mint_bet_token(&admin, bob, STAKE)?;
    }

    authority
        .start_game(alice, SESSION_ID, alice, bob, STAKE, STAKE)
        .await
        .context("start_game")?;

    let mut config = OrchestratorConfig::from_env();
    if std::env::var("BROADSIDE_POLL_MS").is_err() {
        config.poll_interval = Duration::from_millis(10);
    }

    let api: Arc<dyn AuthorityApi> = Arc::new(authority.clone());
    let mut alice_side = TurnOrchestrator::new(
        api.clone(),
        attestation.clone(),
        SESSION_ID,
        alice,
        LocalBoard::random_fleet(&mut OsRng),
        config.clone(),
    );
    let mut bob_side = TurnOrchestrator::new(
        api,
        attestation,
        SESSION_ID,
        bob,
        LocalBoard::random_fleet(&mut OsRng),
        config,
    );

    alice_side.join().await.context("alice join")?;
    bob_side.join().await.context("bob join")?;
    alice_side
        .enable_delegation(Address::derive("alice-session-key"))
        .await
        .context("enable delegation")?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let alice_task = {
        let rx = shutdown_tx.subscribe();
        tokio::spawn(async move { (alice_side.run(rx).await, alice_side.stats()) })
    };
    let bob_task = {
        let rx = shutdown_tx.subscribe();
        tokio::spawn(async move { (bob_side.run(rx).await, bob_side.stats()) })
    };

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted");
            let _ = ctrl_c_tx.send(());
        }
    });

    let (alice_result, bob_result) = tokio::join!(alice_task, bob_task);
    let (alice_outcome, alice_stats) = alice_result.context("alice task panicked")?;
    let (bob_outcome, bob_stats) = bob_result.context("bob task panicked")?;
    let winner = alice_outcome?.or(bob_outcome?);

    info!("Alice: {:?}", alice_stats);
    info!("Bob: {:?}", bob_stats);

    let mut auth = authority.lock().await;
    match winner {
        Some(winner) => {
            let name = if winner == alice { "alice" } else { "bob" };
            info!("=== {} wins session {} ===", name, SESSION_ID);
        }
        None => info!("=== Session {} stopped before a winner ===", SESSION_ID),
    }
    info!(
        "Balances: alice {}, bob {}, fees {}, escrow {}",
        auth.token_balance(&alice),
        auth.token_balance(&bob),
        auth.token_balance(&auth.get_fee_recipient()),
        auth.token_balance(&auth.escrow())
    );
    info!("{} events emitted", auth.drain_events().len());

    Ok(())
}
