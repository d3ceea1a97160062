//! Client Module
//!
//! A player's side of the protocol. Non-deterministic: timers, HTTP and
//! randomness live here, never in `game/`.
//!
//! - `api`: Authority call surface and the in-process implementation
//! - `attestation`: Attestation requests, transports and local checks
//! - `board`: Secret board and reveals
//! - `prediction`: Pure mirror of the rules, reconciled against the authority
//! - `orchestrator`: Poll-driven turn loop

pub mod api;
pub mod attestation;
pub mod board;
pub mod orchestrator;
pub mod prediction;

pub use api::{AuthorityApi, SharedAuthority};
pub use attestation::{
    AttestationClient, AttestationConfig, AttestationError, AttestationMode, AttestationPolicy,
    AttestationTransport, HttpAttestationTransport, LocalAttestor,
};
pub use board::{LocalBoard, STANDARD_FLEET};
pub use orchestrator::{
    OrchestratorConfig, OrchestratorError, OrchestratorStats, QueuedTargets, ScanTargets, TargetSource,
    TickOutcome, TurnOrchestrator,
};
pub use prediction::Reconciliation;
