//! Attestation Client
//!
//! Asks an attestation service to vouch for a board commitment or a cell
//! reveal, and checks what comes back before it reaches the authority.
//!
//! ## Modes
//!
//! ```text
//! authority reports zk verifier?  ──yes──►  Strict     (proof bytes only)
//!          │ no
//! authority reports verifier key? ──yes──►  Signature  (hash + signature)
//!          │ no
//!          └──────────────────────────────►  Disabled   (nothing attached)
//! ```
//!
//! An unreachable or slow service never turns into an empty attestation:
//! when the mode needs one, the enclosing operation fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::authority::BoardAttestation;
use crate::client::api::AuthorityApi;
use crate::core::coord::Coord;
use crate::core::hash::Hash32;
use crate::proof::attestation::{
    attack_signature_message, board_signature_message, verify_signature, AttestationSigner, ATTACK_PROOF_LEN,
    SIGNATURE_LEN,
};
use crate::proof::commitment::{board_proof_hash, BoardCommitment, Commitment};

/// Which attestation the authority expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationMode {
    /// Proof bytes checked by the zk verifier.
    Strict,
    /// Proof hash signed by the trusted prover key.
    Signature,
    /// No attestation.
    Disabled,
}

impl AttestationMode {
    /// Pick the mode from what the authority reports.
    pub fn select(zk_verifier_configured: bool, verifier_key_configured: bool) -> Self {
        if zk_verifier_configured {
            AttestationMode::Strict
        } else if verifier_key_configured {
            AttestationMode::Signature
        } else {
            AttestationMode::Disabled
        }
    }

    /// Whether the authority rejects calls without an attestation.
    pub fn is_required(self) -> bool {
        self != AttestationMode::Disabled
    }
}

/// Mode plus the key needed to check signatures locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttestationPolicy {
    /// Selected mode.
    pub mode: AttestationMode,
    /// Prover key reported by the authority (signature mode).
    pub verifier_key: Option<[u8; 32]>,
}

impl AttestationPolicy {
    /// Query the authority for its verifier settings.
    pub async fn from_authority(api: &dyn AuthorityApi) -> Self {
        let zk = api.get_zk_verifier().await;
        let verifier_key = api.get_verifier().await;
        Self {
            mode: AttestationMode::select(zk.is_some(), verifier_key.is_some()),
            verifier_key,
        }
    }

    /// No attestation at all.
    pub fn disabled() -> Self {
        Self {
            mode: AttestationMode::Disabled,
            verifier_key: None,
        }
    }
}

/// Attestation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttestationError {
    /// Service unreachable or answered with an error status.
    #[error("attestation transport error: {0}")]
    Transport(String),

    /// Service did not answer in time.
    #[error("attestation timed out after {0:?}")]
    Timeout(Duration),

    /// Service answered with malformed material.
    #[error("invalid attestation response: {0}")]
    InvalidResponse(String),

    /// Material decoded but does not check out.
    #[error("attestation rejected: {0}")]
    Rejected(String),

    /// Request could not be served.
    #[error("invalid attestation request: {0}")]
    InvalidRequest(String),

    /// The authority expects an attestation and no service is configured.
    #[error("authority requires {0:?} attestation but none is available")]
    Required(AttestationMode),
}

// =============================================================================
// Wire types
// =============================================================================

/// Body of `POST /attest/board`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardAttestationRequest {
    /// Correlation id.
    pub request_id: String,
    /// Session id.
    pub session_id: u32,
    /// Declared fleet size.
    pub ship_cells: u32,
    /// Commitment root (hex).
    pub commitment_root: String,
    /// Requested mode.
    pub mode: AttestationMode,
}

/// Response of `POST /attest/board`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardAttestationResponse {
    /// Board proof hash (hex), signature mode.
    #[serde(default)]
    pub proof_hash: Option<String>,
    /// Prover signature (hex), signature mode.
    #[serde(default)]
    pub signature: Option<String>,
    /// Proof bytes (hex), strict mode.
    #[serde(default)]
    pub proof: Option<String>,
}

/// Body of `POST /attest/resolve`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionAttestationRequest {
    /// Correlation id.
    pub request_id: String,
    /// Session id.
    pub session_id: u32,
    /// Attacked column.
    pub x: u32,
    /// Attacked row.
    pub y: u32,
    /// Revealed content.
    pub is_ship: bool,
    /// Resolution proof hash (hex).
    pub proof_hash: String,
    /// Stored commitment of the attacked cell (hex), strict mode.
    #[serde(default)]
    pub expected_commitment: Option<String>,
    /// Requested mode.
    pub mode: AttestationMode,
}

/// Response of `POST /attest/resolve`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionAttestationResponse {
    /// Prover signature (hex), signature mode.
    #[serde(default)]
    pub signature: Option<String>,
    /// Proof bytes (hex), strict mode.
    #[serde(default)]
    pub proof: Option<String>,
}

/// What gets attached to a board commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardEvidence {
    /// Signature mode.
    Signature(BoardAttestation),
    /// Strict mode.
    Proof(Vec<u8>),
}

/// What gets attached to a resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionEvidence {
    /// Signature mode.
    Signature([u8; SIGNATURE_LEN]),
    /// Strict mode.
    Proof(Vec<u8>),
}

// =============================================================================
// Transports
// =============================================================================

/// Something that can produce attestations.
#[async_trait]
pub trait AttestationTransport: Send + Sync {
    /// Attest a board commitment.
    async fn attest_board(&self, request: &BoardAttestationRequest)
        -> Result<BoardAttestationResponse, AttestationError>;

    /// Attest a cell reveal.
    async fn attest_resolution(
        &self,
        request: &ResolutionAttestationRequest,
    ) -> Result<ResolutionAttestationResponse, AttestationError>;
}

/// Attestation service reached over HTTP with JSON bodies.
#[derive(Clone, Debug)]
pub struct HttpAttestationTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpAttestationTransport {
    /// Client for a service rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    async fn post<Req: Serialize + Sync, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, AttestationError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AttestationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AttestationError::Transport(format!("{} returned {}: {}", path, status, error_text)));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| AttestationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AttestationTransport for HttpAttestationTransport {
    async fn attest_board(
        &self,
        request: &BoardAttestationRequest,
    ) -> Result<BoardAttestationResponse, AttestationError> {
        self.post("/attest/board", request).await
    }

    async fn attest_resolution(
        &self,
        request: &ResolutionAttestationRequest,
    ) -> Result<ResolutionAttestationResponse, AttestationError> {
        self.post("/attest/resolve", request).await
    }
}

/// In-process attestor holding the prover key.
///
/// Signs whatever it is asked to; it stands in for the service in tests
/// and the demo.
#[derive(Clone, Debug)]
pub struct LocalAttestor {
    signer: AttestationSigner,
}

impl LocalAttestor {
    /// Attestor signing with `signer`.
    pub fn new(signer: AttestationSigner) -> Self {
        Self { signer }
    }

    /// Public key the authority should trust.
    pub fn public_key(&self) -> [u8; 32] {
        self.signer.public_key()
    }
}

#[async_trait]
impl AttestationTransport for LocalAttestor {
    async fn attest_board(
        &self,
        request: &BoardAttestationRequest,
    ) -> Result<BoardAttestationResponse, AttestationError> {
        let root = decode_hash(&request.commitment_root).map_err(AttestationError::InvalidRequest)?;
        let response = match request.mode {
            AttestationMode::Strict => BoardAttestationResponse {
                proof: Some(hex::encode(self.signer.board_proof(request.session_id, request.ship_cells, &root))),
                ..Default::default()
            },
            AttestationMode::Signature => {
                let proof_hash = board_proof_hash(request.ship_cells, &root);
                let message = board_signature_message(request.session_id, request.ship_cells, &root, &proof_hash);
                BoardAttestationResponse {
                    proof_hash: Some(hex::encode(proof_hash)),
                    signature: Some(hex::encode(self.signer.sign(&message))),
                    proof: None,
                }
            }
            AttestationMode::Disabled => BoardAttestationResponse::default(),
        };
        Ok(response)
    }

    async fn attest_resolution(
        &self,
        request: &ResolutionAttestationRequest,
    ) -> Result<ResolutionAttestationResponse, AttestationError> {
        let coord = Coord::new(request.x, request.y)
            .ok_or_else(|| AttestationError::InvalidRequest(format!("coordinate ({}, {})", request.x, request.y)))?;

        let response = match request.mode {
            AttestationMode::Strict => {
                let expected = request
                    .expected_commitment
                    .as_deref()
                    .ok_or_else(|| AttestationError::InvalidRequest("missing expected commitment".into()))
                    .and_then(|hex| decode_hash(hex).map_err(AttestationError::InvalidRequest))?;
                ResolutionAttestationResponse {
                    proof: Some(hex::encode(self.signer.attack_proof(
                        request.session_id,
                        coord,
                        &expected,
                        request.is_ship,
                    ))),
                    signature: None,
                }
            }
            AttestationMode::Signature => {
                let proof_hash = decode_hash(&request.proof_hash).map_err(AttestationError::InvalidRequest)?;
                let message = attack_signature_message(request.session_id, coord, request.is_ship, &proof_hash);
                ResolutionAttestationResponse {
                    signature: Some(hex::encode(self.signer.sign(&message))),
                    proof: None,
                }
            }
            AttestationMode::Disabled => ResolutionAttestationResponse::default(),
        };
        Ok(response)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Attestation client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationConfig {
    /// Service base URL; `None` disables the HTTP transport.
    pub endpoint: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl AttestationConfig {
    /// Load from `BROADSIDE_ATTESTATION_URL` and
    /// `BROADSIDE_ATTESTATION_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("BROADSIDE_ATTESTATION_URL").ok().filter(|v| !v.is_empty()),
            timeout: std::env::var("BROADSIDE_ATTESTATION_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Requests and checks attestations.
#[derive(Clone)]
pub struct AttestationClient {
    transport: Option<Arc<dyn AttestationTransport>>,
    timeout: Duration,
}

impl AttestationClient {
    /// Client over an explicit transport (`None` = attestation disabled).
    pub fn new(transport: Option<Arc<dyn AttestationTransport>>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Client from configuration (HTTP transport when an endpoint is set).
    pub fn from_config(config: &AttestationConfig) -> Self {
        let transport = config
            .endpoint
            .as_ref()
            .map(|url| Arc::new(HttpAttestationTransport::new(url.clone())) as Arc<dyn AttestationTransport>);
        Self::new(transport, config.timeout)
    }

    /// Client with no transport.
    pub fn disabled() -> Self {
        Self::new(None, AttestationConfig::default().timeout)
    }

    /// Whether a transport is configured.
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Request a board attestation. `Ok(None)` when no transport exists.
    pub async fn request_commitment_attestation(
        &self,
        session_id: u32,
        ship_cells: u32,
        commitment_root_hex: &str,
        mode: AttestationMode,
    ) -> Result<Option<BoardAttestationResponse>, AttestationError> {
        let Some(transport) = &self.transport else {
            return Ok(None);
        };
        let request = BoardAttestationRequest {
            request_id: Uuid::new_v4().to_string(),
            session_id,
            ship_cells,
            commitment_root: commitment_root_hex.to_string(),
            mode,
        };
        debug!("Board attestation {} for session {}", request.request_id, session_id);

        tokio::time::timeout(self.timeout, transport.attest_board(&request))
            .await
            .map_err(|_| AttestationError::Timeout(self.timeout))?
            .map(Some)
    }

    /// Request a resolution attestation. `Ok(None)` when no transport exists.
    #[allow(clippy::too_many_arguments)]
    pub async fn request_resolution_attestation(
        &self,
        session_id: u32,
        coord: Coord,
        is_ship: bool,
        proof_hash: &Hash32,
        expected_commitment: Option<&Commitment>,
        mode: AttestationMode,
    ) -> Result<Option<ResolutionAttestationResponse>, AttestationError> {
        let Some(transport) = &self.transport else {
            return Ok(None);
        };
        let request = ResolutionAttestationRequest {
            request_id: Uuid::new_v4().to_string(),
            session_id,
            x: coord.x,
            y: coord.y,
            is_ship,
            proof_hash: hex::encode(proof_hash),
            expected_commitment: expected_commitment.map(hex::encode),
            mode,
        };
        debug!("Resolution attestation {} for session {} at {}", request.request_id, session_id, coord);

        tokio::time::timeout(self.timeout, transport.attest_resolution(&request))
            .await
            .map_err(|_| AttestationError::Timeout(self.timeout))?
            .map(Some)
    }

    /// Evidence for a board commit under `policy`, checked locally.
    ///
    /// `Ok(None)` only in disabled mode.
    pub async fn board_evidence(
        &self,
        policy: &AttestationPolicy,
        session_id: u32,
        ship_cells: u32,
        board: &BoardCommitment,
    ) -> Result<Option<BoardEvidence>, AttestationError> {
        if !policy.mode.is_required() {
            return Ok(None);
        }
        let response = self
            .request_commitment_attestation(session_id, ship_cells, &board.root_hex(), policy.mode)
            .await?
            .ok_or(AttestationError::Required(policy.mode))?;

        match policy.mode {
            AttestationMode::Strict => {
                let proof = decode_field(response.proof.as_deref(), "proof")?;
                if proof.len() != SIGNATURE_LEN {
                    return Err(AttestationError::InvalidResponse(format!("board proof of {} bytes", proof.len())));
                }
                Ok(Some(BoardEvidence::Proof(proof)))
            }
            AttestationMode::Signature => {
                let proof_hash = to_array::<32>(decode_field(response.proof_hash.as_deref(), "proof_hash")?, "proof_hash")?;
                let signature =
                    to_array::<SIGNATURE_LEN>(decode_field(response.signature.as_deref(), "signature")?, "signature")?;

                if proof_hash != board_proof_hash(ship_cells, &board.root) {
                    return Err(AttestationError::Rejected("board proof hash mismatch".into()));
                }
                if let Some(key) = &policy.verifier_key {
                    let message = board_signature_message(session_id, ship_cells, &board.root, &proof_hash);
                    if !verify_signature(key, &message, &signature) {
                        warn!("Board attestation for session {} failed local verification", session_id);
                        return Err(AttestationError::Rejected("board signature does not verify".into()));
                    }
                }
                Ok(Some(BoardEvidence::Signature(BoardAttestation { proof_hash, signature })))
            }
            AttestationMode::Disabled => Ok(None),
        }
    }

    /// Evidence for a resolution under `policy`, checked locally.
    ///
    /// `Ok(None)` only in disabled mode.
    pub async fn resolution_evidence(
        &self,
        policy: &AttestationPolicy,
        session_id: u32,
        coord: Coord,
        is_ship: bool,
        proof_hash: &Hash32,
        expected_commitment: &Commitment,
    ) -> Result<Option<ResolutionEvidence>, AttestationError> {
        if !policy.mode.is_required() {
            return Ok(None);
        }
        let expected = (policy.mode == AttestationMode::Strict).then_some(expected_commitment);
        let response = self
            .request_resolution_attestation(session_id, coord, is_ship, proof_hash, expected, policy.mode)
            .await?
            .ok_or(AttestationError::Required(policy.mode))?;

        match policy.mode {
            AttestationMode::Strict => {
                let proof = decode_field(response.proof.as_deref(), "proof")?;
                if proof.len() != ATTACK_PROOF_LEN {
                    return Err(AttestationError::InvalidResponse(format!("attack proof of {} bytes", proof.len())));
                }
                if proof[0] != is_ship as u8 {
                    return Err(AttestationError::Rejected("proof attests a different hit flag".into()));
                }
                Ok(Some(ResolutionEvidence::Proof(proof)))
            }
            AttestationMode::Signature => {
                let signature =
                    to_array::<SIGNATURE_LEN>(decode_field(response.signature.as_deref(), "signature")?, "signature")?;
                if let Some(key) = &policy.verifier_key {
                    let message = attack_signature_message(session_id, coord, is_ship, proof_hash);
                    if !verify_signature(key, &message, &signature) {
                        warn!("Resolution attestation for session {} failed local verification", session_id);
                        return Err(AttestationError::Rejected("resolution signature does not verify".into()));
                    }
                }
                Ok(Some(ResolutionEvidence::Signature(signature)))
            }
            AttestationMode::Disabled => Ok(None),
        }
    }
}

impl std::fmt::Debug for AttestationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationClient")
            .field("enabled", &self.is_enabled())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn decode_hash(value: &str) -> Result<Hash32, String> {
    let bytes = hex::decode(value).map_err(|e| format!("bad hex: {}", e))?;
    bytes.try_into().map_err(|b: Vec<u8>| format!("expected 32 bytes, got {}", b.len()))
}

fn decode_field(value: Option<&str>, name: &str) -> Result<Vec<u8>, AttestationError> {
    let value = value.ok_or_else(|| AttestationError::InvalidResponse(format!("missing {}", name)))?;
    hex::decode(value).map_err(|e| AttestationError::InvalidResponse(format!("{}: {}", name, e)))
}

fn to_array<const N: usize>(bytes: Vec<u8>, name: &str) -> Result<[u8; N], AttestationError> {
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| AttestationError::InvalidResponse(format!("{} of {} bytes, expected {}", name, b.len(), N)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::commitment::{commit_board, resolution_proof_hash, CellSecret, Salt};
    use crate::BOARD_CELLS;

    fn board() -> BoardCommitment {
        let cells: Vec<CellSecret> = (0..BOARD_CELLS)
            .map(|i| CellSecret {
                salt: Salt([i as u8; 32]),
                is_ship: i < 3,
            })
            .collect();
        commit_board(&cells).unwrap()
    }

    fn local(seed: u8) -> (AttestationClient, [u8; 32]) {
        let attestor = LocalAttestor::new(AttestationSigner::from_seed([seed; 32]));
        let key = attestor.public_key();
        (AttestationClient::new(Some(Arc::new(attestor)), Duration::from_secs(1)), key)
    }

    /// Transport that never answers.
    struct Stalled;

    #[async_trait]
    impl AttestationTransport for Stalled {
        async fn attest_board(&self, _: &BoardAttestationRequest) -> Result<BoardAttestationResponse, AttestationError> {
            std::future::pending().await
        }

        async fn attest_resolution(
            &self,
            _: &ResolutionAttestationRequest,
        ) -> Result<ResolutionAttestationResponse, AttestationError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(AttestationMode::select(true, true), AttestationMode::Strict);
        assert_eq!(AttestationMode::select(false, true), AttestationMode::Signature);
        assert_eq!(AttestationMode::select(false, false), AttestationMode::Disabled);
        assert!(!AttestationMode::Disabled.is_required());
    }

    #[test]
    fn test_request_wire_format() {
        let request = ResolutionAttestationRequest {
            request_id: "r".into(),
            session_id: 4,
            x: 1,
            y: 2,
            is_ship: true,
            proof_hash: "ab".into(),
            expected_commitment: None,
            mode: AttestationMode::Signature,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["mode"], "signature");
        assert_eq!(json["proof_hash"], "ab");
        assert_eq!(json["x"], 1);
    }

    #[tokio::test]
    async fn test_disabled_transport_yields_none() {
        let client = AttestationClient::disabled();
        let got = client
            .request_commitment_attestation(1, 3, "00", AttestationMode::Signature)
            .await
            .unwrap();
        assert!(got.is_none());

        // but a required mode is a hard error
        let policy = AttestationPolicy {
            mode: AttestationMode::Signature,
            verifier_key: None,
        };
        let err = client.board_evidence(&policy, 1, 3, &board()).await.unwrap_err();
        assert_eq!(err, AttestationError::Required(AttestationMode::Signature));

        assert_eq!(client.board_evidence(&AttestationPolicy::disabled(), 1, 3, &board()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_signature_mode_evidence() {
        let (client, key) = local(5);
        let policy = AttestationPolicy {
            mode: AttestationMode::Signature,
            verifier_key: Some(key),
        };
        let board = board();

        let evidence = client.board_evidence(&policy, 9, 3, &board).await.unwrap();
        match evidence {
            Some(BoardEvidence::Signature(att)) => assert_eq!(att.proof_hash, board_proof_hash(3, &board.root)),
            other => panic!("unexpected evidence {:?}", other),
        }

        let coord = Coord::new(0, 0).unwrap();
        let salt = Salt([0; 32]);
        let proof_hash = resolution_proof_hash(true, &salt, coord);
        let evidence = client
            .resolution_evidence(&policy, 9, coord, true, &proof_hash, &board.commitments[0])
            .await
            .unwrap();
        assert!(matches!(evidence, Some(ResolutionEvidence::Signature(_))));
    }

    #[tokio::test]
    async fn test_wrong_prover_key_is_rejected_locally() {
        let (client, _) = local(5);
        let (_, other_key) = local(6);
        let policy = AttestationPolicy {
            mode: AttestationMode::Signature,
            verifier_key: Some(other_key),
        };
        let err = client.board_evidence(&policy, 9, 3, &board()).await.unwrap_err();
        assert!(matches!(err, AttestationError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_strict_mode_evidence() {
        let (client, _) = local(5);
        let policy = AttestationPolicy {
            mode: AttestationMode::Strict,
            verifier_key: None,
        };
        let board = board();

        let evidence = client.board_evidence(&policy, 9, 3, &board).await.unwrap();
        assert!(matches!(evidence, Some(BoardEvidence::Proof(ref p)) if p.len() == SIGNATURE_LEN));

        let coord = Coord::new(1, 0).unwrap();
        let evidence = client
            .resolution_evidence(&policy, 9, coord, true, &[0; 32], &board.commitments[1])
            .await
            .unwrap();
        match evidence {
            Some(ResolutionEvidence::Proof(proof)) => {
                assert_eq!(proof.len(), ATTACK_PROOF_LEN);
                assert_eq!(proof[0], 1);
            }
            other => panic!("unexpected evidence {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_the_request() {
        let client = AttestationClient::new(Some(Arc::new(Stalled)), Duration::from_millis(250));
        let policy = AttestationPolicy {
            mode: AttestationMode::Signature,
            verifier_key: None,
        };
        let err = client.board_evidence(&policy, 1, 3, &board()).await.unwrap_err();
        assert_eq!(err, AttestationError::Timeout(Duration::from_millis(250)));
    }
}
