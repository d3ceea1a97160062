//! Game Errors
//!
//! One variant per rejection the authority can return. Callers interpret
//! them by [`ErrorClass`] rather than matching every variant.

use serde::{Deserialize, Serialize};

/// Errors returned by authority transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GameError {
    /// No session with this id.
    #[error("game not found")]
    GameNotFound,
    /// Address is not a player in this session.
    #[error("not a player in this game")]
    NotPlayer,
    /// Winner already decided.
    #[error("game already ended")]
    GameAlreadyEnded,
    /// Payout requested before a winner exists.
    #[error("game not finished")]
    GameNotFinished,
    /// Board is not exactly 100 commitments.
    #[error("board commitment must have 100 cells")]
    InvalidBoardCommitmentLength,
    /// Player already committed a board.
    #[error("board already committed")]
    BoardAlreadyCommitted,
    /// Both boards must be committed first.
    #[error("boards not ready")]
    BoardsNotReady,
    /// It is the other player's turn.
    #[error("not your turn")]
    NotYourTurn,
    /// Coordinate outside the 10x10 board.
    #[error("invalid coordinate")]
    InvalidCoordinate,
    /// Attacker already targeted this cell.
    #[error("cell already attacked")]
    AlreadyAttacked,
    /// An attack is waiting for resolution.
    #[error("pending attack must be resolved first")]
    PendingAttackResolution,
    /// Nothing to resolve.
    #[error("no pending attack")]
    NoPendingAttack,
    /// Caller is not the defender of the pending attack.
    #[error("not the pending defender")]
    NotPendingDefender,
    /// Revealed cell does not hash to the stored commitment.
    #[error("cell reveal does not match commitment")]
    InvalidCellReveal,
    /// Declared fleet size out of range.
    #[error("invalid ship count")]
    InvalidShipCount,
    /// Proof hash does not match the revealed data.
    #[error("invalid proof hash")]
    InvalidProofHash,
    /// Attestation required but not supplied.
    #[error("missing proof signature")]
    MissingProofSignature,
    /// Attestation signature did not verify.
    #[error("invalid proof signature")]
    InvalidProofSignature,
    /// Stake negative, zero or not the agreed amount.
    #[error("invalid stake amount")]
    InvalidStakeAmount,
    /// Wagered game but no bet token configured.
    #[error("bet token not configured")]
    BetTokenNotConfigured,
    /// Stake already in escrow.
    #[error("stake already deposited")]
    AlreadyDeposited,
    /// Wagered game without the required deposits.
    #[error("stakes not funded")]
    StakesNotFunded,
    /// Depositor balance too low.
    #[error("insufficient token balance")]
    InsufficientBalance,
    /// Escrow holds stakes of an unsettled wagered game.
    #[error("escrow holds unsettled stakes")]
    EscrowLocked,
    /// Fee outside 0..=2000 bps.
    #[error("invalid fee bps")]
    InvalidFeeBps,
    /// Proof-mode call without a verifier.
    #[error("zk verifier not configured")]
    ZkVerifierNotConfigured,
    /// Verifier rejected the proof.
    #[error("zk verification failed")]
    ZkVerificationFailed,
    /// Verifier configured, so the proof-mode call must be used.
    #[error("zk proof required")]
    ZkProofRequired,
    /// No delegation grant (missing or used up).
    #[error("invalid session")]
    InvalidSession,
    /// Delegation grant past its expiry ledger.
    #[error("session expired")]
    SessionExpired,
    /// Grant parameters rejected.
    #[error("invalid session config")]
    InvalidSessionConfig,
    /// Session id already in use.
    #[error("session already exists")]
    SessionAlreadyExists,
    /// Caller may not perform this call.
    #[error("unauthorized caller")]
    Unauthorized,
}

/// How a caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Rule violation. Surface verbatim, never retry.
    Protocol,
    /// Possible cheating. Reject, never correct.
    Cryptographic,
    /// Missing verifier/token. Degrade unless the session needs it.
    Configuration,
    /// Grant problem. Fall back to direct signing.
    Delegation,
    /// Someone else already did it. Treat as success.
    Race,
    /// Stake handling.
    Escrow,
}

impl GameError {
    /// Taxonomy bucket for this error.
    pub fn class(self) -> ErrorClass {
        use GameError::*;
        match self {
            InvalidCellReveal | InvalidProofHash | InvalidProofSignature | ZkVerificationFailed => {
                ErrorClass::Cryptographic
            }
            BetTokenNotConfigured | ZkVerifierNotConfigured | ZkProofRequired | MissingProofSignature => {
                ErrorClass::Configuration
            }
            InvalidSession | SessionExpired | InvalidSessionConfig => ErrorClass::Delegation,
            NoPendingAttack => ErrorClass::Race,
            InvalidStakeAmount | AlreadyDeposited | StakesNotFunded | InsufficientBalance | InvalidFeeBps
            | EscrowLocked => {
                ErrorClass::Escrow
            }
            GameNotFound | NotPlayer | GameAlreadyEnded | GameNotFinished | InvalidBoardCommitmentLength
            | BoardAlreadyCommitted | BoardsNotReady | NotYourTurn | InvalidCoordinate | AlreadyAttacked
            | PendingAttackResolution | NotPendingDefender | InvalidShipCount | SessionAlreadyExists
            | Unauthorized => ErrorClass::Protocol,
        }
    }

    /// Delegation failures are recovered by signing directly.
    pub fn falls_back_to_direct(self) -> bool {
        self.class() == ErrorClass::Delegation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        assert_eq!(GameError::InvalidCellReveal.class(), ErrorClass::Cryptographic);
        assert_eq!(GameError::NotYourTurn.class(), ErrorClass::Protocol);
        assert_eq!(GameError::NoPendingAttack.class(), ErrorClass::Race);
        assert_eq!(GameError::ZkVerifierNotConfigured.class(), ErrorClass::Configuration);
        assert_eq!(GameError::EscrowLocked.class(), ErrorClass::Escrow);
        assert!(GameError::SessionExpired.falls_back_to_direct());
        assert!(!GameError::AlreadyAttacked.falls_back_to_direct());
    }

    #[test]
    fn test_messages_are_specific() {
        assert_eq!(GameError::InvalidCellReveal.to_string(), "cell reveal does not match commitment");
    }
}
