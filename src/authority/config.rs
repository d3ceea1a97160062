//! Authority Configuration
//!
//! Start-up settings for [`super::BattleshipAuthority`]. Everything here can
//! also be changed later through the admin calls.

use crate::core::address::Address;
use crate::{DEFAULT_FEE_BPS, MAX_FEE_BPS};

/// Authority configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    /// Admin account (may change verifier, token and fee settings).
    pub admin: Address,
    /// Account holding escrowed stakes.
    pub escrow: Address,
    /// Trusted attestation public key for signature mode.
    pub verifier_key: Option<[u8; 32]>,
    /// Protocol fee in basis points.
    pub fee_bps: u32,
    /// Fee account; defaults to the admin.
    pub fee_recipient: Address,
    /// Ledger sequence at start.
    pub initial_ledger: u32,
    /// Undrained events kept; the oldest are dropped beyond this.
    pub event_buffer: usize,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        let admin = Address::derive("admin");
        Self {
            admin,
            escrow: Address::derive("escrow"),
            verifier_key: None,
            fee_bps: DEFAULT_FEE_BPS,
            fee_recipient: admin,
            initial_ledger: 1,
            event_buffer: 4096,
        }
    }
}

impl AuthorityConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// - `BROADSIDE_ADMIN`: admin address (hex)
    /// - `BROADSIDE_ESCROW`: escrow address (hex)
    /// - `BROADSIDE_VERIFIER_KEY`: attestation public key (hex)
    /// - `BROADSIDE_FEE_BPS`: fee in basis points (capped at 2000)
    /// - `BROADSIDE_FEE_RECIPIENT`: fee account (hex)
    /// - `BROADSIDE_EVENT_BUFFER`: undrained events kept
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let admin = env_address("BROADSIDE_ADMIN").unwrap_or(defaults.admin);

        Self {
            admin,
            escrow: env_address("BROADSIDE_ESCROW").unwrap_or(defaults.escrow),
            verifier_key: std::env::var("BROADSIDE_VERIFIER_KEY")
                .ok()
                .and_then(|v| Address::from_hex(&v))
                .map(|a| a.0),
            fee_bps: std::env::var("BROADSIDE_FEE_BPS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .map(|bps| bps.min(MAX_FEE_BPS))
                .unwrap_or(defaults.fee_bps),
            fee_recipient: env_address("BROADSIDE_FEE_RECIPIENT").unwrap_or(admin),
            initial_ledger: defaults.initial_ledger,
            event_buffer: std::env::var("BROADSIDE_EVENT_BUFFER")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.event_buffer),
        }
    }

    /// Builder-style admin override.
    pub fn with_admin(mut self, admin: Address) -> Self {
        self.admin = admin;
        self.fee_recipient = admin;
        self
    }

    /// Builder-style verifier key.
    pub fn with_verifier_key(mut self, key: [u8; 32]) -> Self {
        self.verifier_key = Some(key);
        self
    }

    /// Builder-style event buffer size.
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }
}

fn env_address(name: &str) -> Option<Address> {
    std::env::var(name).ok().and_then(|v| Address::from_hex(&v))
}
