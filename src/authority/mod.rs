//! Authority Module
//!
//! The adjudicating side of the protocol: one owner for all sessions, every
//! transition atomic.
//!
//! - `config`: Start-up configuration
//! - `contract`: The authority and its call surface

pub mod config;
pub mod contract;

pub use config::AuthorityConfig;
pub use contract::{BattleshipAuthority, BoardAttestation, CellReveal};
