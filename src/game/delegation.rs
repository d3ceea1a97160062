//! Session Delegation
//!
//! A player may let a disposable delegate key submit attack and resolve
//! calls for one session, bounded by an expiry ledger and a use count.
//! Stake, board and admin calls have no delegated form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::address::Address;
use crate::game::error::GameError;
use crate::MAX_SESSION_TTL_LEDGERS;

/// Capability granted to a delegate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    /// Delegate key allowed to act.
    pub delegate: Address,
    /// Last ledger sequence at which the grant is valid.
    pub expires_ledger: u32,
    /// Remaining calls.
    pub uses_left: u32,
}

/// Lookup key: one grant per (session, player, delegate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GrantKey {
    /// Session the grant applies to.
    pub session_id: u32,
    /// Player who granted it.
    pub player: Address,
    /// Delegate it was granted to.
    pub delegate: Address,
}

impl GrantKey {
    /// Build a key.
    pub fn new(session_id: u32, player: Address, delegate: Address) -> Self {
        Self { session_id, player, delegate }
    }
}

/// All live grants.
#[derive(Clone, Debug, Default)]
pub struct GrantStore {
    grants: BTreeMap<GrantKey, SessionGrant>,
}

impl GrantStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a grant expiring `ttl_ledgers` after `now`.
    pub fn authorize(
        &mut self,
        key: GrantKey,
        now: u32,
        ttl_ledgers: u32,
        uses_left: u32,
    ) -> Result<SessionGrant, GameError> {
        if key.delegate == key.player || ttl_ledgers == 0 || ttl_ledgers > MAX_SESSION_TTL_LEDGERS || uses_left == 0 {
            return Err(GameError::InvalidSessionConfig);
        }

        let grant = SessionGrant {
            delegate: key.delegate,
            expires_ledger: now.saturating_add(ttl_ledgers),
            uses_left,
        };
        self.grants.insert(key, grant);
        debug!(
            "Grant for session {} player {} -> delegate {} (expires {}, uses {})",
            key.session_id,
            key.player.short(),
            key.delegate.short(),
            grant.expires_ledger,
            uses_left
        );
        Ok(grant)
    }

    /// Pure lookup.
    pub fn get(&self, key: &GrantKey) -> Option<SessionGrant> {
        self.grants.get(key).copied()
    }

    /// Delete a grant. Returns whether one existed.
    pub fn revoke(&mut self, key: &GrantKey) -> bool {
        self.grants.remove(key).is_some()
    }

    /// Validate a grant for one use without spending it. An expired grant
    /// is removed as it is reported.
    pub fn check(&mut self, key: &GrantKey, now: u32) -> Result<SessionGrant, GameError> {
        let grant = self.get(key).ok_or(GameError::InvalidSession)?;
        if now > grant.expires_ledger {
            self.grants.remove(key);
            debug!("Grant for session {} delegate {} expired", key.session_id, key.delegate.short());
            return Err(GameError::SessionExpired);
        }
        if grant.uses_left == 0 {
            return Err(GameError::InvalidSession);
        }
        Ok(grant)
    }

    /// Spend one use. An exhausted grant is removed.
    pub fn consume(&mut self, key: &GrantKey, now: u32) -> Result<u32, GameError> {
        let mut grant = self.check(key, now)?;
        grant.uses_left -= 1;
        if grant.uses_left == 0 {
            self.grants.remove(key);
        } else {
            self.grants.insert(*key, grant);
        }
        Ok(grant.uses_left)
    }

    /// Number of live grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// No live grants.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> GrantKey {
        GrantKey::new(1, Address::derive("player"), Address::derive("delegate"))
    }

    #[test]
    fn test_authorize_validation() {
        let mut store = GrantStore::new();
        let player = Address::derive("player");

        let self_grant = GrantKey::new(1, player, player);
        assert_eq!(store.authorize(self_grant, 100, 10, 1), Err(GameError::InvalidSessionConfig));
        assert_eq!(store.authorize(key(), 100, 0, 1), Err(GameError::InvalidSessionConfig));
        assert_eq!(
            store.authorize(key(), 100, MAX_SESSION_TTL_LEDGERS + 1, 1),
            Err(GameError::InvalidSessionConfig)
        );
        assert_eq!(store.authorize(key(), 100, 10, 0), Err(GameError::InvalidSessionConfig));

        let grant = store.authorize(key(), 100, 10, 3).unwrap();
        assert_eq!(grant.expires_ledger, 110);
        assert_eq!(store.get(&key()), Some(grant));
    }

    #[test]
    fn test_single_use_grant() {
        let mut store = GrantStore::new();
        store.authorize(key(), 100, 10, 1).unwrap();

        assert_eq!(store.consume(&key(), 100), Ok(0));
        assert_eq!(store.consume(&key(), 100), Err(GameError::InvalidSession));
        assert!(store.is_empty());
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let mut store = GrantStore::new();
        store.authorize(key(), 100, 10, 5).unwrap();

        assert!(store.check(&key(), 110).is_ok());
        assert_eq!(store.check(&key(), 111), Err(GameError::SessionExpired));
    }

    #[test]
    fn test_expired_grant_is_removed() {
        let mut store = GrantStore::new();
        store.authorize(key(), 100, 10, 5).unwrap();
        let other = GrantKey::new(2, Address::derive("player"), Address::derive("delegate"));
        store.authorize(other, 100, 50, 5).unwrap();

        assert_eq!(store.consume(&key(), 111), Err(GameError::SessionExpired));
        assert_eq!(store.get(&key()), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.check(&key(), 111), Err(GameError::InvalidSession));
        assert_eq!(store.consume(&other, 111), Ok(4));
    }

    #[test]
    fn test_overwrite_and_idempotent_revoke() {
        let mut store = GrantStore::new();
        store.authorize(key(), 100, 10, 5).unwrap();
        store.authorize(key(), 200, 10, 2).unwrap();
        assert_eq!(store.get(&key()).map(|g| g.uses_left), Some(2));

        assert!(store.revoke(&key()));
        assert!(!store.revoke(&key()));
        assert_eq!(store.get(&key()), None);
    }
}
