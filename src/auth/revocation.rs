//! Revocation Store
//!
//! Blocklist of logged-out tokens. Each marker lives exactly as long as the
//! token it blocks, so the list never outgrows the set of still-valid tokens.

use std::sync::Arc;

use tracing::debug;

use crate::auth::TokenClaims;
use crate::cache::Cache;
use crate::clock::SharedClock;

/// Name of the blocklist cache in stats and metrics.
pub const BLOCKLIST_CACHE_NAME: &str = "jwt-blocklist";

/// Revoked tokens, keyed by the raw token string.
#[derive(Debug, Clone)]
pub struct RevocationStore {
    cache: Arc<Cache<String, ()>>,
    clock: SharedClock,
}

impl RevocationStore {
    pub fn new(cache: Arc<Cache<String, ()>>, clock: SharedClock) -> Self {
        Self { cache, clock }
    }

    /// Blocks `token` until its natural expiry.
    ///
    /// Returns `false` when the token has already expired; nothing is stored
    /// then, since verification rejects it anyway.
    pub fn block(&self, token: &str, claims: &TokenClaims) -> bool {
        let ttl = claims.expires_at() - self.clock.now();
        if ttl <= chrono::Duration::zero() {
            debug!(user_id = claims.user_id, "Token already expired, not blocking");
            return false;
        }

        self.cache.set(token.to_string(), (), ttl);
        debug!(
            user_id = claims.user_id,
            ttl_secs = ttl.num_seconds(),
            "Token revoked"
        );
        true
    }

    /// Returns whether `token` is currently revoked.
    pub fn is_blocked(&self, token: &str) -> bool {
        self.cache.get(token).is_some()
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &Arc<Cache<String, ()>> {
        &self.cache
    }
}
