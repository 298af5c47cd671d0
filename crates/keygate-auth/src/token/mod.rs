//! Token lifecycle: issuance, validation, invalidation, and the sweep.
//!
//! Two interchangeable strategies implement the same contract:
//!
//! - [`OpaqueTokenService`] — a random opaque string tracked as a
//!   server-side record, paired with an expiry index the sweep drains.
//! - [`SignedTokenService`] — a self-contained HMAC-signed token; only
//!   explicit revocations are tracked, and the sweep prunes the denylist.

pub mod opaque;
pub mod signed;
pub mod sweep;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use keygate_core::config::auth::AuthConfig;
use keygate_core::config::token::{TokenConfig, TokenStrategy};
use keygate_core::result::AppResult;
use keygate_entity::token::TokenDetails;

pub use opaque::OpaqueTokenService;
pub use signed::SignedTokenService;
pub use sweep::{SweepHandle, SweepTask};

/// The token lifecycle contract shared by both issuance strategies.
///
/// Per token the lifecycle is Issued → Valid → Expired or Invalidated;
/// both end states are terminal, and validating a token in either fails.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issues a new token bound to `username` with the configured TTL.
    async fn generate(&self, username: &str) -> AppResult<TokenDetails>;

    /// Validates a presented token and returns the owning username.
    ///
    /// Fails with `Authentication` for an unknown token and `Expired` for
    /// a token past its deadline (which is also removed on the spot — the
    /// lazy-expiration path).
    async fn validate(&self, token: &str) -> AppResult<String>;

    /// Unconditionally revokes a token. Idempotent: revoking an absent or
    /// already-revoked token is a no-op.
    async fn invalidate(&self, token: &str);

    /// Maintenance hook driven by [`SweepTask`]: evicts every record whose
    /// deadline passed before `now` and returns how many were evicted.
    fn sweep_expired(&self, now: i64) -> usize;
}

/// Builds the token service selected by configuration.
pub fn from_config(token: &TokenConfig, auth: &AuthConfig) -> Arc<dyn TokenService> {
    let ttl = Duration::minutes(token.ttl_minutes as i64);
    match token.strategy {
        TokenStrategy::Opaque => Arc::new(OpaqueTokenService::new(ttl)),
        TokenStrategy::Signed => Arc::new(SignedTokenService::new(&auth.jwt_secret, ttl)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_strategy() {
        let auth = AuthConfig::default();

        let opaque = from_config(&TokenConfig::default(), &auth);
        // The opaque strategy issues URL-safe random strings, never JWTs.
        let details = block_on(opaque.generate("alice")).unwrap();
        assert!(!details.token.contains('.'));

        let signed_config = TokenConfig {
            strategy: TokenStrategy::Signed,
            ..TokenConfig::default()
        };
        let signed = from_config(&signed_config, &auth);
        let details = block_on(signed.generate("alice")).unwrap();
        assert_eq!(details.token.split('.').count(), 3);
    }

    fn block_on<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }
}
