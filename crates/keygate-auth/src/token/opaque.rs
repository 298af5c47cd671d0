//! Server-side-record token strategy: random opaque strings tracked in a
//! keyed store, with an expiry index for the background sweep.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::TryRng;
use rand::rngs::SysRng;
use tracing::debug;

use keygate_core::error::AppError;
use keygate_core::result::AppResult;
use keygate_entity::token::TokenDetails;

use crate::expiry::{ExpiryEntry, ExpiryQueue};
use crate::store::KeyedStore;

use super::TokenService;

/// Bytes of entropy drawn per token before URL-safe encoding.
const TOKEN_ENTROPY_BYTES: usize = 32;

/// Issues opaque random tokens backed by a server-side record.
///
/// Every live token has one record in the token store and (at insertion
/// time) one matching entry in the expiry queue. Explicit invalidation
/// removes only the record; the queue entry goes stale and is skipped by
/// the sweep.
pub struct OpaqueTokenService {
    /// token value → issued details.
    tokens: KeyedStore<TokenDetails>,
    /// Deadlines mirrored at issuance, drained by the sweep.
    queue: ExpiryQueue,
    /// Time-to-live applied at issuance.
    ttl: Duration,
}

impl std::fmt::Debug for OpaqueTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpaqueTokenService")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl OpaqueTokenService {
    /// Creates a new service issuing tokens with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: KeyedStore::new(),
            queue: ExpiryQueue::new(),
            ttl,
        }
    }

    /// Number of live token records.
    pub fn active_tokens(&self) -> usize {
        self.tokens.len()
    }

    /// Draws the configured entropy and encodes it URL-safely.
    fn random_token(&self) -> AppResult<String> {
        let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
        SysRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AppError::entropy(format!("Random source unavailable: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

#[async_trait]
impl TokenService for OpaqueTokenService {
    async fn generate(&self, username: &str) -> AppResult<TokenDetails> {
        let token = self.random_token()?;
        let expires_at = (Utc::now() + self.ttl).timestamp();

        let details = TokenDetails {
            username: username.to_string(),
            token: token.clone(),
            expires_at,
        };

        self.tokens.set(token.clone(), details.clone());
        self.queue.push(ExpiryEntry { token, expires_at });

        debug!(username, expires_at, "Issued opaque token");
        Ok(details)
    }

    async fn validate(&self, token: &str) -> AppResult<String> {
        let details = self
            .tokens
            .get(token)
            .ok_or_else(|| AppError::authentication("Invalid token"))?;

        if details.is_expired() {
            // Lazy invalidation: the sweep has not reached this one yet.
            self.tokens.remove(token);
            return Err(AppError::expired("Token has expired"));
        }

        Ok(details.username)
    }

    async fn invalidate(&self, token: &str) {
        // Leaves a stale queue entry behind; the sweep tolerates it.
        self.tokens.remove(token);
    }

    fn sweep_expired(&self, now: i64) -> usize {
        let mut evicted = 0;
        while let Some(entry) = self.queue.peek() {
            if entry.expires_at > now {
                break;
            }
            if self.tokens.remove(&entry.token) {
                evicted += 1;
            }
            self.queue.pop();
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use keygate_core::ErrorKind;

    use super::*;

    #[test]
    fn test_token_entropy_encoding() {
        let service = OpaqueTokenService::new(Duration::hours(2));
        let token = service.random_token().unwrap();
        // 32 bytes, base64 without padding.
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[tokio::test]
    async fn test_generate_then_validate() {
        let service = OpaqueTokenService::new(Duration::hours(2));
        let details = service.generate("alice").await.unwrap();
        assert!(details.expires_at > Utc::now().timestamp());
        assert_eq!(service.validate(&details.token).await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_unknown_token_is_authentication_failure() {
        let service = OpaqueTokenService::new(Duration::hours(2));
        let err = service.validate("no-such-token").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_lazy_invalidation_of_expired_token() {
        let service = OpaqueTokenService::new(Duration::seconds(-1));
        let details = service.generate("alice").await.unwrap();

        let err = service.validate(&details.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Expired);
        // The lazy path removed the record.
        assert_eq!(service.active_tokens(), 0);

        // A second attempt now reports the token as unknown.
        let err = service.validate(&details.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let service = OpaqueTokenService::new(Duration::hours(2));
        let details = service.generate("alice").await.unwrap();

        service.invalidate(&details.token).await;
        service.invalidate(&details.token).await;

        let err = service.validate(&details.token).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_expired() {
        let now = Utc::now().timestamp();
        let service = OpaqueTokenService::new(Duration::seconds(-10));
        service.generate("alice").await.unwrap();
        service.generate("bob").await.unwrap();

        let live = OpaqueTokenService::new(Duration::hours(2));
        let kept = live.generate("carol").await.unwrap();

        assert_eq!(service.sweep_expired(now), 2);
        assert_eq!(service.active_tokens(), 0);

        assert_eq!(live.sweep_expired(now), 0);
        assert_eq!(live.validate(&kept.token).await.unwrap(), "carol");
    }

    #[tokio::test]
    async fn test_sweep_skips_stale_entries() {
        let service = OpaqueTokenService::new(Duration::seconds(-1));
        let details = service.generate("alice").await.unwrap();
        service.invalidate(&details.token).await;

        // The stale queue entry pops without counting as an eviction.
        assert_eq!(service.sweep_expired(Utc::now().timestamp()), 0);
        assert!(service.queue.is_empty());
    }
}
