//! Self-contained signed-token strategy: HMAC-signed claims carry the
//! owner and deadline, so validation needs no server-side record. Explicit
//! invalidation still requires a revocation denylist, because a signed
//! blob cannot be "forgotten" before it expires.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use keygate_core::error::AppError;
use keygate_core::result::AppResult;
use keygate_entity::token::TokenDetails;

use crate::expiry::{ExpiryEntry, ExpiryQueue};
use crate::store::KeyedStore;

use super::TokenService;

/// Claims payload embedded in every signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    /// Subject — the owning username.
    sub: String,
    /// Issued-at timestamp (seconds since epoch).
    iat: i64,
    /// Expiration timestamp (seconds since epoch).
    exp: i64,
    /// Token ID for denylist tracking.
    jti: Uuid,
}

/// Issues tamper-evident HS256 tokens and tracks explicit revocations.
///
/// The denylist maps revoked token IDs to their natural expiry; the expiry
/// queue mirrors those deadlines so the sweep can prune denylist entries
/// once the tokens they refer to would have expired anyway.
pub struct SignedTokenService {
    /// HMAC key for signing.
    encoding_key: EncodingKey,
    /// HMAC key for verification.
    decoding_key: DecodingKey,
    /// Validation settings (signature + exact expiry).
    validation: Validation,
    /// jti → natural expiry of explicitly revoked tokens.
    denylist: KeyedStore<i64>,
    /// Deadlines of denylist entries, drained by the sweep.
    queue: ExpiryQueue,
    /// Time-to-live applied at issuance.
    ttl: Duration,
}

impl std::fmt::Debug for SignedTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedTokenService")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SignedTokenService {
    /// Creates a new service signing with `secret` and issuing tokens with
    /// the given TTL.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            denylist: KeyedStore::new(),
            queue: ExpiryQueue::new(),
            ttl,
        }
    }

    /// Number of revocation records currently held.
    pub fn denylist_len(&self) -> usize {
        self.denylist.len()
    }

    /// Decodes and verifies the signature, mapping failures to the error
    /// taxonomy.
    fn decode_claims(&self, token: &str, validation: &Validation) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::expired("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AppError::authentication("Invalid token format")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            }
        })?;
        Ok(data.claims)
    }
}

#[async_trait]
impl TokenService for SignedTokenService {
    async fn generate(&self, username: &str) -> AppResult<TokenDetails> {
        let now = Utc::now();
        let expires_at = (now + self.ttl).timestamp();

        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        debug!(username, expires_at, "Issued signed token");
        Ok(TokenDetails {
            username: username.to_string(),
            token,
            expires_at,
        })
    }

    async fn validate(&self, token: &str) -> AppResult<String> {
        let claims = self.decode_claims(token, &self.validation)?;

        // jsonwebtoken treats the deadline second itself as still valid.
        // The deadline is inclusive on the expired side here, matching the
        // opaque strategy.
        let details = TokenDetails {
            username: claims.sub,
            token: token.to_string(),
            expires_at: claims.exp,
        };
        if details.is_expired() {
            return Err(AppError::expired("Token has expired"));
        }

        if self.denylist.contains(&claims.jti.to_string()) {
            return Err(AppError::authentication("Token has been revoked"));
        }

        Ok(details.username)
    }

    async fn invalidate(&self, token: &str) {
        // Accept an expired-but-authentic token here: revoking it is
        // harmless and keeps the operation idempotent.
        let mut lenient = self.validation.clone();
        lenient.validate_exp = false;

        if let Ok(claims) = self.decode_claims(token, &lenient) {
            let jti = claims.jti.to_string();
            self.denylist.set(jti.clone(), claims.exp);
            self.queue.push(ExpiryEntry {
                token: jti,
                expires_at: claims.exp,
            });
        }
    }

    fn sweep_expired(&self, now: i64) -> usize {
        let mut pruned = 0;
        while let Some(entry) = self.queue.peek() {
            if entry.expires_at > now {
                break;
            }
            if self.denylist.remove(&entry.token) {
                pruned += 1;
            }
            self.queue.pop();
        }
        pruned
    }
}
