//! Issued-token value object.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Details of an issued token, returned to the caller at issuance and kept
/// as the server-side record for the opaque strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    /// Login name of the identity this token was issued to.
    pub username: String,
    /// The token value presented by callers.
    pub token: String,
    /// Absolute expiry deadline, seconds since the Unix epoch.
    pub expires_at: i64,
}

impl TokenDetails {
    /// Whether the deadline has passed at the given instant.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Whether the deadline has passed right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}
