//! Token lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Token lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Which token issuance strategy to use.
    #[serde(default)]
    pub strategy: TokenStrategy,
    /// Token time-to-live in minutes.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,
    /// Interval for the expired-token sweep in minutes.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_minutes: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            strategy: TokenStrategy::default(),
            ttl_minutes: default_ttl_minutes(),
            sweep_interval_minutes: default_sweep_interval(),
        }
    }
}

/// Token issuance strategy selected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStrategy {
    /// Server-side record: a random opaque string tracked in the token store.
    Opaque,
    /// Self-contained HMAC-signed token; only revocations are tracked.
    Signed,
}

impl Default for TokenStrategy {
    fn default() -> Self {
        Self::Opaque
    }
}

impl std::fmt::Display for TokenStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenStrategy::Opaque => write!(f, "opaque"),
            TokenStrategy::Signed => write!(f, "signed"),
        }
    }
}

fn default_ttl_minutes() -> u64 {
    120
}

fn default_sweep_interval() -> u64 {
    10
}
