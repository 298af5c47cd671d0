//! Unified application error types for Keygate.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested user, role, or token was not found.
    NotFound,
    /// A duplicate create (user or role name already taken).
    Conflict,
    /// Authentication failed. Unknown usernames and wrong passwords are
    /// deliberately reported identically to prevent username enumeration;
    /// an unknown token falls in the same bucket.
    Authentication,
    /// A token was presented past its expiry deadline.
    Expired,
    /// The caller is authenticated but lacks the required ability.
    Authorization,
    /// The system random source was unavailable during token issuance.
    Entropy,
    /// A configuration error occurred.
    Configuration,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Entropy => write!(f, "ENTROPY"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Keygate.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. The transport layer is responsible for
/// translating [`ErrorKind`] values into protocol status codes; nothing in
/// the core is fatal to the process.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an expired-token error.
    pub fn expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Expired, message)
    }

    /// Create an authorization (insufficient ability) error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create an entropy (random source failure) error.
    pub fn entropy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Entropy, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error indicates a missing entity.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Whether this error indicates a failed or expired authentication.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication | ErrorKind::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorKind::Entropy.to_string(), "ENTROPY");
    }

    #[test]
    fn test_constructor_kinds() {
        assert_eq!(AppError::conflict("dup").kind, ErrorKind::Conflict);
        assert_eq!(AppError::expired("old").kind, ErrorKind::Expired);
        assert!(AppError::expired("old").is_unauthenticated());
        assert!(AppError::authentication("bad").is_unauthenticated());
        assert!(!AppError::forbidden("no").is_unauthenticated());
    }
}
