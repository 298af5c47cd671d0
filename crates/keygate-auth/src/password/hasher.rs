//! Argon2id password hashing and verification.

use argon2::Argon2;
use password_hash::{
    PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

use keygate_core::error::AppError;

/// One-way credential hashing as the directory and auth services consume
/// it. The services receive an implementation by injection so tests can
/// substitute a cheap hasher.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a plaintext credential.
    fn hash(&self, password: &str) -> Result<String, AppError>;

    /// Verifies a plaintext credential against a stored hash.
    ///
    /// Returns `Ok(true)` if the credential matches, `Ok(false)` if not.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError>;
}

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}
