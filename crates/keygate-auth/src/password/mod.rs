//! Credential hashing and verification.

pub mod hasher;

pub use hasher::{CredentialHasher, PasswordHasher};
