//! # keygate-auth
//!
//! Token lifecycle, authorization, and the user/role directory for
//! Keygate.
//!
//! ## Modules
//!
//! - `store` — thread-safe keyed store guarding shared mutable state
//! - `expiry` — min-heap index of token expiry deadlines
//! - `token` — the two token strategies and the background sweep
//! - `password` — Argon2id credential hashing behind an injection trait
//! - `directory` — user and role CRUD
//! - `service` — authentication and authorization decisions

pub mod directory;
pub mod expiry;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use directory::DirectoryService;
pub use expiry::{ExpiryEntry, ExpiryQueue};
pub use password::{CredentialHasher, PasswordHasher};
pub use service::AuthService;
pub use store::KeyedStore;
pub use token::{OpaqueTokenService, SignedTokenService, SweepHandle, SweepTask, TokenService};
