//! # keygate-entity
//!
//! Domain entity models for Keygate. Every struct in this crate is a plain
//! in-memory value object; all entities derive `Debug`, `Clone`,
//! `Serialize`, and `Deserialize`.

pub mod role;
pub mod token;
pub mod user;

pub use role::{Role, ability};
pub use token::TokenDetails;
pub use user::User;
