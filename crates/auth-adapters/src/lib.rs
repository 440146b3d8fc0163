//! # auth-adapters
//!
//! Credential adapters: Argon2 password hashing and, behind the `auth-jwt`
//! feature, HS256 access tokens.

pub mod argon;
#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use argon::Argon2Hasher;
#[cfg(feature = "auth-jwt")]
pub use jwt::{Claims, JwtIssuer};
