//! Admin auth handlers and the session rotation engine.
//!
//! The admin panel uses three credentials with different lifetimes:
//!
//! - a short-lived bearer **access token** returned in response bodies and
//!   held only in client memory,
//! - a long-lived **refresh token** carried in the `HttpOnly` `rt` cookie,
//!   single-use per rotation cycle,
//! - a **CSRF token** minted alongside each refresh token, set as a readable
//!   cookie and echoed in `x-csrf-token` on every mutating request.
//!
//! ## Rotation and reuse detection
//!
//! The database stores only the SHA-256 hash of the current refresh token's
//! `jti`. Every successful refresh rotates the `jti`, so replaying an
//! already-rotated token no longer matches the stored hash. That mismatch is
//! treated as theft: the whole session is revoked, including the legitimate
//! rotated token, and the administrator must log in again.
//!
//! ## Shared-secret tier
//!
//! A fixed `x-admin-token` header is accepted for non-interactive tooling.
//! It bypasses sessions and CSRF entirely and is compared in constant time.

pub(crate) mod engine;
pub(crate) mod guard;
mod rate_limit;
pub(crate) mod session;
mod state;
pub(crate) mod store;
mod tokens;
pub(crate) mod types;
mod utils;

pub use engine::SessionEngine;
pub use rate_limit::{FixedWindowLimiter, NoopRateLimiter, RateLimiter};
pub use state::{AuthConfig, AuthState};
pub use store::{AdminRecord, AdminStore, PgAdminStore, RefreshSession};
pub use tokens::TokenIssuer;
pub use utils::hash_password;

#[cfg(test)]
mod tests;
