//! # Folio (Portfolio Showcase API)
//!
//! `folio` is the backend for a personal portfolio site: a public project
//! showcase with a contact form, plus a single-admin content panel for
//! managing project entries and uploading images to an external media host.
//!
//! ## Admin sessions
//!
//! The admin panel authenticates with a short-lived bearer access token and a
//! long-lived refresh token that lives only in an `HttpOnly` cookie. Refresh
//! tokens are **single use**: every refresh rotates the token's `jti`, whose
//! hash is the only server-side session state. Presenting an already-rotated
//! refresh token is treated as theft and revokes the whole session.
//!
//! State-changing admin requests additionally require a double-submit CSRF
//! token (readable `csrf` cookie echoed in the `x-csrf-token` header).
//!
//! ## Single-session model
//!
//! There is exactly one administrator and at most one active refresh session.
//! A new login or rotation invalidates any previously issued refresh token.

pub mod api;
pub mod cli;
pub mod client;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
