//! Signed token mint/verify.
//!
//! Access and refresh tokens are HS256 JWTs signed with distinct secrets, so
//! a leaked access token can never be replayed against the refresh endpoint.
//! Validity is entirely signature + expiry; nothing here touches storage.

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub(crate) const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AccessClaims {
    pub(crate) sub: String,
    pub(crate) role: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RefreshClaims {
    pub(crate) sub: String,
    pub(crate) jti: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

pub struct TokenIssuer {
    access_secret: SecretString,
    refresh_secret: SecretString,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(
        access_secret: SecretString,
        refresh_secret: SecretString,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Mint a short-lived access token asserting the admin role.
    pub(crate) fn mint_access(&self, admin_id: Uuid) -> Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = AccessClaims {
            sub: admin_id.to_string(),
            role: ROLE_ADMIN.to_string(),
            iat: now,
            exp: now + self.access_ttl_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.expose_secret().as_bytes()),
        )
        .context("failed to sign access token")
    }

    /// Mint a refresh token embedding the rotation id (`jti`).
    pub(crate) fn mint_refresh(&self, admin_id: Uuid, jti: &str) -> Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = RefreshClaims {
            sub: admin_id.to_string(),
            jti: jti.to_string(),
            iat: now,
            exp: now + self.refresh_ttl_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.expose_secret().as_bytes()),
        )
        .context("failed to sign refresh token")
    }

    /// Verify an access token's signature and expiry.
    pub(crate) fn verify_access(&self, token: &str) -> Option<AccessClaims> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.access_secret.expose_secret().as_bytes()),
            &validation(),
        )
        .map(|data| data.claims)
        .ok()
    }

    /// Verify a refresh token's signature and expiry.
    pub(crate) fn verify_refresh(&self, token: &str) -> Option<RefreshClaims> {
        decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.refresh_secret.expose_secret().as_bytes()),
            &validation(),
        )
        .map(|data| data.claims)
        .ok()
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation
}
