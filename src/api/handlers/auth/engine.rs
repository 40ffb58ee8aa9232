//! Session rotation engine: login, refresh, logout.
//!
//! The engine owns the per-administrator session state machine:
//!
//! ```text
//! NoSession --login--> Active(J1) --refresh--> Active(J2) --...
//!      ^                                          |
//!      +---------- logout | reuse detected -------+
//! ```
//!
//! There is never a state in which two refresh tokens are simultaneously
//! valid: every transition that issues a token first overwrites the stored
//! `jti` hash, and a presented token whose hash does not match the stored one
//! revokes the whole session.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use super::store::AdminStore;
use super::tokens::TokenIssuer;
use super::utils::{generate_csrf_token, generate_token_id, hash_token_id, verify_password};

/// One login/refresh result: everything the transport layer needs to answer.
#[derive(Debug)]
pub(crate) struct TokenTriple {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    pub(crate) csrf_token: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum AuthFlowError {
    /// Unknown email and wrong password collapse into this one variant so
    /// callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No refresh token")]
    NoSession,
    #[error("Invalid refresh token")]
    InvalidToken,
    #[error("Invalid session")]
    InvalidSession,
    /// An already-rotated refresh token was replayed; the session was revoked.
    #[error("Refresh token revoked")]
    SessionRevoked,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub struct SessionEngine {
    store: Arc<dyn AdminStore>,
    issuer: TokenIssuer,
}

impl SessionEngine {
    #[must_use]
    pub fn new(store: Arc<dyn AdminStore>, issuer: TokenIssuer) -> Self {
        Self { store, issuer }
    }

    pub(crate) fn store(&self) -> &dyn AdminStore {
        self.store.as_ref()
    }

    /// Validate credentials and start a fresh session.
    ///
    /// Overwrites any existing session marker: a second login invalidates the
    /// refresh token issued by the first (single active session).
    pub(crate) async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenTriple, AuthFlowError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthFlowError::InvalidCredentials);
        }

        let Some(admin) = self.store.find_by_email(email).await? else {
            return Err(AuthFlowError::InvalidCredentials);
        };

        if !verify_password(password, &admin.password_hash)? {
            return Err(AuthFlowError::InvalidCredentials);
        }

        self.start_session(admin.id).await
    }

    /// Rotate a refresh token, detecting reuse of already-rotated tokens.
    pub(crate) async fn refresh(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<TokenTriple, AuthFlowError> {
        let Some(token) = refresh_token else {
            return Err(AuthFlowError::NoSession);
        };

        let Some(claims) = self.issuer.verify_refresh(token) else {
            return Err(AuthFlowError::InvalidToken);
        };
        let Ok(admin_id) = Uuid::parse_str(&claims.sub) else {
            return Err(AuthFlowError::InvalidToken);
        };

        let Some(admin) = self.store.find_by_id(admin_id).await? else {
            return Err(AuthFlowError::InvalidSession);
        };
        if admin.session == super::store::RefreshSession::None {
            return Err(AuthFlowError::InvalidSession);
        }

        let presented_hash = hash_token_id(&claims.jti);
        if !admin.session.matches(&presented_hash) {
            // Reuse detected. The replayed token was already rotated out, which
            // means it was most likely stolen. Revoke the current session too;
            // the legitimate client is forced to log in again.
            warn!(admin_id = %admin.id, "refresh token reuse detected, revoking session");
            self.store.clear_session(admin.id).await?;
            return Err(AuthFlowError::SessionRevoked);
        }

        self.start_session(admin.id).await
    }

    /// Clear the session if the presented token matches it.
    ///
    /// Best effort by design: a missing, expired, or foreign token still
    /// reports success, since the caller's goal (no usable session) already
    /// holds. Store errors are logged, never surfaced.
    pub(crate) async fn logout(&self, refresh_token: Option<&str>) {
        let Some(token) = refresh_token else {
            return;
        };
        let Some(claims) = self.issuer.verify_refresh(token) else {
            return;
        };
        let Ok(admin_id) = Uuid::parse_str(&claims.sub) else {
            return;
        };

        let admin = match self.store.find_by_id(admin_id).await {
            Ok(Some(admin)) => admin,
            Ok(None) => return,
            Err(err) => {
                error!("Logout lookup failed: {err}");
                return;
            }
        };

        let presented_hash = hash_token_id(&claims.jti);
        if admin.session.matches(&presented_hash) {
            if let Err(err) = self.store.clear_session(admin.id).await {
                error!("Logout cleanup failed: {err}");
            }
        }
    }

    /// Mint a fresh triple and persist the new session marker.
    /// Exactly one store write per login/refresh.
    async fn start_session(&self, admin_id: Uuid) -> Result<TokenTriple, AuthFlowError> {
        let jti = generate_token_id()?;
        self.store
            .set_session(admin_id, &hash_token_id(&jti))
            .await?;

        Ok(TokenTriple {
            access_token: self.issuer.mint_access(admin_id)?,
            refresh_token: self.issuer.mint_refresh(admin_id, &jti)?,
            csrf_token: generate_csrf_token()?,
        })
    }

    pub(crate) fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }
}
