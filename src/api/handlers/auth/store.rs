//! Administrator persistence behind an injectable trait.
//!
//! The rotation engine only needs four operations, so they live behind
//! `AdminStore`; production uses Postgres and tests use an in-memory store.
//! The session marker is modeled as a tagged variant rather than a nullable
//! column value so every transition (login, rotate, revoke) handles both
//! states explicitly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// Server-side refresh session marker.
///
/// `Active` holds the SHA-256 hash of the current refresh token's `jti`.
/// At most one session is active per administrator; a new login or rotation
/// replaces the hash and thereby invalidates any previously issued token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshSession {
    None,
    Active { jti_hash: Vec<u8> },
}

impl RefreshSession {
    pub(crate) fn matches(&self, jti_hash: &[u8]) -> bool {
        match self {
            Self::Active { jti_hash: stored } => stored.as_slice() == jti_hash,
            Self::None => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub session: RefreshSession,
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminRecord>>;
    /// Persist a new session marker, replacing any existing one.
    async fn set_session(&self, id: Uuid, jti_hash: &[u8]) -> Result<()>;
    /// Clear the session marker (logout or reuse-detected revocation).
    async fn clear_session(&self, id: Uuid) -> Result<()>;
    /// Liveness probe used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}

pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> AdminRecord {
        let jti_hash: Option<Vec<u8>> = row.get("refresh_session_hash");
        AdminRecord {
            id: row.get("id"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            session: match jti_hash {
                Some(jti_hash) => RefreshSession::Active { jti_hash },
                None => RefreshSession::None,
            },
        }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>> {
        let query = "SELECT id, email, password_hash, refresh_session_hash FROM admins WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup admin by email")?;
        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminRecord>> {
        let query =
            "SELECT id, email, password_hash, refresh_session_hash FROM admins WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup admin by id")?;
        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn set_session(&self, id: Uuid, jti_hash: &[u8]) -> Result<()> {
        let query = "UPDATE admins SET refresh_session_hash = $2 WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(jti_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to persist refresh session")?;
        Ok(())
    }

    async fn clear_session(&self, id: Uuid) -> Result<()> {
        let query = "UPDATE admins SET refresh_session_hash = NULL WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to clear refresh session")?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        use sqlx::Connection;
        let span = tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("failed to acquire database connection")?;
        conn.ping()
            .instrument(span)
            .await
            .context("failed to ping database")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::{AdminRecord, AdminStore, RefreshSession};
    use crate::api::handlers::auth::hash_password;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory store backing the engine and transport tests.
    pub(crate) struct MemoryAdminStore {
        admins: Mutex<Vec<AdminRecord>>,
    }

    impl MemoryAdminStore {
        pub(crate) fn empty() -> Self {
            Self {
                admins: Mutex::new(Vec::new()),
            }
        }

        /// Seed a single administrator with the given plaintext password.
        pub(crate) fn with_admin(email: &str, password: &str) -> Self {
            let record = AdminRecord {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: hash_password(password).expect("hash password"),
                session: RefreshSession::None,
            };
            Self {
                admins: Mutex::new(vec![record]),
            }
        }

        pub(crate) fn session_of(&self, email: &str) -> Option<RefreshSession> {
            self.admins
                .lock()
                .expect("admins lock")
                .iter()
                .find(|record| record.email == email)
                .map(|record| record.session.clone())
        }
    }

    #[async_trait]
    impl AdminStore for MemoryAdminStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>> {
            Ok(self
                .admins
                .lock()
                .expect("admins lock")
                .iter()
                .find(|record| record.email == email)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<AdminRecord>> {
            Ok(self
                .admins
                .lock()
                .expect("admins lock")
                .iter()
                .find(|record| record.id == id)
                .cloned())
        }

        async fn set_session(&self, id: Uuid, jti_hash: &[u8]) -> Result<()> {
            let mut admins = self.admins.lock().expect("admins lock");
            if let Some(record) = admins.iter_mut().find(|record| record.id == id) {
                record.session = RefreshSession::Active {
                    jti_hash: jti_hash.to_vec(),
                };
            }
            Ok(())
        }

        async fn clear_session(&self, id: Uuid) -> Result<()> {
            let mut admins = self.admins.lock().expect("admins lock");
            if let Some(record) = admins.iter_mut().find(|record| record.id == id) {
                record.session = RefreshSession::None;
            }
            Ok(())
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RefreshSession;

    #[test]
    fn refresh_session_matches_only_active_hash() {
        let hash = vec![1u8, 2, 3];
        let active = RefreshSession::Active {
            jti_hash: hash.clone(),
        };
        assert!(active.matches(&hash));
        assert!(!active.matches(&[9u8, 9, 9]));
        assert!(!RefreshSession::None.matches(&hash));
    }
}
