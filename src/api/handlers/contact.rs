//! Public contact form endpoint.
//!
//! Submissions are persisted before any delivery attempt, so a relay outage
//! never loses a message. A failed relay still surfaces as 502 to let the
//! sender know delivery did not complete.

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{Instrument, error};
use utoipa::ToSchema;

use super::auth::types::ErrorMessage;
use crate::api::email::{ContactMessage, ContactRelay};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, message: &ContactMessage) -> Result<()>;
}

pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, message: &ContactMessage) -> Result<()> {
        let query = "INSERT INTO contact_messages (name, email, message) VALUES ($1, $2, $3)";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&message.name)
            .bind(&message.email)
            .bind(&message.message)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to persist contact message")?;
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message accepted and delivered"),
        (status = 400, description = "Missing fields", body = ErrorMessage),
        (status = 502, description = "Stored but delivery failed", body = ErrorMessage)
    ),
    tag = "contact"
)]
pub async fn submit(
    store: Extension<Arc<dyn ContactStore>>,
    relay: Extension<Arc<dyn ContactRelay>>,
    Json(payload): Json<ContactRequest>,
) -> impl IntoResponse {
    let name = payload.name.trim();
    let email = payload.email.trim();
    let text = payload.message.trim();
    if name.is_empty() || email.is_empty() || text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorMessage::new("Missing fields")),
        )
            .into_response();
    }

    let message = ContactMessage {
        name: name.to_string(),
        email: email.to_string(),
        message: text.to_string(),
    };

    if let Err(err) = store.insert(&message).await {
        error!("Failed to persist contact message: {err}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorMessage::new("Internal server error")),
        )
            .into_response();
    }

    // Persisted; a relay failure only means delivery is pending.
    if let Err(err) = relay.deliver(&message).await {
        error!("Failed to relay contact message: {err}");
        return (
            StatusCode::BAD_GATEWAY,
            Json(ErrorMessage::new("Failed to deliver message")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}
