//! Image upload proxy for the admin panel.

use axum::{
    Json,
    extract::{Extension, Multipart},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use super::auth::AuthState;
use super::auth::guard::admin_write;
use super::auth::types::ErrorMessage;
use crate::api::media::{MediaError, MediaHost};

#[utoipa::path(
    post,
    path = "/admin/upload",
    responses(
        (status = 200, description = "Public URL of the stored file"),
        (status = 400, description = "No file in the form", body = ErrorMessage),
        (status = 401, description = "Missing or invalid credentials", body = ErrorMessage),
        (status = 403, description = "CSRF check failed", body = ErrorMessage),
        (status = 413, description = "File too large", body = ErrorMessage),
        (status = 502, description = "Media host failure", body = ErrorMessage),
        (status = 503, description = "No media host configured", body = ErrorMessage)
    ),
    tag = "admin"
)]
pub async fn upload(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    media_host: Extension<Arc<dyn MediaHost>>,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = admin_write(&Method::POST, &headers, &auth_state) {
        return response;
    }

    // First file part wins; the admin form only ever sends one.
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.file_name().is_some() => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return message_response(StatusCode::BAD_REQUEST, "No file provided");
            }
            Err(err) => {
                error!("Failed to read multipart body: {err}");
                return message_response(StatusCode::BAD_REQUEST, "Invalid multipart body");
            }
        }
    };

    let filename = field
        .file_name()
        .unwrap_or("upload.bin")
        .to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = match field.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(err) => {
            error!("Failed to read upload body: {err}");
            return message_response(StatusCode::BAD_REQUEST, "Invalid multipart body");
        }
    };

    match media_host.store(&filename, &content_type, bytes).await {
        Ok(url) => (StatusCode::OK, Json(serde_json::json!({ "url": url }))).into_response(),
        Err(MediaError::Unconfigured) => {
            message_response(StatusCode::SERVICE_UNAVAILABLE, "Upload is not configured")
        }
        Err(MediaError::TooLarge) => {
            message_response(StatusCode::PAYLOAD_TOO_LARGE, "File too large")
        }
        Err(MediaError::Upstream(err)) => {
            error!("Media host upload failed: {err}");
            message_response(StatusCode::BAD_GATEWAY, "Upload failed")
        }
    }
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorMessage::new(message))).into_response()
}
