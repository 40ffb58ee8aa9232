//! Public portfolio endpoints and the admin project CRUD.
//!
//! The public surface only ever sees published projects; the admin surface
//! sees everything and is gated by [`super::auth::guard`].

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::auth::AuthState;
use super::auth::guard::{admin_write, require_admin};
use super::auth::types::ErrorMessage;

mod slug;
pub(crate) mod storage;
pub(crate) mod types;

pub use storage::{PgProjectStore, ProjectStore};

use slug::normalize_slug;
use storage::{NewProject, ProjectChanges, ProjectStoreError};
use types::{CreateProjectRequest, ProjectResponse, UpdateProjectRequest};

#[utoipa::path(
    get,
    path = "/projects",
    responses(
        (status = 200, description = "Published projects, newest year first", body = [ProjectResponse])
    ),
    tag = "projects"
)]
pub async fn list_public(store: Extension<Arc<dyn ProjectStore>>) -> impl IntoResponse {
    match store.list_published().await {
        Ok(records) => {
            let body: Vec<ProjectResponse> =
                records.into_iter().map(ProjectResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!("Failed to list published projects: {err}");
            internal_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/projects/{slug}",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Published project", body = ProjectResponse),
        (status = 404, description = "Unknown or unpublished slug", body = ErrorMessage)
    ),
    tag = "projects"
)]
pub async fn get_public(
    Path(slug): Path<String>,
    store: Extension<Arc<dyn ProjectStore>>,
) -> impl IntoResponse {
    match store.find_published_by_slug(&slug).await {
        Ok(Some(record)) => {
            (StatusCode::OK, Json(ProjectResponse::from(record))).into_response()
        }
        Ok(None) => not_found(),
        Err(err) => {
            error!("Failed to lookup project {slug}: {err}");
            internal_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/projects",
    responses(
        (status = 200, description = "All projects, drafts included", body = [ProjectResponse]),
        (status = 401, description = "Missing or invalid credentials", body = ErrorMessage)
    ),
    tag = "admin"
)]
pub async fn admin_list(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<dyn ProjectStore>>,
) -> Response {
    if let Err(response) = require_admin(&headers, &auth_state) {
        return response;
    }
    match store.list_all().await {
        Ok(records) => {
            let body: Vec<ProjectResponse> =
                records.into_iter().map(ProjectResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            error!("Failed to list projects: {err}");
            internal_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorMessage),
        (status = 404, description = "Unknown project", body = ErrorMessage)
    ),
    tag = "admin"
)]
pub async fn admin_get(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<dyn ProjectStore>>,
) -> Response {
    if let Err(response) = require_admin(&headers, &auth_state) {
        return response;
    }
    match store.find_by_id(id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(ProjectResponse::from(record))).into_response(),
        Ok(None) => not_found(),
        Err(err) => {
            error!("Failed to lookup project {id}: {err}");
            internal_error()
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid input", body = ErrorMessage),
        (status = 401, description = "Missing or invalid credentials", body = ErrorMessage),
        (status = 403, description = "CSRF check failed", body = ErrorMessage),
        (status = 409, description = "Slug already in use", body = ErrorMessage)
    ),
    tag = "admin"
)]
pub async fn create(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<dyn ProjectStore>>,
    Json(payload): Json<CreateProjectRequest>,
) -> Response {
    let identity = match admin_write(&Method::POST, &headers, &auth_state) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    tracing::debug!(?identity, "project create authorized");

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return message_response(StatusCode::BAD_REQUEST, "Project title is required");
    }
    // The slug defaults to a normalized form of the title.
    let slug_source = payload.slug.as_deref().unwrap_or(&title);
    let Some(slug) = normalize_slug(slug_source) else {
        return message_response(StatusCode::BAD_REQUEST, "Invalid project slug");
    };

    let project = NewProject {
        title,
        slug,
        summary: payload.summary,
        description: payload.description,
        role: payload.role,
        stack: payload.stack,
        year: payload.year,
        cover_image: payload.cover_image,
        screenshots: payload.screenshots,
        repo_url: payload.repo_url,
        demo_url: payload.demo_url,
        featured: payload.featured,
        published: payload.published,
    };

    match store.insert(project).await {
        Ok(record) => (StatusCode::CREATED, Json(ProjectResponse::from(record))).into_response(),
        Err(ProjectStoreError::SlugConflict) => {
            message_response(StatusCode::CONFLICT, "Slug already in use")
        }
        Err(ProjectStoreError::Other(err)) => {
            error!("Failed to create project: {err}");
            internal_error()
        }
    }
}

#[utoipa::path(
    put,
    path = "/admin/projects/{id}",
    request_body = UpdateProjectRequest,
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Invalid input", body = ErrorMessage),
        (status = 401, description = "Missing or invalid credentials", body = ErrorMessage),
        (status = 403, description = "CSRF check failed", body = ErrorMessage),
        (status = 404, description = "Unknown project", body = ErrorMessage),
        (status = 409, description = "Slug already in use", body = ErrorMessage)
    ),
    tag = "admin"
)]
pub async fn update(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<dyn ProjectStore>>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Response {
    if let Err(response) = admin_write(&Method::PUT, &headers, &auth_state) {
        return response;
    }

    let slug = match payload.slug.as_deref() {
        Some(raw) => match normalize_slug(raw) {
            Some(slug) => Some(slug),
            None => return message_response(StatusCode::BAD_REQUEST, "Invalid project slug"),
        },
        None => None,
    };
    if let Some(title) = payload.title.as_deref() {
        if title.trim().is_empty() {
            return message_response(StatusCode::BAD_REQUEST, "Project title is required");
        }
    }

    let changes = ProjectChanges {
        title: payload.title,
        slug,
        summary: payload.summary,
        description: payload.description,
        role: payload.role,
        stack: payload.stack,
        year: payload.year,
        cover_image: payload.cover_image,
        screenshots: payload.screenshots,
        repo_url: payload.repo_url,
        demo_url: payload.demo_url,
        featured: payload.featured,
        published: payload.published,
    };

    match store.update(id, changes).await {
        Ok(Some(record)) => (StatusCode::OK, Json(ProjectResponse::from(record))).into_response(),
        Ok(None) => not_found(),
        Err(ProjectStoreError::SlugConflict) => {
            message_response(StatusCode::CONFLICT, "Slug already in use")
        }
        Err(ProjectStoreError::Other(err)) => {
            error!("Failed to update project {id}: {err}");
            internal_error()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 401, description = "Missing or invalid credentials", body = ErrorMessage),
        (status = 403, description = "CSRF check failed", body = ErrorMessage),
        (status = 404, description = "Unknown project", body = ErrorMessage)
    ),
    tag = "admin"
)]
pub async fn delete(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    store: Extension<Arc<dyn ProjectStore>>,
) -> Response {
    if let Err(response) = admin_write(&Method::DELETE, &headers, &auth_state) {
        return response;
    }
    match store.delete(id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Ok(false) => not_found(),
        Err(err) => {
            error!("Failed to delete project {id}: {err}");
            internal_error()
        }
    }
}

fn not_found() -> Response {
    message_response(StatusCode::NOT_FOUND, "Project not found")
}

fn internal_error() -> Response {
    message_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorMessage::new(message))).into_response()
}
