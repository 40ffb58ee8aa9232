//! OpenAPI document for the served routes.

use axum::Json;
use utoipa::OpenApi;

use super::handlers::{auth, contact, health, projects, upload};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "folio",
        description = "Portfolio showcase API with a single-admin content panel"
    ),
    paths(
        health::health,
        auth::session::login,
        auth::session::refresh,
        auth::session::logout,
        projects::list_public,
        projects::get_public,
        projects::admin_list,
        projects::admin_get,
        projects::create,
        projects::update,
        projects::delete,
        upload::upload,
        contact::submit,
    ),
    components(schemas(
        health::Health,
        auth::types::LoginRequest,
        auth::types::TokenPairResponse,
        auth::types::LogoutResponse,
        auth::types::ErrorMessage,
        projects::types::CreateProjectRequest,
        projects::types::UpdateProjectRequest,
        projects::types::ProjectResponse,
        contact::ContactRequest,
    )),
    tags(
        (name = "auth", description = "Admin session lifecycle"),
        (name = "projects", description = "Public portfolio reads"),
        (name = "admin", description = "Content management"),
        (name = "contact", description = "Contact form"),
        (name = "health", description = "Service health")
    )
)]
pub(crate) struct ApiDoc;

pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/admin/login",
            "/admin/refresh",
            "/admin/logout",
            "/admin/projects",
            "/admin/projects/{id}",
            "/admin/upload",
            "/projects",
            "/projects/{slug}",
            "/contact",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
