//! Router assembly and server loop.

use anyhow::{Context, Result, anyhow};
use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, Extension, MatchedPath},
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;

use crate::api::handlers::auth::{
    AuthConfig, AuthState, FixedWindowLimiter, PgAdminStore, SessionEngine, TokenIssuer,
};
use crate::api::handlers::contact::{ContactStore, PgContactStore};
use crate::api::handlers::projects::{PgProjectStore, ProjectStore};

pub(crate) mod email;
pub mod handlers;
pub(crate) mod media;
mod openapi;

pub use email::RelayConfig;
pub use media::MediaConfig;

use email::ContactRelay;
use media::MediaHost;

/// Everything the router needs; tests build this with in-memory stores.
pub(crate) struct AppContext {
    pub(crate) auth_state: Arc<AuthState>,
    pub(crate) project_store: Arc<dyn ProjectStore>,
    pub(crate) contact_store: Arc<dyn ContactStore>,
    pub(crate) contact_relay: Arc<dyn ContactRelay>,
    pub(crate) media_host: Arc<dyn MediaHost>,
}

/// Build the application router with all routes and layers.
pub(crate) fn app(context: AppContext) -> Result<Router> {
    let frontend_origin = frontend_origin(context.auth_state.config().frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-admin-token"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let router = Router::new()
        .route("/", get(handlers::root::root))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .route("/openapi.json", get(openapi::openapi_json))
        .route("/admin/login", post(handlers::auth::session::login))
        .route("/admin/refresh", post(handlers::auth::session::refresh))
        .route("/admin/logout", post(handlers::auth::session::logout))
        .route(
            "/admin/projects",
            get(handlers::projects::admin_list).post(handlers::projects::create),
        )
        .route(
            "/admin/projects/:id",
            get(handlers::projects::admin_get)
                .put(handlers::projects::update)
                .delete(handlers::projects::delete),
        )
        .route("/admin/upload", post(handlers::upload::upload))
        .route("/projects", get(handlers::projects::list_public))
        .route("/projects/:slug", get(handlers::projects::get_public))
        .route("/contact", post(handlers::contact::submit))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(DefaultBodyLimit::max(media::DEFAULT_MAX_UPLOAD_BYTES * 2))
                .layer(Extension(context.auth_state))
                .layer(Extension(context.project_store))
                .layer(Extension(context.contact_store))
                .layer(Extension(context.contact_relay))
                .layer(Extension(context.media_host)),
        );

    Ok(router)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
#[allow(clippy::too_many_arguments)]
pub async fn new(
    port: u16,
    dsn: String,
    auth_config: AuthConfig,
    access_secret: SecretString,
    refresh_secret: SecretString,
    admin_api_token: Option<SecretString>,
    media_config: MediaConfig,
    relay_config: RelayConfig,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let issuer = TokenIssuer::new(
        access_secret,
        refresh_secret,
        auth_config.access_ttl_seconds(),
        auth_config.refresh_ttl_seconds(),
    );
    let engine = SessionEngine::new(Arc::new(PgAdminStore::new(pool.clone())), issuer);
    let rate_limiter = Arc::new(FixedWindowLimiter::new(
        auth_config.login_max_attempts(),
        Duration::from_secs(auth_config.login_window_seconds()),
    ));
    let auth_state = Arc::new(AuthState::new(
        auth_config,
        engine,
        rate_limiter,
        admin_api_token,
    ));

    let context = AppContext {
        auth_state,
        project_store: Arc::new(PgProjectStore::new(pool.clone())),
        contact_store: Arc::new(PgContactStore::new(pool)),
        contact_relay: email::relay_from_config(&relay_config)?,
        media_host: media::media_host_from_config(&media_config)?,
    };
    let app = app(context)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {err}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id = request_id
    )
}

/// Resolve the exact CORS origin from the configured frontend base URL.
fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let url = Url::parse(frontend_base_url)
        .with_context(|| format!("invalid frontend base URL: {frontend_base_url}"))?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("frontend base URL has no host: {frontend_base_url}"))?;
    let origin = match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    };
    HeaderValue::from_str(&origin)
        .with_context(|| format!("frontend origin is not a valid header value: {origin}"))
}


#[cfg(test)]
mod origin_tests {
    use super::frontend_origin;

    #[test]
    fn origin_strips_path_and_keeps_port() {
        let origin = frontend_origin("http://localhost:5173/app").expect("origin");
        assert_eq!(origin, "http://localhost:5173");

        let origin = frontend_origin("https://folio.dev/").expect("origin");
        assert_eq!(origin, "https://folio.dev");
    }

    #[test]
    fn origin_rejects_garbage() {
        assert!(frontend_origin("not a url").is_err());
    }
}
