//! Login, refresh, and logout endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::{
    engine::{AuthFlowError, TokenTriple},
    rate_limit::RateLimitDecision,
    state::{AuthConfig, AuthState},
    types::{ErrorMessage, LoginRequest, LogoutResponse, TokenPairResponse},
    utils::{extract_client_ip, extract_cookie},
};

pub(crate) const RT_COOKIE: &str = "rt";
pub(crate) const CSRF_COOKIE: &str = "csrf";

/// The refresh cookie is scoped to the admin subtree so it travels with both
/// `/admin/refresh` and `/admin/logout` and nowhere else.
const RT_COOKIE_PATH: &str = "/admin";

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session started", body = TokenPairResponse),
        (status = 400, description = "Missing fields", body = ErrorMessage),
        (status = 401, description = "Invalid credentials", body = ErrorMessage),
        (status = 429, description = "Too many attempts", body = ErrorMessage)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse {
    let client_ip = extract_client_ip(&headers);
    if auth_state.rate_limiter().check(client_ip.as_deref()) == RateLimitDecision::Limited {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts, please try again later.",
        );
    }

    if body.email.is_empty() || body.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing fields");
    }

    match auth_state.engine().login(&body.email, &body.password).await {
        Ok(triple) => token_response(auth_state.config(), triple),
        Err(err) => flow_error_response(err),
    }
}

#[utoipa::path(
    post,
    path = "/admin/refresh",
    responses(
        (status = 200, description = "Session rotated", body = TokenPairResponse),
        (status = 401, description = "Missing, invalid, or revoked refresh token", body = ErrorMessage)
    ),
    tag = "auth"
)]
pub async fn refresh(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let token = extract_cookie(&headers, RT_COOKIE);
    match auth_state.engine().refresh(token.as_deref()).await {
        Ok(triple) => token_response(auth_state.config(), triple),
        Err(err) => flow_error_response(err),
    }
}

#[utoipa::path(
    post,
    path = "/admin/logout",
    responses(
        (status = 200, description = "Session cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let token = extract_cookie(&headers, RT_COOKIE);
    auth_state.engine().logout(token.as_deref()).await;

    // Always clear both cookies and report success, even without a session.
    let mut response_headers = HeaderMap::new();
    append_cookie(
        &mut response_headers,
        clear_refresh_cookie(auth_state.config()),
    );
    append_cookie(
        &mut response_headers,
        clear_csrf_cookie(auth_state.config()),
    );
    (
        StatusCode::OK,
        response_headers,
        Json(LogoutResponse { success: true }),
    )
        .into_response()
}

/// Answer a successful login/refresh: both cookies plus the JSON pair.
fn token_response(config: &AuthConfig, triple: TokenTriple) -> axum::response::Response {
    let mut response_headers = HeaderMap::new();
    append_cookie(
        &mut response_headers,
        refresh_cookie(config, &triple.refresh_token),
    );
    append_cookie(
        &mut response_headers,
        csrf_cookie(config, &triple.csrf_token),
    );
    (
        StatusCode::OK,
        response_headers,
        Json(TokenPairResponse {
            access_token: triple.access_token,
            csrf_token: triple.csrf_token,
        }),
    )
        .into_response()
}

fn flow_error_response(err: AuthFlowError) -> axum::response::Response {
    let status = match err {
        AuthFlowError::InvalidCredentials
        | AuthFlowError::NoSession
        | AuthFlowError::InvalidToken
        | AuthFlowError::InvalidSession
        | AuthFlowError::SessionRevoked => StatusCode::UNAUTHORIZED,
        AuthFlowError::Internal(ref inner) => {
            error!("Auth flow failed: {inner}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    error_response(status, &err.to_string())
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(ErrorMessage::new(message))).into_response()
}

fn append_cookie(headers: &mut HeaderMap, cookie: Result<HeaderValue, InvalidHeaderValue>) {
    match cookie {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(err) => error!("Failed to build cookie header: {err}"),
    }
}

/// `HttpOnly` refresh cookie; the browser is the only holder of this value.
fn refresh_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.refresh_ttl_seconds();
    let mut cookie = format!(
        "{RT_COOKIE}={token}; Path={RT_COOKIE_PATH}; HttpOnly; {}; Max-Age={max_age}",
        same_site(config)
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Readable CSRF cookie for the double-submit check; deliberately not
/// `HttpOnly` so the frontend can echo it in `x-csrf-token`.
fn csrf_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.refresh_ttl_seconds();
    let mut cookie = format!(
        "{CSRF_COOKIE}={token}; Path=/; {}; Max-Age={max_age}",
        same_site(config)
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_refresh_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{RT_COOKIE}=; Path={RT_COOKIE_PATH}; HttpOnly; {}; Max-Age=0",
        same_site(config)
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_csrf_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{CSRF_COOKIE}=; Path=/; {}; Max-Age=0", same_site(config));
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Cross-site frontends need `SameSite=None` (which browsers only accept with
/// `Secure`); local HTTP development falls back to `Lax`.
fn same_site(config: &AuthConfig) -> &'static str {
    if config.cookie_secure() {
        "SameSite=None"
    } else {
        "SameSite=Lax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn https_config() -> AuthConfig {
        AuthConfig::new("https://folio.dev".to_string())
    }

    fn http_config() -> AuthConfig {
        AuthConfig::new("http://localhost:5173".to_string())
    }

    #[test]
    fn refresh_cookie_is_http_only_and_scoped() {
        let cookie = refresh_cookie(&https_config(), "token").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("rt=token; Path=/admin; HttpOnly;"));
        assert!(value.contains("SameSite=None"));
        assert!(value.contains("Secure"));
    }

    #[test]
    fn csrf_cookie_is_readable() {
        let cookie = csrf_cookie(&https_config(), "token").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(!value.contains("HttpOnly"));
        assert!(value.starts_with("csrf=token; Path=/;"));
    }

    #[test]
    fn http_frontend_uses_lax_without_secure() {
        let cookie = refresh_cookie(&http_config(), "token").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.contains("SameSite=Lax"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn clear_cookies_expire_immediately() {
        let rt = clear_refresh_cookie(&http_config()).expect("cookie");
        let csrf = clear_csrf_cookie(&http_config()).expect("cookie");
        assert!(rt.to_str().expect("ascii").contains("Max-Age=0"));
        assert!(csrf.to_str().expect("ascii").contains("Max-Age=0"));
    }
}
