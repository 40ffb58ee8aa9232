//! Request gates for the admin surface: bearer/shared-secret auth and the
//! double-submit CSRF check.

use axum::{
    Json,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use super::{
    session::CSRF_COOKIE,
    state::AuthState,
    tokens::{AccessClaims, ROLE_ADMIN},
    types::ErrorMessage,
    utils::{extract_bearer_token, extract_cookie},
};

pub(crate) const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
pub(crate) const CSRF_HEADER: &str = "x-csrf-token";

/// How a request proved it may touch the admin surface.
#[derive(Debug)]
pub(crate) enum AdminIdentity {
    /// A session access token; carries the verified claims.
    Token(AccessClaims),
    /// The fixed `x-admin-token` header used by non-interactive tooling.
    SharedSecret,
}

/// Authenticate an admin request.
///
/// The shared-secret header wins over bearer auth when both are present; it
/// exists for scripts that have no session at all.
pub(crate) fn require_admin(
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<AdminIdentity, Response> {
    if let Some(expected) = auth_state.admin_api_token() {
        if let Some(presented) = headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
            let matches: bool = presented
                .as_bytes()
                .ct_eq(expected.expose_secret().as_bytes())
                .into();
            if matches {
                return Ok(AdminIdentity::SharedSecret);
            }
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired auth token",
            ));
        }
    }

    let Some(token) = extract_bearer_token(headers) else {
        return Err(error_response(StatusCode::UNAUTHORIZED, "Missing auth token"));
    };
    let Some(claims) = auth_state.engine().issuer().verify_access(&token) else {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid or expired auth token",
        ));
    };
    if claims.role != ROLE_ADMIN {
        return Err(error_response(StatusCode::FORBIDDEN, "Admin role required"));
    }
    Ok(AdminIdentity::Token(claims))
}

/// Double-submit CSRF check for mutating requests.
///
/// The `x-csrf-token` header must equal the readable `csrf` cookie. Safe
/// methods pass untouched so reads never need the header.
pub(crate) fn csrf_guard(method: &Method, headers: &HeaderMap) -> Result<(), Response> {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(());
    }

    let cookie = extract_cookie(headers, CSRF_COOKIE);
    let header = headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match (cookie, header) {
        (Some(cookie), Some(header)) if cookie == header => Ok(()),
        (Some(_), Some(_)) => Err(error_response(StatusCode::FORBIDDEN, "CSRF token mismatch")),
        _ => Err(error_response(StatusCode::FORBIDDEN, "CSRF token missing")),
    }
}

/// Combined gate for mutating admin endpoints.
///
/// Shared-secret callers skip CSRF: the header is not set by a browser, so
/// cross-site request forgery does not apply to it.
pub(crate) fn admin_write(
    method: &Method,
    headers: &HeaderMap,
    auth_state: &AuthState,
) -> Result<AdminIdentity, Response> {
    let identity = require_admin(headers, auth_state)?;
    if matches!(identity, AdminIdentity::Token(_)) {
        csrf_guard(method, headers)?;
    }
    Ok(identity)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorMessage::new(message))).into_response()
}
