//! Request/response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body returned by both login and refresh.
///
/// The CSRF token is duplicated here so single-page clients can pick it up
/// without reading cookies; the `csrf` cookie carries the same value.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub csrf_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_serializes_camel_case() {
        let body = TokenPairResponse {
            access_token: "a".to_string(),
            csrf_token: "c".to_string(),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["csrfToken"], "c");
    }

    #[test]
    fn login_request_defaults_missing_fields() {
        let request: LoginRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(request.email.is_empty());
        assert!(request.password.is_empty());
    }
}
