//! Auth configuration and shared state.

use secrecy::SecretString;
use std::sync::Arc;

use super::engine::SessionEngine;
use super::rate_limit::RateLimiter;

const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_LOGIN_MAX_ATTEMPTS: u32 = 8;
const DEFAULT_LOGIN_WINDOW_SECONDS: u64 = 15 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    login_max_attempts: u32,
    login_window_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            login_max_attempts: DEFAULT_LOGIN_MAX_ATTEMPTS,
            login_window_seconds: DEFAULT_LOGIN_WINDOW_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_login_max_attempts(mut self, attempts: u32) -> Self {
        self.login_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_login_window_seconds(mut self, seconds: u64) -> Self {
        self.login_window_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    #[must_use]
    pub fn login_max_attempts(&self) -> u32 {
        self.login_max_attempts
    }

    #[must_use]
    pub fn login_window_seconds(&self) -> u64 {
        self.login_window_seconds
    }

    /// Only mark cookies Secure (and cross-site capable) when the frontend is
    /// actually served over HTTPS; SameSite=None without Secure is rejected by
    /// browsers.
    pub(crate) fn cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    engine: SessionEngine,
    rate_limiter: Arc<dyn RateLimiter>,
    admin_api_token: Option<SecretString>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        engine: SessionEngine,
        rate_limiter: Arc<dyn RateLimiter>,
        admin_api_token: Option<SecretString>,
    ) -> Self {
        Self {
            config,
            engine,
            rate_limiter,
            admin_api_token,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(crate) fn admin_api_token(&self) -> Option<&SecretString> {
        self.admin_api_token.as_ref()
    }
}
