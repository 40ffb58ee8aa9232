//! Admin client with a self-renewing session.
//!
//! The client keeps the access and CSRF tokens only in memory; the refresh
//! token lives in the `reqwest` cookie store and is never exposed. On a 401
//! the client refreshes once and retries the request once.
//!
//! Concurrent 401s serialize on the session mutex: the first caller performs
//! the refresh, the rest observe the bumped generation and just retry with
//! the new tokens.

use anyhow::Context;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not authenticated")]
    NotAuthenticated,
    /// The session could not be renewed; a fresh login is required.
    #[error("authentication expired")]
    AuthExpired,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Clone, Debug)]
struct SessionTokens {
    access_token: String,
    csrf_token: String,
}

#[derive(Debug, Default)]
struct AgentState {
    tokens: Option<SessionTokens>,
    /// Bumped on every successful refresh or login; lets a queued caller see
    /// that someone else already renewed the session.
    generation: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair {
    access_token: String,
    csrf_token: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
    state: Mutex<AgentState>,
}

impl AdminClient {
    /// Build a client against the API base URL.
    ///
    /// # Errors
    /// Returns an error when the URL is invalid or the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid API base URL: {base_url}"))?;
        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .cookie_store(true)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            state: Mutex::new(AgentState::default()),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid API path: {path}"))
            .map_err(ClientError::Other)
    }

    /// Start a session; the refresh token lands in the cookie store.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let url = self.endpoint("/admin/login")?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let pair: TokenPair = response.json().await?;

        let mut state = self.state.lock().await;
        state.tokens = Some(SessionTokens {
            access_token: pair.access_token,
            csrf_token: pair.csrf_token,
        });
        state.generation += 1;
        Ok(())
    }

    /// Try to resume a previous session from the refresh cookie.
    ///
    /// Returns `false` when there is no usable session; that is the normal
    /// logged-out state, not an error.
    pub async fn silent_refresh(&self) -> Result<bool, ClientError> {
        let mut state = self.state.lock().await;
        match self.refresh_locked(&mut state).await {
            Ok(()) => Ok(true),
            Err(ClientError::AuthExpired) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// End the session on both sides.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let url = self.endpoint("/admin/logout")?;
        self.http.post(url).send().await?;
        let mut state = self.state.lock().await;
        state.tokens = None;
        state.generation += 1;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.send(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        let response = self.send(Method::POST, path, Some(body.clone())).await?;
        Ok(response.json().await?)
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        let response = self.send(Method::PUT, path, Some(body.clone())).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Send an authenticated request, refreshing and retrying once on 401.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.endpoint(path)?;
        let (tokens, generation) = {
            let state = self.state.lock().await;
            let Some(tokens) = state.tokens.clone() else {
                return Err(ClientError::NotAuthenticated);
            };
            (tokens, state.generation)
        };

        let response = self
            .request(method.clone(), url.clone(), body.as_ref(), &tokens)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check(response).await;
        }

        debug!("access token rejected, refreshing session");
        let tokens = self.renew(generation).await?;
        let response = self.request(method, url, body.as_ref(), &tokens).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            // Retried once already; give up rather than loop.
            return Err(ClientError::AuthExpired);
        }
        check(response).await
    }

    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        tokens: &SessionTokens,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&tokens.access_token)
            .header("x-csrf-token", &tokens.csrf_token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Renew the session unless another caller already did.
    async fn renew(&self, observed_generation: u64) -> Result<SessionTokens, ClientError> {
        let mut state = self.state.lock().await;
        if state.generation != observed_generation {
            if let Some(tokens) = state.tokens.clone() {
                return Ok(tokens);
            }
        }
        self.refresh_locked(&mut state).await?;
        state
            .tokens
            .clone()
            .ok_or(ClientError::AuthExpired)
    }

    async fn refresh_locked(&self, state: &mut AgentState) -> Result<(), ClientError> {
        let url = self.endpoint("/admin/refresh")?;
        let result = self.http.post(url).send().await;
        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(_) | Err(_) => {
                // Renewal failed; whatever tokens we held are worthless.
                state.tokens = None;
                state.generation += 1;
                return Err(ClientError::AuthExpired);
            }
        };
        let pair: TokenPair = response.json().await?;
        state.tokens = Some(SessionTokens {
            access_token: pair.access_token,
            csrf_token: pair.csrf_token,
        });
        state.generation += 1;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn poison_access_token(&self) {
        let mut state = self.state.lock().await;
        if let Some(tokens) = &mut state.tokens {
            tokens.access_token = "poisoned".to_string();
        }
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ApiError>()
        .await
        .map(|err| err.message)
        .unwrap_or_else(|_| status.to_string());
    Err(ClientError::Api { status, message })
}

async fn api_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(err) => ClientError::Api {
            status,
            message: err.message,
        },
        Err(err) => ClientError::Http(err),
    }
}
