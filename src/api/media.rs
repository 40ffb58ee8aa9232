//! Media host delegation for image uploads.
//!
//! The admin panel never talks to the media host directly; uploads go through
//! the API so the host credentials stay server-side. The `MediaHost` trait
//! keeps the transport testable without a real host.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct MediaConfig {
    upload_url: Option<String>,
    api_key: Option<SecretString>,
    max_bytes: usize,
}

impl MediaConfig {
    #[must_use]
    pub fn new(upload_url: Option<String>, api_key: Option<SecretString>, max_bytes: usize) -> Self {
        Self {
            upload_url,
            api_key,
            max_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Upload is not configured")]
    Unconfigured,
    #[error("File too large")]
    TooLarge,
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Push the file to the host and return its public URL.
    async fn store(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, MediaError>;
}

/// Deployment without a media host; every upload is refused.
pub struct UnconfiguredMediaHost;

#[async_trait]
impl MediaHost for UnconfiguredMediaHost {
    async fn store(
        &self,
        _filename: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, MediaError> {
        Err(MediaError::Unconfigured)
    }
}

#[derive(Debug, Deserialize)]
struct MediaHostResponse {
    url: String,
}

pub struct HttpMediaHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: Option<SecretString>,
    max_bytes: usize,
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn store(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, MediaError> {
        if bytes.len() > self.max_bytes {
            return Err(MediaError::TooLarge);
        }

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|err| anyhow!("invalid upload content type: {err}"))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .context("media host request failed")?;
        if !response.status().is_success() {
            return Err(MediaError::Upstream(anyhow!(
                "media host returned status {}",
                response.status()
            )));
        }
        let body: MediaHostResponse = response
            .json()
            .await
            .context("media host returned an unexpected body")?;
        Ok(body.url)
    }
}

/// Build the configured media host; no URL means uploads are refused.
pub fn media_host_from_config(config: &MediaConfig) -> anyhow::Result<Arc<dyn MediaHost>> {
    match &config.upload_url {
        Some(upload_url) => {
            let client = reqwest::Client::builder()
                .user_agent(crate::APP_USER_AGENT)
                .build()
                .context("failed to build media host client")?;
            Ok(Arc::new(HttpMediaHost {
                client,
                upload_url: upload_url.clone(),
                api_key: config.api_key.clone(),
                max_bytes: config.max_bytes,
            }))
        }
        None => Ok(Arc::new(UnconfiguredMediaHost)),
    }
}
