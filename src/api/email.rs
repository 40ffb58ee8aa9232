//! Contact relay abstractions.
//!
//! Contact submissions are persisted first and then handed to a
//! `ContactRelay` for delivery. The default relay for local dev is
//! `LogContactRelay`, which logs and returns `Ok(())`; production points the
//! HTTP relay at a mail-delivery webhook.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Debug)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Delivery abstraction used by the contact endpoint.
#[async_trait]
pub trait ContactRelay: Send + Sync {
    /// Deliver a message or return an error to surface an upstream failure.
    async fn deliver(&self, message: &ContactMessage) -> Result<()>;
}

/// Local dev relay that logs the payload instead of delivering it.
#[derive(Clone, Debug)]
pub struct LogContactRelay;

#[async_trait]
impl ContactRelay for LogContactRelay {
    async fn deliver(&self, message: &ContactMessage) -> Result<()> {
        info!(
            from_name = %message.name,
            from_email = %message.email,
            "contact relay send stub"
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    relay_url: Option<String>,
    to: Option<String>,
}

impl RelayConfig {
    #[must_use]
    pub fn new(relay_url: Option<String>, to: Option<String>) -> Self {
        Self { relay_url, to }
    }
}

/// HTTP relay posting submissions to a delivery webhook.
pub struct HttpContactRelay {
    client: reqwest::Client,
    relay_url: String,
    to: Option<String>,
}

#[async_trait]
impl ContactRelay for HttpContactRelay {
    async fn deliver(&self, message: &ContactMessage) -> Result<()> {
        let body = serde_json::json!({
            "name": message.name,
            "email": message.email,
            "message": message.message,
            "to": self.to,
        });
        let response = self
            .client
            .post(&self.relay_url)
            .json(&body)
            .send()
            .await
            .context("contact relay request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "contact relay returned status {}",
                response.status()
            ));
        }
        Ok(())
    }
}

/// Build the configured relay; no URL means the logging stub.
pub fn relay_from_config(config: &RelayConfig) -> Result<Arc<dyn ContactRelay>> {
    match &config.relay_url {
        Some(relay_url) => {
            let client = reqwest::Client::builder()
                .user_agent(crate::APP_USER_AGENT)
                .build()
                .context("failed to build contact relay client")?;
            Ok(Arc::new(HttpContactRelay {
                client,
                relay_url: relay_url.clone(),
                to: config.to.clone(),
            }))
        }
        None => Ok(Arc::new(LogContactRelay)),
    }
}
