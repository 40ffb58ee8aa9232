use crate::api::{self, email::RelayConfig, handlers::auth::AuthConfig, media::MediaConfig};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub frontend_base_url: String,
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub admin_api_token: Option<SecretString>,
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
    pub media_upload_url: Option<String>,
    pub media_api_key: Option<SecretString>,
    pub media_max_bytes: usize,
    pub contact_relay_url: Option<String>,
    pub contact_to: Option<String>,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_access_ttl_seconds(args.access_ttl_seconds)
        .with_refresh_ttl_seconds(args.refresh_ttl_seconds)
        .with_login_max_attempts(args.login_max_attempts)
        .with_login_window_seconds(args.login_window_seconds);

    let media_config = MediaConfig::new(
        args.media_upload_url,
        args.media_api_key,
        args.media_max_bytes,
    );

    let relay_config = RelayConfig::new(args.contact_relay_url, args.contact_to);

    api::new(
        args.port,
        args.dsn,
        auth_config,
        args.access_token_secret,
        args.refresh_token_secret,
        args.admin_api_token,
        media_config,
        relay_config,
    )
    .await
}
