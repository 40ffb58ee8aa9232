//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let access_token_secret = matches
        .get_one::<String>("access-token-secret")
        .cloned()
        .context("missing required argument: --access-token-secret")?;
    let refresh_token_secret = matches
        .get_one::<String>("refresh-token-secret")
        .cloned()
        .context("missing required argument: --refresh-token-secret")?;

    let frontend_base_url = matches
        .get_one::<String>("frontend-base-url")
        .cloned()
        .unwrap_or_else(|| "http://localhost:5173".to_string());

    Ok(Action::Server(Args {
        port,
        dsn,
        frontend_base_url,
        access_token_secret: SecretString::from(access_token_secret),
        refresh_token_secret: SecretString::from(refresh_token_secret),
        access_ttl_seconds: matches
            .get_one::<i64>("access-ttl-seconds")
            .copied()
            .unwrap_or(900),
        refresh_ttl_seconds: matches
            .get_one::<i64>("refresh-ttl-seconds")
            .copied()
            .unwrap_or(604_800),
        admin_api_token: matches
            .get_one::<String>("admin-api-token")
            .cloned()
            .map(SecretString::from),
        login_max_attempts: matches
            .get_one::<u32>("login-max-attempts")
            .copied()
            .unwrap_or(8),
        login_window_seconds: matches
            .get_one::<u64>("login-window-seconds")
            .copied()
            .unwrap_or(900),
        media_upload_url: matches.get_one::<String>("media-upload-url").cloned(),
        media_api_key: matches
            .get_one::<String>("media-api-key")
            .cloned()
            .map(SecretString::from),
        media_max_bytes: matches
            .get_one::<usize>("media-max-bytes")
            .copied()
            .unwrap_or(5 * 1024 * 1024),
        contact_relay_url: matches.get_one::<String>("contact-relay-url").cloned(),
        contact_to: matches.get_one::<String>("contact-to").cloned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn dsn_required() {
        temp_env::with_vars(
            [
                ("FOLIO_DSN", None::<&str>),
                ("FOLIO_ACCESS_TOKEN_SECRET", Some("a")),
                ("FOLIO_REFRESH_TOKEN_SECRET", Some("r")),
            ],
            || {
                let command = crate::cli::commands::new();
                let result = command.try_get_matches_from(vec!["folio"]);
                assert!(result.is_err());
            },
        );
    }

    #[test]
    fn builds_server_action() {
        temp_env::with_vars([("FOLIO_PORT", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "folio",
                "--dsn",
                "postgres://localhost/folio",
                "--access-token-secret",
                "access",
                "--refresh-token-secret",
                "refresh",
                "--admin-api-token",
                "tooling-secret",
            ]);
            let action = handler(&matches).expect("dispatch");
            let Action::Server(args) = action;
            assert_eq!(args.port, 8080);
            assert_eq!(args.dsn, "postgres://localhost/folio");
            assert!(args.admin_api_token.is_some());
            assert_eq!(args.refresh_ttl_seconds, 604_800);
        });
    }
}
