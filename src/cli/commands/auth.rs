use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_login_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("access-token-secret")
                .long("access-token-secret")
                .help("HMAC secret for signing access tokens")
                .env("FOLIO_ACCESS_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("refresh-token-secret")
                .long("refresh-token-secret")
                .help("HMAC secret for signing refresh tokens (distinct from the access secret)")
                .env("FOLIO_REFRESH_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("access-ttl-seconds")
                .long("access-ttl-seconds")
                .help("Access token TTL in seconds")
                .env("FOLIO_ACCESS_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("refresh-ttl-seconds")
                .long("refresh-ttl-seconds")
                .help("Refresh token and cookie TTL in seconds")
                .env("FOLIO_REFRESH_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("admin-api-token")
                .long("admin-api-token")
                .help("Optional shared secret accepted in x-admin-token for non-interactive tooling")
                .env("FOLIO_ADMIN_API_TOKEN"),
        )
}

fn with_login_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("login-max-attempts")
                .long("login-max-attempts")
                .help("Login attempts allowed per caller within the window")
                .env("FOLIO_LOGIN_MAX_ATTEMPTS")
                .default_value("8")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("login-window-seconds")
                .long("login-window-seconds")
                .help("Login rate limit window in seconds")
                .env("FOLIO_LOGIN_WINDOW_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
}
