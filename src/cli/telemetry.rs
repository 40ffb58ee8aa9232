//! Tracing subscriber setup.
//!
//! Verbosity comes from repeated `-v` flags; `RUST_LOG` wins when set so
//! per-module filters keep working in production. `FOLIO_LOG_JSON` switches
//! the output to JSON lines for log shippers.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(verbosity_level: Option<tracing::Level>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = verbosity_level.map_or("error", |level| match level {
            tracing::Level::WARN => "warn",
            tracing::Level::INFO => "info",
            tracing::Level::DEBUG => "debug",
            tracing::Level::TRACE => "trace",
            tracing::Level::ERROR => "error",
        });
        EnvFilter::new(level)
    });

    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("FOLIO_LOG_JSON").is_ok() {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    Ok(())
}
