//! # Logging Setup
//!
//! `CN_LOG` takes precedence over `RUST_LOG`; both fall back to `info`.

use tracing_subscriber::EnvFilter;

/// Variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "CN_LOG";

/// Default directive when no variable is set or parseable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Build the level filter from the environment.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true);

    let installed = if json {
        builder
            .json()
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
