//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.

use tracing_subscriber::{filter::LevelFilter, EnvFilter};
use validator::Validate;

use crate::config::LoggingConfig;
use crate::errors::{Error, Result};

/// Create a tracing span for rendering one listener's filter chain.
///
/// ```rust,ignore
/// let span = render_span!("outbound_weighted", proxy.id, port = 9080);
/// ```
#[macro_export]
macro_rules! render_span {
    ($operation:expr, $node_id:expr) => {
        tracing::debug_span!(
            "render_filter_chain",
            operation = %$operation,
            node_id = %$node_id
        )
    };
    ($operation:expr, $node_id:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "render_filter_chain",
            operation = %$operation,
            node_id = %$node_id,
            $($field)*
        )
    };
}

/// Install the global fmt subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Installing twice is
/// not an error; the first subscriber stays in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse(&config.level)
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))?;
    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => env_filter,
    };

    let installed = if config.json {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
        tracing::debug!("tracing subscriber already installed");
    }

    Ok(())
}
