//! Tracing subscriber setup.
//!
//! Events go to stderr so stdout carries only command output.  `RUST_LOG`
//! wins over the configured level when set.

use sr_engine::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.  Call once, before any work.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr);

            registry.with(json_layer).init();
        }
    }
}
