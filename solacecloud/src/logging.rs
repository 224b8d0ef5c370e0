//! Logging setup for the provider process
//!
//! Logs go to stderr so they never mix with plugin protocol output on
//! stdout. `RUST_LOG` controls filtering, for example
//! `RUST_LOG=solacecloud=debug`; the default level is `info`. The provider
//! installs it on first configure unless the host already has a subscriber.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the global subscriber unless one is already set. Returns
/// whether this call installed it.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(filter(DEFAULT_LEVEL))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}
