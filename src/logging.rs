//! Diagnostics on standard error
//!
//! Standard output carries the JSON outcome of a run only, so every log event
//! goes to standard error. Verbosity follows `RUST_LOG` and defaults to
//! errors only, so a successful run leaves standard error empty.
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Directive used when `RUST_LOG` is unset or invalid
pub const DEFAULT_DIRECTIVE: &str = "error";

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber, later calls are no-ops
pub fn init() {
    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(std::io::stderr);
    let subscriber = Registry::default().with(build_env_filter()).with(layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
