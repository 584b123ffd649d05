//! Logging setup for the Sift CLI.
//!
//! Libraries in this workspace only emit tracing events; the CLI installs
//! the subscriber. Verbosity is decided in this order: `--verbose` (debug),
//! `--quiet` (errors only), the `RUST_LOG` environment variable, and
//! finally the info default.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(!no_color)
                .without_time(),
        )
        .init();
}
