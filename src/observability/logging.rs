//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber
//! - Pick the log level from `RUST_LOG`, falling back to `--debug`
//!
//! # Design Decisions
//! - Logs go to stderr so response bodies on stdout stay clean

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives.
pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "aws_signing=debug,tower_http=debug"
    } else {
        "aws_signing=info,tower_http=info"
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(debug: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(debug).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
