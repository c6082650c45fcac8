//! Logging setup for `ensoc`.
//!
//! Log output goes to stderr so that `--format json` output on stdout stays
//! machine readable.
//!
//! The level is picked in this order:
//! 1. `--verbose`: debug for the compiler and the CLI
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("enso_compiler=debug,enso_cli=debug")
    } else if quiet {
        EnvFilter::new("enso_compiler=error,enso_cli=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("enso_compiler=info,enso_cli=info"))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
