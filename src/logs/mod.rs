//! Diagnostic logging to stderr.
//!
//! Nothing is written to disk: queries are never persisted.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "WALLETRISK_LOG";

/// Default directive when `WALLETRISK_LOG` is unset.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "walletrisk=debug,warn"
    } else {
        "warn"
    }
}

pub fn init(verbose: bool, quiet: bool, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
