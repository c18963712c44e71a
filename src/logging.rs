//! stderr logging setup
//!
//! stdout is reserved for command output (text or JSON-RPC), so every
//! diagnostic goes to stderr

use std::io::IsTerminal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV_VAR: &str = "PERMCALC_LOG";

/// default filter directive for the requested verbosity
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "permcalc=debug"
    } else if quiet {
        "permcalc=warn"
    } else {
        "permcalc=info"
    }
}

/// install the global subscriber; `PERMCALC_LOG` takes precedence over flags
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .try_init();
}
