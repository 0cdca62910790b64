//! Tracing setup for the command-line binary
//!
//! Log lines go to stderr so that exported data written to stdout stays
//! clean. `SITELEDGER_LOG` takes an `EnvFilter` directive and wins over
//! `--verbose`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "SITELEDGER_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "siteledger=debug"
    } else {
        "siteledger=warn"
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
