//! Tracing initialisation for the `ccg` binary.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Installs the global subscriber.
///
/// Reads `CCG_LOG` for per-module levels, e.g. `CCG_LOG=ccg_network_core::analysis=debug`.
/// Falls back to `ccg_network_core=info`, or `warn` when `quiet` is set.
/// Safe to call more than once.
pub fn init_tracing(quiet: bool) {
    INIT.call_once(|| {
        let fallback = if quiet { "ccg_network_core=warn" } else { "ccg_network_core=info" };
        let filter = EnvFilter::try_from_env("CCG_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}
