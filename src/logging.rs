// src/logging.rs
// =============================================================================
// Log setup.
//
// Everything is logged through `tracing` to stderr, so stdout stays clean for
// the report (and for --json output).
//
// Level selection:
// - RUST_LOG, when set, wins (e.g. RUST_LOG=site_mirror=debug,reqwest=warn)
// - otherwise: default info, -v debug, -vv trace
// =============================================================================

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

// Installs the global subscriber. Call once, before anything logs.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))
        .map_err(|e| anyhow!("invalid log filter: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
