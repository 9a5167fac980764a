//! Tracing setup shared by every binary built on this crate.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing at the default `info` level
///
/// `RUST_LOG` overrides the default, so `RUST_LOG=workout_core=debug`
/// turns on store and timer diagnostics without a rebuild.
pub fn init() {
    init_with_level("info")
}

/// Initialize tracing with a caller-chosen default level
///
/// The level only applies when `RUST_LOG` is unset; the environment
/// always wins. Output uses the compact single-line format.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
