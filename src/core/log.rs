//! Logging setup for the CLI entry point.
//!
//! Quiet by default so table output stays clean; `--verbose` enables
//! debug-level logs for this crate only. RUST_LOG overrides both.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub fn init_logging(verbose: bool) {
    let (crate_level, default_directive) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    };
    let crate_filter = Targets::new().with_target("realfolio", crate_level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(crate_filter)
        .with(env_filter)
        .init();
}
