//! Tracing initialization
//!
//! `RUST_LOG` takes precedence when set:
//! - `RUST_LOG=ft8rx=debug` for all debug output
//! - `RUST_LOG=ft8rx::sync=trace` for per-bin sync scores

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for the CLI. `verbose` raises the default filter from
/// info to debug.
pub fn init(verbose: bool) {
    let default = if verbose { "ft8rx=debug" } else { "ft8rx=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
