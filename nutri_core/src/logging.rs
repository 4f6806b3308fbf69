//! Tracing setup for the nutri binary and unit tests.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber at `warn`
///
/// Reports are printed to stdout, so diagnostics go to stderr and stay quiet
/// unless RUST_LOG asks for more.
pub fn init() {
    init_with_level("warn")
}

/// Install the subscriber with a fallback level for when RUST_LOG is unset
pub fn init_with_level(default_level: &str) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_level),
    };

    let stderr_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

/// Debug-level logging routed through the test harness capture
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
