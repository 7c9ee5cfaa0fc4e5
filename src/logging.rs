//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`), e.g.
/// `RUST_LOG=u_picking=debug` to see per-strategy statistics.
///
/// ```no_run
/// u_picking::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Debug-level subscriber writing through the test harness. Safe to call
/// from several tests.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
