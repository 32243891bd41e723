//! Logging initialization
//!
//! Logs go to stderr so that stdout carries only feed lines or balances.
//! The filter defaults to `warn` and can be changed through `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Initialize logging for the process
///
/// Calling it more than once is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
