//! Logging setup
//!
//! Logs go to stderr; stdout is reserved for command output.

use tracing_subscriber::EnvFilter;

/// Default filter directive for the given verbosity
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `debug`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
