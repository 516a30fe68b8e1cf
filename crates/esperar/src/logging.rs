//! Tracing setup for test suites.
//!
//! Wait loops, actions, and listeners all emit `tracing` events. Call
//! [`init`] once at suite startup to see them; the `ESPERAR_LOG`
//! environment variable overrides the default filter (standard
//! `tracing_subscriber` filter syntax, e.g. `esperar=trace`).

use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the log filter
pub const LOG_ENV_VAR: &str = "ESPERAR_LOG";

/// Default filter when the environment variable is unset
pub const DEFAULT_FILTER: &str = "esperar=info";

/// Initialize tracing output for a suite run.
///
/// Safe to call more than once; later calls are no-ops. Returns whether
/// this call installed the subscriber.
pub fn init() -> bool {
    init_with_filter(DEFAULT_FILTER)
}

/// Initialize tracing with an explicit default filter.
///
/// `ESPERAR_LOG` still takes precedence when set.
pub fn init_with_filter(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Initialize tracing with JSON output, for runs whose logs feed a
/// collector rather than a terminal.
pub fn init_json() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
