//! Tracing subscriber installation for binaries, benches and tests.
//!
//! Filter directives are resolved from `STRASSEN_LOG`, then `RUST_LOG`, then
//! the supplied default.

use tracing_subscriber::EnvFilter;

/// Environment variable holding crate-specific filter directives.
pub const LOG_ENV: &str = "STRASSEN_LOG";

/// Directive used when neither environment variable is set.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Installs a global fmt subscriber with the default directive.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    init_with_default(DEFAULT_DIRECTIVE)
}

/// Installs a global fmt subscriber, falling back to `default_directive`.
pub fn init_with_default(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

