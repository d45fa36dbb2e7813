//! Logging utilities

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Panics if a global logger is already installed, like `env_logger::init`.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, tolerating an already installed logger
///
/// Hosting shells may run their setup path more than once; only the first
/// call installs the logger. Returns `true` if this call installed it.
pub fn try_init() -> bool {
    env_logger::try_init().is_ok()
}
