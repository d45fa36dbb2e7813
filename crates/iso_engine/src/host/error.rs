//! Host-level errors

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by [`super::RenderHost`]
///
/// Cloneable so a shared initialization future can hand the same error to
/// every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host was destroyed while this initialization attempt was pending;
    /// calling `init` again starts a fresh attempt
    #[error("Initialization aborted by destroy")]
    Aborted,

    /// The surface factory failed
    #[error("Surface creation failed: {0}")]
    SurfaceCreation(String),

    /// The host was destroyed and has not been initialized again
    #[error("Render host destroyed")]
    Destroyed,

    /// The operation needs a ready host
    #[error("Render host not initialized")]
    NotInitialized,

    /// Called from a callback running inside another host operation
    #[error("Re-entrant call into the render host")]
    Reentrant,

    /// The configuration was rejected
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HostError {
    /// Whether calling `init` again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, HostError::Aborted | HostError::SurfaceCreation(_))
    }
}

impl From<ConfigError> for HostError {
    fn from(error: ConfigError) -> Self {
        HostError::Config(error.to_string())
    }
}
