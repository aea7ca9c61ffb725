//! Overlay error types

use thiserror::Error;

/// Overlay-specific errors
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Backend creation error
    #[error("failed to create overlay '{name}': {message}")]
    BackendCreation { name: String, message: String },

    /// Backend error (from contract)
    #[error("overlay error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverlayError {
    /// Create a backend creation error
    pub fn backend_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
