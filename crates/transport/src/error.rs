//! Transport error types

use contracts::ContractError;
use thiserror::Error;

/// Transport specific error
#[derive(Debug, Error)]
pub enum TransportError {
    /// Serial/device open error
    #[error("failed to open device '{device}': {message}")]
    OpenFailed { device: String, message: String },

    /// Replay file load error
    #[error("failed to load replay file '{path}': {message}")]
    ReplayLoadFailed { path: String, message: String },

    /// Requested mode is not compiled in
    #[error("transport mode '{mode}' is not available in this build: {message}")]
    ModeUnavailable { mode: String, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl TransportError {
    /// Create device open error
    pub fn open(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OpenFailed {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create replay load error
    pub fn replay_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReplayLoadFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create mode-unavailable error
    pub fn mode_unavailable(mode: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModeUnavailable {
            mode: mode.into(),
            message: message.into(),
        }
    }
}

impl From<TransportError> for ContractError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Contract(inner) => inner,
            TransportError::OpenFailed { device, message } => {
                ContractError::transport_bind(device, message)
            }
            TransportError::ReplayLoadFailed { path, message } => {
                ContractError::transport_bind(path, message)
            }
            TransportError::ModeUnavailable { mode, message } => {
                ContractError::transport_bind(mode, message)
            }
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, TransportError>;
