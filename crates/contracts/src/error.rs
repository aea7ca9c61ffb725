//! Layered error definitions
//!
//! Categorized by source: config / transport / ingestion / overlay
//!
//! Per-event conditions (malformed sentence, invalid fix, degenerate
//! fusion, no-intersection geometry) are absorbed where they occur and are
//! deliberately NOT represented here; only resource acquisition and
//! connection-loss failures cross component boundaries.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Transport bind error (device/file could not be opened)
    #[error("transport '{name}' bind error: {message}")]
    TransportBind { name: String, message: String },

    /// Transport feed died after a successful start
    #[error("transport '{name}' fault: {message}")]
    TransportFault { name: String, message: String },

    // ===== Ingestion Errors =====
    /// Internal channel closed while the pipeline was still running
    #[error("channel closed: {context}")]
    ChannelClosed { context: String },

    // ===== Overlay Errors =====
    /// Overlay write error
    #[error("overlay '{overlay_name}' write error: {message}")]
    OverlayWrite {
        overlay_name: String,
        message: String,
    },

    /// Overlay backend error (open/close)
    #[error("overlay '{overlay_name}' backend error: {message}")]
    OverlayBackend {
        overlay_name: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport bind error
    pub fn transport_bind(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportBind {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create transport fault error
    pub fn transport_fault(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportFault {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create channel closed error
    pub fn channel_closed(context: impl Into<String>) -> Self {
        Self::ChannelClosed {
            context: context.into(),
        }
    }

    /// Create overlay write error
    pub fn overlay_write(overlay_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OverlayWrite {
            overlay_name: overlay_name.into(),
            message: message.into(),
        }
    }

    /// Create overlay backend error
    pub fn overlay_backend(overlay_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OverlayBackend {
            overlay_name: overlay_name.into(),
            message: message.into(),
        }
    }
}
