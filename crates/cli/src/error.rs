//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum CliError {
    /// Blueprint file not found
    #[error("Blueprint file not found: {path}")]
    ConfigNotFound { path: String },

    /// Blueprint parsing error
    #[error("Failed to parse blueprint: {message}")]
    ConfigParse { message: String },

    /// Blueprint validation error
    #[error("Blueprint validation failed: {message}")]
    ConfigValidation { message: String },

    /// Transport bind error
    #[error("Failed to bind transport '{transport}': {message}")]
    TransportBind { transport: String, message: String },

    /// Transport fault during the run
    #[error("Transport fault: {message}")]
    TransportFault { message: String },

    /// Pipeline execution error
    #[error("Pipeline execution failed: {message}")]
    PipelineExecution { message: String },

    /// Graceful shutdown error
    #[error("Error during shutdown: {message}")]
    Shutdown { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

#[allow(dead_code)]
impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn transport_bind(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportBind {
            transport: transport.into(),
            message: message.into(),
        }
    }

    pub fn transport_fault(message: impl Into<String>) -> Self {
        Self::TransportFault {
            message: message.into(),
        }
    }

    pub fn pipeline_execution(message: impl Into<String>) -> Self {
        Self::PipelineExecution {
            message: message.into(),
        }
    }

    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, CliError>;
