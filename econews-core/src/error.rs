//! Error types for the portal

use thiserror::Error;

/// Portal-wide error type
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        PortalError::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        PortalError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        PortalError::Internal(msg.into())
    }
}

/// Result type alias for portal operations
pub type PortalResult<T> = Result<T, PortalError>;
