//! Error types for catalogue and scheduler reads.

use thiserror::Error;

/// Catalogue operation result type.
pub type Result<T> = std::result::Result<T, CatalogueError>;

#[derive(Error, Debug)]
pub enum CatalogueError {
    /// IO error (state file access)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// State file could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A cursor failed while advancing
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// Stored data is inconsistent
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl CatalogueError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn cursor(msg: impl Into<String>) -> Self {
        Self::Cursor(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}
