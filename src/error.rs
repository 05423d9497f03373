//! Error types for the taxonomy repository.

use thiserror::Error;

/// Errors raised by the loader, store, cache and mutation pipeline
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// Symbol, formula id or version absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cached snapshot present but past its expiry
    #[error("Snapshot expired for version: {0}")]
    Expired(String),

    /// Malformed or ambiguous descriptor
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Duplicate name or tooling symbol within a collection
    #[error("Collision: {0}")]
    Collision(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Mandatory artifact root or manifest missing
    #[error("Folder missing: {0}")]
    FolderMissing(String),

    #[error("Template cycle detected: {0}")]
    TemplateCycle(String),

    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for TaxonomyError {
    fn from(err: serde_json::Error) -> Self {
        TaxonomyError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for TaxonomyError {
    fn from(err: config::ConfigError) -> Self {
        TaxonomyError::ConfigError(err.to_string())
    }
}

impl TaxonomyError {
    /// True for the not-found family (absent or expired)
    pub fn is_not_found(&self) -> bool {
        matches!(self, TaxonomyError::NotFound(_) | TaxonomyError::Expired(_))
    }
}
