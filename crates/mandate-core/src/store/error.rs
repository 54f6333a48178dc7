//! Error types for blob storage operations.

use thiserror::Error;

use crate::error::MandateError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during blob storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object under this content id.
    #[error("blob not found: {content_id}")]
    NotFound { content_id: String },

    /// Stored bytes no longer hash to their content id.
    #[error("blob {content_id} is corrupt: stored bytes hash to {actual}")]
    Corrupt { content_id: String, actual: String },

    /// Content id is not `sha256:<64 hex>`.
    #[error("invalid content id '{content_id}'")]
    InvalidContentId { content_id: String },

    /// Invalid store specification (URL parsing failed).
    #[error("invalid store spec '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },

    /// Network or I/O error.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Generic error from the underlying object store.
    #[error("object store error: {0}")]
    ObjectStore(object_store::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Create from object_store error with context about the blob.
    pub fn from_object_store(err: object_store::Error, content_id: &str) -> Self {
        match &err {
            object_store::Error::NotFound { .. } => StoreError::NotFound {
                content_id: content_id.to_string(),
            },
            _ => StoreError::ObjectStore(err),
        }
    }
}

impl From<object_store::Error> for StoreError {
    fn from(err: object_store::Error) -> Self {
        StoreError::from_object_store(err, "unknown")
    }
}

impl From<StoreError> for MandateError {
    fn from(err: StoreError) -> Self {
        MandateError::Store {
            reason: err.to_string(),
        }
    }
}
