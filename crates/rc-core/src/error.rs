//! # AppError
//!
//! Centralized error handling for the recipe browser.
//! Every gateway or storage failure maps onto one of these variants and is
//! handed back to the caller unchanged; nothing here retries.

use thiserror::Error;

/// The primary error type for all rc-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// Read failure against a remote collection (network, permission,
    /// malformed query, zero or several rows where exactly one was required).
    #[error("query on '{collection}' failed: {message}")]
    RemoteQuery {
        collection: String,
        message: String,
        not_found: bool,
    },

    /// Create/update/delete failure against a remote collection.
    #[error("write to '{collection}' failed: {message}")]
    RemoteWrite {
        collection: String,
        message: String,
        not_found: bool,
    },

    /// The local favorites key could not be read, decoded or written.
    #[error("local storage error: {0}")]
    LocalStorage(String),

    /// A draft or patch was rejected before it reached the remote store.
    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn query(collection: &str, message: impl Into<String>) -> Self {
        AppError::RemoteQuery {
            collection: collection.to_string(),
            message: message.into(),
            not_found: false,
        }
    }

    pub fn query_not_found(collection: &str, id: &str) -> Self {
        AppError::RemoteQuery {
            collection: collection.to_string(),
            message: format!("no row with id {id}"),
            not_found: true,
        }
    }

    pub fn write(collection: &str, message: impl Into<String>) -> Self {
        AppError::RemoteWrite {
            collection: collection.to_string(),
            message: message.into(),
            not_found: false,
        }
    }

    pub fn write_not_found(collection: &str, id: &str) -> Self {
        AppError::RemoteWrite {
            collection: collection.to_string(),
            message: format!("no row with id {id}"),
            not_found: true,
        }
    }

    /// True when the failure was caused by a missing row rather than by the
    /// transport or a constraint.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::RemoteQuery { not_found: true, .. }
                | AppError::RemoteWrite { not_found: true, .. }
        )
    }
}

/// A specialized Result type for recipe browser logic.
pub type Result<T> = std::result::Result<T, AppError>;
