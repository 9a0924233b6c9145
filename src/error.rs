//! Error types for the reactive store.

use thiserror::Error;

/// Main error type for store operations.
///
/// Every variant carries the name of the operation that was attempted and a
/// human-readable message. Apart from [`StoreError::UnknownAction`], these are
/// only raised when validation is enabled (see [`crate::Validation`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Initial data is not an addressable composite, or a group branch is
    /// not a plain object.
    #[error("{operation}: invalid store shape: {message}")]
    InvalidStoreShape {
        operation: &'static str,
        message: String,
    },

    /// Empty or malformed path where a concrete target is required.
    #[error("{operation}: invalid path: {message}")]
    InvalidPath {
        operation: &'static str,
        message: String,
    },

    /// The path does not resolve to any existing location.
    #[error("{operation}: invalid listen target: {message}")]
    InvalidListenTarget {
        operation: &'static str,
        message: String,
    },

    /// A callback slot resolved to something that cannot be invoked.
    #[error("{operation}: invalid callback: {message}")]
    InvalidCallback {
        operation: &'static str,
        message: String,
    },

    /// An interceptor tried to rewrite the key of a site that has none.
    #[error("{operation}: invalid override: {message}")]
    InvalidOverrideUse {
        operation: &'static str,
        message: String,
    },

    /// No action with this name is bound at this level.
    #[error("{operation}: unknown action: {name}")]
    UnknownAction {
        operation: &'static str,
        name: String,
    },
}

impl StoreError {
    /// Name of the operation that raised the error.
    pub fn operation(&self) -> &'static str {
        match self {
            StoreError::InvalidStoreShape { operation, .. }
            | StoreError::InvalidPath { operation, .. }
            | StoreError::InvalidListenTarget { operation, .. }
            | StoreError::InvalidCallback { operation, .. }
            | StoreError::InvalidOverrideUse { operation, .. }
            | StoreError::UnknownAction { operation, .. } => operation,
        }
    }

    pub(crate) fn shape(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvalidStoreShape {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn path(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvalidPath {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn listen_target(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvalidListenTarget {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn callback(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvalidCallback {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn override_use(operation: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvalidOverrideUse {
            operation,
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
