//! Unified error handling for the storefront core.
//!
//! Service methods return `Result<T, AppError>`. At the boundary the UI
//! consumes, a result is translated into [`Outcome`], the uniform
//! `{success, message, data}` shape callers branch on instead of matching
//! error variants. Transport detail stays in the logs, not the message.

use serde::Serialize;
use thiserror::Error;

use crate::docstore::StoreError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the storefront core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced entity does not exist in the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed or missing required input.
    #[error("validation failure: {0}")]
    Validation(String),

    /// Document store operation failed.
    #[error("document store error: {0}")]
    Remote(#[from] StoreError),

    /// Authentication service operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Local persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// User-facing message for this error.
    ///
    /// Remote and storage failures are reported generically; their detail
    /// goes to the log when the [`Outcome`] is built.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(what) => format!("{what} not found"),
            Self::Validation(msg) => msg.clone(),
            Self::Auth(err) => err.user_message(),
            Self::Remote(_) => "The store is unreachable, please try again".to_owned(),
            Self::Storage(_) => "Could not save to device storage".to_owned(),
        }
    }

    /// Whether this error means a referenced entity was absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Uniform result shape consumed by the UI.
///
/// Carries a success flag, a user-facing message, and the payload when the
/// operation succeeded. Callers branch on `success` rather than on error
/// variants.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// User-facing message describing the result.
    pub message: String,
    /// Payload, present on success.
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    /// Build a successful outcome.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Build a failed outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Translate a service result, logging the underlying error.
    pub fn from_result(result: Result<T>, success_message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::ok(success_message, data),
            Err(err) => {
                tracing::error!(error = %err, "operation failed");
                Self::failure(err.user_message())
            }
        }
    }
}
