//! Shared primitives for all Rust crates in Warden.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Warden crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed event or violated invariant, raised before any side effect.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// More than one vault entity claims the same team.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// An external API or the vault CLI failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Credentials were rejected by an external service.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An external service kept throttling past the allowed budget.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// A multi-item operation failed for some of its items.
    #[error("{operation} failed for {} item(s): {}", .failures.len(), .failures.join("; "))]
    Batch {
        /// Operation label.
        operation: String,
        /// One message per failed item.
        failures: Vec<String>,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Collapses collected per-item failures into one error, if any failed.
    pub fn from_failures(operation: impl Into<String>, failures: Vec<AppError>) -> AppResult<()> {
        if failures.is_empty() {
            return Ok(());
        }

        Err(Self::Batch {
            operation: operation.into(),
            failures: failures.iter().map(ToString::to_string).collect(),
        })
    }
}
