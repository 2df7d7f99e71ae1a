//! Shared primitives for all Rust crates in Keel.

#![forbid(unsafe_code)]

/// Human-readable message resolution for failed operations.
pub mod message;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use message::{GENERIC_FAILURE_MESSAGE, resolve_error_message};

/// Result type used across Keel crates.
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

/// Backend identifier of a managed record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates an identifier from its wire value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for RecordId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid record id '{value}': {error}")))
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The backend could not be reached or the connection broke.
    #[error("network error: {0}")]
    Network(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the carried message when it is not blank.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        let message = match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Network(message)
            | Self::Internal(message) => message.trim(),
        };

        (!message.is_empty()).then_some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString, RecordId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn record_id_is_transparent_on_the_wire() {
        let encoded = serde_json::to_string(&RecordId::new(42)).unwrap_or_default();
        assert_eq!(encoded, "42");
    }

    #[test]
    fn record_id_parses_trimmed_input() {
        let parsed = " 17 ".parse::<RecordId>();
        assert!(matches!(parsed, Ok(id) if id == RecordId::new(17)));
        assert!(matches!(
            "x".parse::<RecordId>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn detail_skips_blank_messages() {
        assert_eq!(AppError::NotFound("  ".to_owned()).detail(), None);
        assert_eq!(
            AppError::Forbidden("no access".to_owned()).detail(),
            Some("no access")
        );
    }
}
