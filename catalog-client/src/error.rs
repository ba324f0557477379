//! Fetch and mutation failure types.

use bookify_core::FieldErrors;
use thiserror::Error;

use crate::transport::TransportError;

/// Why a query could not be resolved.
///
/// Cloned to every caller that joined the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The entity does not exist. Terminal.
    #[error("not found")]
    NotFound,

    /// Non-2xx response other than 404.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status.
        status: u16,
        /// Message from the body, or a generic one.
        message: String,
    },

    /// No response was obtained.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether a manual retry can help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::NotFound)
    }
}

impl From<TransportError> for FetchError {
    fn from(e: TransportError) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// Structured outcome of a failed mutation.
///
/// Never escapes as a panic; every call site matches on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationFailure {
    /// Fields were rejected, client-side or by the server.
    #[error("{}", .0.summary())]
    Validation(FieldErrors),

    /// The book cannot be borrowed right now.
    #[error("{reason}")]
    NotEligible {
        /// Message to show the user.
        reason: String,
    },

    /// Any other failure.
    #[error("{message}")]
    Server {
        /// Message to show the user.
        message: String,
    },
}

impl MutationFailure {
    /// Field messages, when this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            MutationFailure::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result of a mutation.
pub type MutationResult<T> = Result<T, MutationFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_is_terminal() {
        assert!(!FetchError::NotFound.is_retryable());
        assert!(FetchError::Transport("x".into()).is_retryable());
        assert!(FetchError::Decode("x".into()).is_retryable());
        assert!(FetchError::Server {
            status: 500,
            message: "x".into()
        }
        .is_retryable());
    }

    #[test]
    fn transport_error_converts() {
        let err: FetchError = TransportError::Timeout.into();
        assert_eq!(err, FetchError::Transport("request timed out".into()));
    }

    #[test]
    fn failure_display() {
        let mut fields = FieldErrors::new();
        fields.insert("title", "Title is required");
        let failure = MutationFailure::Validation(fields);
        assert_eq!(failure.to_string(), "Validation failed:\nTitle is required");
        assert!(failure.field_errors().is_some());

        let server = MutationFailure::Server {
            message: "Failed to add book".into(),
        };
        assert_eq!(server.to_string(), "Failed to add book");
        assert!(server.field_errors().is_none());
    }
}
