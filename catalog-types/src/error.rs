//! Error types and the service's error payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while building catalog values from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Blank book identifier.
    #[error("book id must not be empty")]
    InvalidBookId,

    /// Genre outside the known set.
    #[error("unknown genre: {0}")]
    UnknownGenre(String),

    /// Sort field outside the known set.
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    /// Sort direction outside the known set.
    #[error("unknown sort order: {0}")]
    UnknownSortOrder(String),
}

/// Error body returned by the catalog service on non-2xx responses.
///
/// Only `message` is typed. `error` is kept as raw JSON because its shape
/// varies; the validation mapper inspects it without trusting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Structured error detail, if any.
    #[serde(default)]
    pub error: Option<Value>,
}

impl ServerErrorBody {
    /// Parse a response body leniently. Non-object bodies yield an empty value.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TypesError::UnknownGenre("poetry".into());
        assert_eq!(err.to_string(), "unknown genre: poetry");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypesError>();
    }

    #[test]
    fn server_error_body_is_lenient() {
        let body = ServerErrorBody::from_value(&serde_json::json!("plain text"));
        assert!(body.message.is_none());

        let body = ServerErrorBody::from_value(&serde_json::json!({"message": 42}));
        assert!(body.message.is_none());

        let body =
            ServerErrorBody::from_value(&serde_json::json!({"message": "Book not found"}));
        assert_eq!(body.message.as_deref(), Some("Book not found"));
    }
}
