//! States of a single-book detail view.

use bookify_types::Book;
use std::sync::Arc;

/// What a detail view shows.
///
/// `NotFound` is terminal: retrying an absent id is futile, so views must not
/// offer retry for it the way they do for `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Request in flight.
    Loading,
    /// The book.
    Ready(Arc<Book>),
    /// No book with this id (never existed or was deleted).
    NotFound,
    /// Transient failure; the message is for display.
    Error(String),
}

impl DetailState {
    /// The book, when loaded.
    pub fn book(&self) -> Option<&Arc<Book>> {
        match self {
            DetailState::Ready(book) => Some(book),
            _ => None,
        }
    }

    /// Whether a manual retry makes sense.
    pub fn can_retry(&self) -> bool {
        matches!(self, DetailState::Error(_))
    }

    /// Whether no further fetch can change this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DetailState::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_error_offers_retry() {
        assert!(DetailState::Error("timeout".into()).can_retry());
        assert!(!DetailState::NotFound.can_retry());
        assert!(!DetailState::Loading.can_retry());
    }

    #[test]
    fn not_found_is_terminal() {
        assert!(DetailState::NotFound.is_terminal());
        assert!(!DetailState::Error("x".into()).is_terminal());
        assert!(DetailState::NotFound.book().is_none());
    }
}
