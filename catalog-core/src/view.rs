//! Uniform `{ data, is_loading, is_error }` result handed to renderers.

use std::sync::Arc;

/// What a list or detail renderer needs, and nothing about caching.
///
/// `data` keeps the last good value while a refetch is loading or after it
/// failed, so renderers can choose to keep showing it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView<T> {
    /// Last successfully loaded value.
    pub data: Option<Arc<T>>,
    /// A request for the current parameters is in flight.
    pub is_loading: bool,
    /// The last request for the current parameters failed.
    pub is_error: bool,
    /// Display message for the failure.
    pub error: Option<String>,
}

impl<T> QueryView<T> {
    /// Nothing requested yet.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_error: false,
            error: None,
        }
    }

    /// Loading, keeping `previous` data.
    pub fn loading(previous: Option<Arc<T>>) -> Self {
        Self {
            data: previous,
            is_loading: true,
            is_error: false,
            error: None,
        }
    }

    /// Loaded.
    pub fn ready(data: Arc<T>) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            is_error: false,
            error: None,
        }
    }

    /// Failed, keeping `previous` data.
    pub fn failed(message: impl Into<String>, previous: Option<Arc<T>>) -> Self {
        Self {
            data: previous,
            is_loading: false,
            is_error: true,
            error: Some(message.into()),
        }
    }
}

impl<T> Default for QueryView<T> {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_keep_previous_data() {
        let data = Arc::new(vec![1, 2, 3]);
        let ready = QueryView::ready(data.clone());
        assert!(!ready.is_loading && !ready.is_error);

        let loading = QueryView::loading(ready.data.clone());
        assert!(loading.is_loading);
        assert_eq!(loading.data, Some(data.clone()));

        let failed = QueryView::failed("server error", loading.data.clone());
        assert!(failed.is_error);
        assert_eq!(failed.error.as_deref(), Some("server error"));
        assert_eq!(failed.data, Some(data));
    }

    #[test]
    fn idle_is_empty() {
        let view: QueryView<u8> = QueryView::default();
        assert!(view.data.is_none() && !view.is_loading && !view.is_error);
    }
}
