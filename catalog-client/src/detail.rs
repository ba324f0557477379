//! Entity Detail Fetcher: one book by id.

use std::sync::Arc;

use bookify_core::{DetailState, QueryKey};
use bookify_types::BookId;
use tokio::sync::Mutex;

use crate::api;
use crate::cache::{CacheLookup, QueryCache};
use crate::error::FetchError;
use crate::transport::Transport;

/// Fetches and tracks the book a detail view is showing.
pub struct DetailFetcher<T: Transport> {
    transport: Arc<T>,
    cache: Arc<QueryCache>,
    current: Mutex<Option<(BookId, DetailState)>>,
}

impl<T: Transport> DetailFetcher<T> {
    /// Create a fetcher showing nothing.
    pub fn new(transport: Arc<T>, cache: Arc<QueryCache>) -> Self {
        Self {
            transport,
            cache,
            current: Mutex::new(None),
        }
    }

    /// Show `id`, fetching it unless cached.
    ///
    /// Switching to another id starts from `Loading`; a response for the
    /// previous id arriving afterwards is dropped.
    pub async fn show(&self, id: &BookId) -> DetailState {
        {
            let mut current = self.current.lock().await;
            if current.as_ref().map(|(shown, _)| shown) != Some(id) {
                *current = Some((id.clone(), DetailState::Loading));
            }
        }
        self.load().await
    }

    /// The id being shown.
    pub async fn id(&self) -> Option<BookId> {
        self.current.lock().await.as_ref().map(|(id, _)| id.clone())
    }

    /// Current state, picking up a deletion recorded in the cache.
    pub async fn state(&self) -> DetailState {
        let mut current = self.current.lock().await;
        let Some((id, state)) = current.as_mut() else {
            return DetailState::Loading;
        };
        if self.cache.lookup(&QueryKey::Book(id.clone())).await
            == CacheLookup::Failed(FetchError::NotFound)
        {
            *state = DetailState::NotFound;
        }
        state.clone()
    }

    /// Re-resolve the shown id. Cache hit unless it was invalidated.
    pub async fn refresh(&self) -> DetailState {
        self.load().await
    }

    /// Fetch again after a transient error.
    ///
    /// Does nothing for `NotFound` or any non-error state.
    pub async fn retry(&self) -> DetailState {
        let id = {
            let current = self.current.lock().await;
            match current.as_ref() {
                Some((id, state)) if state.can_retry() => id.clone(),
                Some((_, state)) => return state.clone(),
                None => return DetailState::Loading,
            }
        };
        self.cache.clear_failure(&QueryKey::Book(id)).await;
        self.load().await
    }

    async fn load(&self) -> DetailState {
        let Some(id) = self.id().await else {
            return DetailState::Loading;
        };
        let key = QueryKey::Book(id.clone());

        let result = self
            .cache
            .resolve(&key, || api::fetch(self.transport.as_ref(), &key))
            .await;
        let next = match result {
            Ok(resource) => match resource.into_book() {
                Some(book) => DetailState::Ready(book),
                None => DetailState::Error(format!("unexpected resource for {key}")),
            },
            Err(FetchError::NotFound) => DetailState::NotFound,
            Err(error) => {
                tracing::warn!(%key, %error, "Detail fetch failed");
                DetailState::Error(error.to_string())
            }
        };

        let mut current = self.current.lock().await;
        match current.as_mut() {
            Some((shown, state)) if *shown == id => {
                *state = next.clone();
                next
            }
            Some((shown, state)) => {
                tracing::debug!(%key, %shown, "Discarding response for previous book");
                state.clone()
            }
            None => DetailState::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::book_json;
    use crate::transport::{MockTransport, TransportError};
    use bookify_core::CacheTag;
    use serde_json::json;

    fn id(raw: &str) -> BookId {
        BookId::new(raw).unwrap()
    }

    fn fetcher(transport: &MockTransport) -> (DetailFetcher<MockTransport>, Arc<QueryCache>) {
        let cache = Arc::new(QueryCache::new());
        (
            DetailFetcher::new(Arc::new(transport.clone()), cache.clone()),
            cache,
        )
    }

    #[tokio::test]
    async fn shows_book() {
        let transport = MockTransport::new();
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 3, true) }));
        let (detail, _) = fetcher(&transport);

        assert_eq!(detail.state().await, DetailState::Loading);
        let state = detail.show(&id("a")).await;

        assert_eq!(state.book().unwrap().copies, 3);
        assert_eq!(detail.state().await, state);
        assert_eq!(detail.id().await, Some(id("a")));
    }

    #[tokio::test]
    async fn missing_book_is_terminal() {
        let transport = MockTransport::new();
        transport.respond_to("GET books/x", 404, json!({ "message": "Book not found" }));
        let (detail, _) = fetcher(&transport);

        assert_eq!(detail.show(&id("x")).await, DetailState::NotFound);
        assert!(!detail.state().await.can_retry());

        // Retry is not offered for NotFound and sends nothing.
        assert_eq!(detail.retry().await, DetailState::NotFound);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn transient_error_can_be_retried() {
        let transport = MockTransport::new();
        transport.fail_next(TransportError::Timeout);
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 1, true) }));
        let (detail, _) = fetcher(&transport);

        let failed = detail.show(&id("a")).await;
        assert!(failed.can_retry());

        let recovered = detail.retry().await;
        assert!(recovered.book().is_some());
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn id_change_refetches() {
        let transport = MockTransport::new();
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 1, true) }));
        transport.respond_to("GET books/b", 200, json!({ "data": book_json("b", 4, true) }));
        let (detail, _) = fetcher(&transport);

        detail.show(&id("a")).await;
        let state = detail.show(&id("b")).await;

        assert_eq!(state.book().unwrap().id, id("b"));
        assert_eq!(
            transport.sent_lines(),
            vec!["GET books/a".to_string(), "GET books/b".to_string()]
        );
    }

    #[tokio::test]
    async fn response_for_previous_id_is_dropped() {
        let transport = MockTransport::new();
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 1, true) }));
        transport.respond_to("GET books/b", 200, json!({ "data": book_json("b", 4, true) }));
        transport.hold("GET books/a");
        let (detail, _) = fetcher(&transport);
        let first = id("a");

        let (late, ()) = tokio::join!(detail.show(&first), async {
            tokio::task::yield_now().await;
            detail.show(&id("b")).await;
            transport.release("GET books/a");
        });

        assert_eq!(late.book().unwrap().id, id("b"));
        assert_eq!(detail.state().await.book().unwrap().id, id("b"));
    }

    #[tokio::test]
    async fn deletion_in_cache_turns_view_not_found() {
        let transport = MockTransport::new();
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 1, true) }));
        let (detail, cache) = fetcher(&transport);

        detail.show(&id("a")).await;
        cache.remove_book(&id("a")).await;

        assert_eq!(detail.state().await, DetailState::NotFound);
        assert_eq!(detail.refresh().await, DetailState::NotFound);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn invalidation_refetches_on_refresh() {
        let transport = MockTransport::new();
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 1, true) }));
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 0, false) }));
        let (detail, cache) = fetcher(&transport);

        detail.show(&id("a")).await;
        cache.invalidate(CacheTag::Book).await;
        let refreshed = detail.refresh().await;

        assert!(!refreshed.book().unwrap().is_borrowable());
        assert_eq!(transport.request_count(), 2);
    }
}
