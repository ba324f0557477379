//! List Query Controller: parameters in, latest page out.
//!
//! Every parameter change recomputes the request signature and resolves it
//! through the [`QueryCache`]. A response is applied only if the controller
//! still wants the signature it was requested for; otherwise it is dropped,
//! so the last parameter change always wins.

use std::sync::Arc;

use bookify_core::{BookQuery, ListParams, QueryError, QueryView, SummaryQuery};
use bookify_types::{Book, BorrowSummary, Genre, Page, SortField, SortOrder};
use tokio::sync::Mutex;

use crate::api;
use crate::cache::{QueryCache, Resource};
use crate::error::FetchError;
use crate::transport::Transport;

/// Parameters whose responses decode to a page of `Item`.
pub trait Listing: ListParams {
    /// Row type.
    type Item: Clone + Send + Sync + 'static;

    /// Pull this listing's page out of a cached resource.
    fn extract(resource: Resource) -> Option<Arc<Page<Self::Item>>>;
}

impl Listing for BookQuery {
    type Item = Book;

    fn extract(resource: Resource) -> Option<Arc<Page<Book>>> {
        resource.into_book_page()
    }
}

impl Listing for SummaryQuery {
    type Item = BorrowSummary;

    fn extract(resource: Resource) -> Option<Arc<Page<BorrowSummary>>> {
        resource.into_summary_page()
    }
}

struct ListState<Q: Listing> {
    query: Q,
    view: QueryView<Page<Q::Item>>,
}

/// Owns one list's parameters and its latest resolved page.
pub struct ListController<T: Transport, Q: Listing> {
    transport: Arc<T>,
    cache: Arc<QueryCache>,
    state: Mutex<ListState<Q>>,
}

impl<T: Transport, Q: Listing> ListController<T, Q> {
    /// Create a controller. Nothing is fetched until the first load.
    pub fn new(transport: Arc<T>, cache: Arc<QueryCache>, query: Q) -> Self {
        Self {
            transport,
            cache,
            state: Mutex::new(ListState {
                query,
                view: QueryView::idle(),
            }),
        }
    }

    /// Current parameters.
    pub async fn query(&self) -> Q {
        self.state.lock().await.query.clone()
    }

    /// Latest view of the current parameters.
    pub async fn view(&self) -> QueryView<Page<Q::Item>> {
        self.state.lock().await.view.clone()
    }

    /// Apply a parameter change, then load.
    ///
    /// A failure stored for the old signature is dropped when the signature
    /// changes, so coming back to it fetches again.
    pub async fn update<R>(&self, change: impl FnOnce(&mut Q) -> R) -> R {
        let result = {
            let mut state = self.state.lock().await;
            let before = state.query.key();
            let result = change(&mut state.query);
            if state.query.key() != before {
                self.cache.clear_failure(&before).await;
            }
            result
        };
        self.load().await;
        result
    }

    /// Go to the next page. No-op on the last page.
    pub async fn next_page(&self) -> bool {
        self.update(|q| q.pager_mut().next_page()).await
    }

    /// Go to the previous page. No-op on the first page.
    pub async fn previous_page(&self) -> bool {
        self.update(|q| q.pager_mut().previous_page()).await
    }

    /// Change the page size and go back to page 1.
    ///
    /// Sizes outside the allowed set leave the state unchanged and fetch nothing.
    pub async fn set_page_size(&self, size: u32) -> Result<(), QueryError> {
        {
            let state = self.state.lock().await;
            if !state.query.pager().allowed_sizes().contains(&size) {
                return Err(QueryError::UnsupportedPageSize {
                    size,
                    allowed: state.query.pager().allowed_sizes(),
                });
            }
        }
        self.update(|q| q.pager_mut().set_page_size(size)).await
    }

    /// Re-resolve the current signature. Cache hit unless it was invalidated.
    pub async fn refresh(&self) -> QueryView<Page<Q::Item>> {
        self.load().await
    }

    /// Forget a failure for the current signature and fetch again.
    pub async fn retry(&self) -> QueryView<Page<Q::Item>> {
        let key = self.state.lock().await.query.key();
        self.cache.clear_failure(&key).await;
        self.load().await
    }

    /// Resolve the current signature and publish the result.
    pub async fn load(&self) -> QueryView<Page<Q::Item>> {
        loop {
            let key = {
                let mut state = self.state.lock().await;
                state.view = QueryView::loading(state.view.data.clone());
                state.query.key()
            };

            let result = self
                .cache
                .resolve(&key, || api::fetch(self.transport.as_ref(), &key))
                .await
                .and_then(|resource| {
                    Q::extract(resource)
                        .ok_or_else(|| FetchError::Decode(format!("unexpected resource for {key}")))
                });

            let mut state = self.state.lock().await;
            let current = state.query.key();
            if current != key {
                tracing::debug!(%key, %current, "Discarding stale response");
                return state.view.clone();
            }

            match result {
                Ok(page) => {
                    if state.query.pager_mut().observe(&page.meta) {
                        tracing::debug!(
                            %key,
                            total_pages = page.meta.total_pages,
                            "Page out of range, clamping"
                        );
                        continue;
                    }
                    state.view = QueryView::ready(page);
                }
                Err(error) => {
                    tracing::warn!(%key, %error, "List query failed");
                    state.view = QueryView::failed(error.to_string(), state.view.data.clone());
                }
            }
            return state.view.clone();
        }
    }
}

impl<T: Transport> ListController<T, BookQuery> {
    /// Filter by genre; `None` shows all genres.
    pub async fn set_filter(&self, filter: Option<Genre>) {
        self.update(|q| q.set_filter(filter)).await
    }

    /// Sort by field and direction.
    pub async fn set_sort(&self, field: SortField, order: SortOrder) {
        self.update(|q| q.set_sort(field, order)).await
    }

    /// Sort by field, keeping the direction.
    pub async fn set_sort_field(&self, field: SortField) {
        self.update(|q| q.set_sort_field(field)).await
    }

    /// Sort direction, keeping the field.
    pub async fn set_sort_order(&self, order: SortOrder) {
        self.update(|q| q.set_sort_order(order)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::transport::{MockTransport, TransportError};
    use bookify_core::CacheTag;

    fn books(transport: &MockTransport) -> ListController<MockTransport, BookQuery> {
        ListController::new(
            Arc::new(transport.clone()),
            Arc::new(QueryCache::new()),
            BookQuery::new(),
        )
    }

    // ===========================================
    // Loading
    // ===========================================

    #[tokio::test]
    async fn first_load_fetches_default_signature() {
        let transport = MockTransport::new();
        transport.respond_to(BOOKS_PAGE_1, 200, book_page_json("a", 12, 5));
        let list = books(&transport);

        assert_eq!(list.view().await, QueryView::idle());
        let view = list.load().await;

        assert!(!view.is_loading);
        assert!(!view.is_error);
        assert_eq!(view.data.unwrap().len(), 12);
        assert_eq!(list.query().await.pager().total_pages(), 5);
        assert_eq!(transport.sent_lines(), vec![BOOKS_PAGE_1.to_string()]);
    }

    #[tokio::test]
    async fn unchanged_signature_is_served_from_cache() {
        let transport = MockTransport::new();
        transport.respond_to(BOOKS_PAGE_1, 200, book_page_json("a", 3, 1));
        let list = books(&transport);

        list.load().await;
        list.refresh().await;
        // Already on the only page.
        assert!(!list.next_page().await);

        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn failure_shows_error_and_retry_refetches() {
        let transport = MockTransport::new();
        transport.fail_next(TransportError::ConnectionFailed("refused".into()));
        transport.respond_to(BOOKS_PAGE_1, 200, book_page_json("a", 2, 1));
        let list = books(&transport);

        let failed = list.load().await;
        assert!(failed.is_error);
        assert!(failed.error.unwrap().contains("refused"));

        // No automatic retry.
        let still_failed = list.refresh().await;
        assert!(still_failed.is_error);
        assert_eq!(transport.request_count(), 1);

        let retried = list.retry().await;
        assert!(!retried.is_error);
        assert_eq!(retried.data.unwrap().len(), 2);
        assert_eq!(transport.request_count(), 2);
    }

    // ===========================================
    // Parameter changes
    // ===========================================

    #[tokio::test]
    async fn filter_change_resets_page_and_fetches() {
        let transport = MockTransport::new();
        transport.respond_to(BOOKS_PAGE_1, 200, book_page_json("a", 12, 5));
        transport.respond_to(BOOKS_PAGE_2, 200, book_page_json("b", 12, 5));
        let filtered = "GET books?page=1&limit=12&sortBy=createdAt&sort=desc&filter=SCIENCE";
        transport.respond_to(filtered, 200, book_page_json("s", 1, 1));
        let list = books(&transport);

        list.load().await;
        assert!(list.next_page().await);
        assert_eq!(list.query().await.pager().page(), 2);

        list.set_filter(Some(Genre::Science)).await;

        assert_eq!(list.query().await.pager().page(), 1);
        assert_eq!(transport.last_sent().unwrap().line(), filtered);
        assert_eq!(list.view().await.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sort_and_page_size_changes_fetch_new_signatures() {
        let transport = MockTransport::new();
        transport.queue_response(200, book_page_json("a", 1, 1));
        transport.queue_response(200, book_page_json("b", 1, 1));
        transport.queue_response(200, book_page_json("c", 1, 1));
        let list = books(&transport);

        list.load().await;
        list.set_sort(SortField::Title, SortOrder::Asc).await;
        list.set_page_size(20).await.unwrap();

        assert_eq!(
            transport.sent_lines(),
            vec![
                BOOKS_PAGE_1.to_string(),
                "GET books?page=1&limit=12&sortBy=title&sort=asc".to_string(),
                "GET books?page=1&limit=20&sortBy=title&sort=asc".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn unsupported_page_size_fetches_nothing() {
        let transport = MockTransport::new();
        let list = books(&transport);

        let result = list.set_page_size(13).await;

        assert!(matches!(result, Err(QueryError::UnsupportedPageSize { size: 13, .. })));
        assert_eq!(list.query().await.pager().page_size(), 12);
        assert_eq!(transport.request_count(), 0);
    }

    // ===========================================
    // Ordering
    // ===========================================

    #[tokio::test]
    async fn late_page_one_response_is_discarded_after_next_page() {
        let transport = MockTransport::new();
        let cache = Arc::new(QueryCache::new());
        let list = ListController::new(
            Arc::new(transport.clone()),
            cache.clone(),
            BookQuery::new(),
        );

        transport.respond_to(BOOKS_PAGE_1, 200, book_page_json("first", 12, 5));
        list.load().await;

        // Page 1 is refetched and its response arrives after page 2.
        cache.invalidate(CacheTag::Books).await;
        transport.respond_to(BOOKS_PAGE_1, 200, book_page_json("late", 12, 5));
        transport.respond_to(BOOKS_PAGE_2, 200, book_page_json("second", 12, 5));
        transport.hold(BOOKS_PAGE_1);

        let (late_view, ()) = tokio::join!(list.refresh(), async {
            tokio::task::yield_now().await;
            assert!(list.next_page().await);
            transport.release(BOOKS_PAGE_1);
        });

        let view = list.view().await;
        let page = view.data.unwrap();
        assert_eq!(page.data[0].id.as_str(), "second0");
        assert_eq!(late_view.data.unwrap().data[0].id.as_str(), "second0");
        assert_eq!(list.query().await.pager().page(), 2);
        assert_eq!(transport.count_line(BOOKS_PAGE_1), 2);
        assert_eq!(transport.count_line(BOOKS_PAGE_2), 1);
    }

    #[tokio::test]
    async fn shrinking_total_pages_clamps_and_reloads() {
        let transport = MockTransport::new();
        let cache = Arc::new(QueryCache::new());
        let list = ListController::new(
            Arc::new(transport.clone()),
            cache.clone(),
            BookQuery::new(),
        );

        transport.respond_to(BOOKS_PAGE_1, 200, book_page_json("a", 12, 3));
        transport.respond_to(BOOKS_PAGE_2, 200, book_page_json("b", 12, 3));
        transport.respond_to(BOOKS_PAGE_3, 200, book_page_json("c", 12, 3));
        list.load().await;
        list.next_page().await;
        list.next_page().await;
        assert_eq!(list.query().await.pager().page(), 3);

        // Deletes shrank the collection to two pages.
        cache.invalidate(CacheTag::Books).await;
        transport.respond_to(BOOKS_PAGE_3, 200, book_page_json("c", 0, 2));
        transport.respond_to(BOOKS_PAGE_2, 200, book_page_json("b2-", 4, 2));

        let view = list.refresh().await;

        assert_eq!(list.query().await.pager().page(), 2);
        assert_eq!(view.data.unwrap().data[0].id.as_str(), "b2-0");
    }

    #[tokio::test]
    async fn summary_list_pages() {
        let transport = MockTransport::new();
        transport.respond_to(SUMMARY_PAGE_1, 200, summary_page_json(&["Dune", "Emma"], 2));
        transport.respond_to(
            "GET borrow-summary?page=2&limit=10",
            200,
            summary_page_json(&["Ulysses"], 2),
        );
        let list = ListController::new(
            Arc::new(transport.clone()),
            Arc::new(QueryCache::new()),
            SummaryQuery::new(),
        );

        let first = list.load().await.data.unwrap();
        assert_eq!(first.data[1].book.title, "Emma");
        assert_eq!(first.data[1].total_quantity, 2);

        assert!(list.next_page().await);
        assert!(!list.next_page().await);
        assert_eq!(list.view().await.data.unwrap().data[0].book.title, "Ulysses");
    }
}
