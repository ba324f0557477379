//! Query cache keyed by request signature.
//!
//! The cache is the only shared mutable state in the client. Entries are
//! written when a fetch completes or when a completed mutation invalidates
//! them, never before a round-trip finishes.
//!
//! # Deduplication
//!
//! The first [`QueryCache::resolve`] for a key stores a `Pending` entry
//! holding a `watch` receiver. Later calls for the same key wait on that
//! receiver instead of fetching, so identical simultaneous queries share one
//! request. A fetch that was in flight when its entry was invalidated is not
//! joined; the next resolve starts a new one and the older result is dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bookify_core::{CacheTag, QueryKey};
use bookify_types::{Book, BookId, BorrowSummary, Page};
use tokio::sync::{broadcast, watch, Mutex};

use crate::error::FetchError;

const EVENT_CAPACITY: usize = 64;

/// A decoded server resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    /// One page of books.
    BookPage(Arc<Page<Book>>),
    /// One book.
    Book(Arc<Book>),
    /// One page of the borrow summary.
    SummaryPage(Arc<Page<BorrowSummary>>),
}

impl Resource {
    /// The book page, if this is one.
    pub fn into_book_page(self) -> Option<Arc<Page<Book>>> {
        match self {
            Resource::BookPage(page) => Some(page),
            _ => None,
        }
    }

    /// The book, if this is one.
    pub fn into_book(self) -> Option<Arc<Book>> {
        match self {
            Resource::Book(book) => Some(book),
            _ => None,
        }
    }

    /// The summary page, if this is one.
    pub fn into_summary_page(self) -> Option<Arc<Page<BorrowSummary>>> {
        match self {
            Resource::SummaryPage(page) => Some(page),
            _ => None,
        }
    }
}

/// What the cache holds for a key, without fetching.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Fresh data.
    Cached(Resource),
    /// Data that was invalidated; the next resolve refetches.
    Stale(Resource),
    /// A fetch is in flight.
    Pending,
    /// The last fetch failed.
    Failed(FetchError),
    /// Nothing cached.
    Absent,
}

/// Published whenever entries are invalidated or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Every entry with this tag went stale.
    Invalidated(CacheTag),
    /// The detail entry for this book went stale.
    EntityInvalidated(BookId),
    /// The book was deleted; its detail entry is now `NotFound`.
    Removed(BookId),
}

type Shared = Option<Result<Resource, FetchError>>;

#[derive(Debug)]
enum Entry {
    Ready { resource: Resource, stale: bool },
    Failed(FetchError),
    Pending {
        rx: watch::Receiver<Shared>,
        stale: bool,
        ticket: u64,
    },
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    next_ticket: u64,
}

enum Plan {
    Hit(Result<Resource, FetchError>),
    Join(watch::Receiver<Shared>),
    Fetch(watch::Sender<Shared>, u64),
}

/// Shared cache of server resources.
#[derive(Debug)]
pub struct QueryCache {
    state: Mutex<CacheState>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(CacheState::default()),
            events,
        }
    }

    /// Subscribe to invalidation events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Return cached data for `key`, join an in-flight fetch, or run `fetch`.
    ///
    /// A stored failure is returned as-is; failures are only retried after
    /// [`clear_failure`](Self::clear_failure).
    pub async fn resolve<F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<Resource, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Resource, FetchError>>,
    {
        let plan = {
            let mut state = self.state.lock().await;
            let existing = match state.entries.get(key) {
                Some(Entry::Ready {
                    resource,
                    stale: false,
                }) => Some(Plan::Hit(Ok(resource.clone()))),
                Some(Entry::Failed(error)) => Some(Plan::Hit(Err(error.clone()))),
                // A closed channel means the fetching caller was dropped. A
                // stale fetch started before an invalidation and is replaced.
                Some(Entry::Pending {
                    rx,
                    stale: false,
                    ..
                }) if rx.has_changed().is_ok() => Some(Plan::Join(rx.clone())),
                _ => None,
            };
            match existing {
                Some(plan) => plan,
                None => {
                    let ticket = state.next_ticket;
                    state.next_ticket += 1;
                    let (tx, rx) = watch::channel(None);
                    state.entries.insert(
                        key.clone(),
                        Entry::Pending {
                            rx,
                            stale: false,
                            ticket,
                        },
                    );
                    Plan::Fetch(tx, ticket)
                }
            }
        };

        match plan {
            Plan::Hit(result) => {
                tracing::debug!(%key, "Cache hit");
                result
            }
            Plan::Join(rx) => {
                tracing::debug!(%key, "Joining in-flight request");
                wait_for(rx).await
            }
            Plan::Fetch(tx, ticket) => {
                tracing::debug!(%key, "Fetching");
                let result = fetch().await;
                self.complete(key, ticket, &result).await;
                // No receivers is fine.
                let _ = tx.send(Some(result.clone()));
                result
            }
        }
    }

    async fn complete(&self, key: &QueryKey, ticket: u64, result: &Result<Resource, FetchError>) {
        let mut state = self.state.lock().await;
        let stale = match state.entries.get(key) {
            Some(Entry::Pending {
                ticket: current,
                stale,
                ..
            }) if *current == ticket => *stale,
            _ => {
                tracing::debug!(%key, "Entry replaced while fetching, keeping replacement");
                return;
            }
        };

        let entry = match result {
            Ok(resource) => Entry::Ready {
                resource: resource.clone(),
                stale,
            },
            Err(error) => {
                tracing::warn!(%key, %error, "Fetch failed");
                Entry::Failed(error.clone())
            }
        };
        state.entries.insert(key.clone(), entry);
    }

    /// What is stored for `key`, without fetching.
    pub async fn lookup(&self, key: &QueryKey) -> CacheLookup {
        let state = self.state.lock().await;
        match state.entries.get(key) {
            None => CacheLookup::Absent,
            Some(Entry::Ready {
                resource,
                stale: false,
            }) => CacheLookup::Cached(resource.clone()),
            Some(Entry::Ready { resource, .. }) => CacheLookup::Stale(resource.clone()),
            Some(Entry::Failed(error)) => CacheLookup::Failed(error.clone()),
            Some(Entry::Pending { .. }) => CacheLookup::Pending,
        }
    }

    /// Mark every entry with `tag` stale and drop retryable failures.
    pub async fn invalidate(&self, tag: CacheTag) {
        {
            let mut state = self.state.lock().await;
            invalidate_where(&mut state.entries, |key| key.tag() == tag);
        }
        tracing::debug!(%tag, "Invalidated tag");
        let _ = self.events.send(CacheEvent::Invalidated(tag));
    }

    /// Mark the detail entry of one book stale.
    pub async fn invalidate_book(&self, id: &BookId) {
        {
            let mut state = self.state.lock().await;
            invalidate_where(&mut state.entries, |key| {
                matches!(key, QueryKey::Book(book) if book == id)
            });
        }
        tracing::debug!(%id, "Invalidated book");
        let _ = self.events.send(CacheEvent::EntityInvalidated(id.clone()));
    }

    /// Record that a book no longer exists.
    ///
    /// The detail entry becomes a terminal `NotFound`, replacing any data or
    /// in-flight fetch for it.
    pub async fn remove_book(&self, id: &BookId) {
        {
            let mut state = self.state.lock().await;
            state
                .entries
                .insert(QueryKey::Book(id.clone()), Entry::Failed(FetchError::NotFound));
        }
        tracing::debug!(%id, "Removed book");
        let _ = self.events.send(CacheEvent::Removed(id.clone()));
    }

    /// Forget a retryable failure so the next resolve fetches again.
    ///
    /// `NotFound` is terminal and stays.
    pub async fn clear_failure(&self, key: &QueryKey) {
        let mut state = self.state.lock().await;
        if matches!(state.entries.get(key), Some(Entry::Failed(e)) if e.is_retryable()) {
            state.entries.remove(key);
        }
    }

    /// Freshest cached snapshot of a book.
    ///
    /// Prefers fresh over stale data and the detail entry over list pages.
    pub async fn find_book(&self, id: &BookId) -> Option<Arc<Book>> {
        let state = self.state.lock().await;
        let mut stale_hit = None;

        if let Some(Entry::Ready { resource, stale }) =
            state.entries.get(&QueryKey::Book(id.clone()))
        {
            if let Resource::Book(book) = resource {
                if !stale {
                    return Some(book.clone());
                }
                stale_hit = Some(book.clone());
            }
        }

        for entry in state.entries.values() {
            if let Entry::Ready {
                resource: Resource::BookPage(page),
                stale,
            } = entry
            {
                if let Some(book) = page.data.iter().find(|b| &b.id == id) {
                    if !stale {
                        return Some(Arc::new(book.clone()));
                    }
                    stale_hit.get_or_insert_with(|| Arc::new(book.clone()));
                }
            }
        }

        stale_hit
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }

    /// Number of entries, including failures and pending fetches.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Whether the cache holds nothing.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn mark_stale(entry: &mut Entry) {
    match entry {
        Entry::Ready { stale, .. } | Entry::Pending { stale, .. } => *stale = true,
        Entry::Failed(_) => {}
    }
}

fn invalidate_where(entries: &mut HashMap<QueryKey, Entry>, matches: impl Fn(&QueryKey) -> bool) {
    entries.retain(|key, entry| {
        if !matches(key) {
            return true;
        }
        match entry {
            Entry::Failed(error) => !error.is_retryable(),
            _ => {
                mark_stale(entry);
                true
            }
        }
    });
}

async fn wait_for(mut rx: watch::Receiver<Shared>) -> Result<Resource, FetchError> {
    loop {
        let current = rx.borrow_and_update().clone();
        if let Some(result) = current {
            return result;
        }
        if rx.changed().await.is_err() {
            return Err(FetchError::Transport("request abandoned".into()));
        }
    }
}
