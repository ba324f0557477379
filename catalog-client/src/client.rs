//! CatalogClient - the main interface applications hold.
//!
//! ```text
//! Renderer → CatalogClient → ListController / DetailFetcher / MutationExecutor
//!                                  ↓
//!                             QueryCache → Transport → Network
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bookify_client::{CatalogClient, ClientConfig};
//!
//! let client = CatalogClient::connect(ClientConfig::default())?;
//! let books = client.books();
//! let view = books.load().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use bookify_core::{BookQuery, SummaryQuery};
use bookify_types::Book;
use chrono::NaiveDate;
use thiserror::Error;

use crate::cache::QueryCache;
use crate::card::CardController;
use crate::detail::DetailFetcher;
use crate::list::ListController;
use crate::mutation::MutationExecutor;
use crate::transport::{HttpTransport, Transport, TransportError};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Configuration for CatalogClient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    /// Configuration for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the URL scheme and timeout.
    pub fn validate(&self) -> Result<(), ClientError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base url must start with http:// or https://: {url}"
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::InvalidConfig("timeout must be positive".into()));
        }
        Ok(())
    }
}

/// The catalog client.
///
/// Owns the shared cache. Controllers created from one client see each
/// other's invalidations.
pub struct CatalogClient<T: Transport> {
    config: ClientConfig,
    transport: Arc<T>,
    cache: Arc<QueryCache>,
    executor: Arc<MutationExecutor<T>>,
}

impl CatalogClient<HttpTransport> {
    /// Build a client talking HTTP to `config.base_url`.
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = HttpTransport::new(config.base_url.trim(), config.timeout)?;
        tracing::debug!(base_url = %transport.base_url(), "Catalog client ready");
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> CatalogClient<T> {
    /// Create a client over any transport.
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let transport = Arc::new(transport);
        let cache = Arc::new(QueryCache::new());
        let executor = Arc::new(MutationExecutor::new(transport.clone(), cache.clone()));
        Self {
            config,
            transport,
            cache,
            executor,
        }
    }

    /// Use a fixed calendar for date validation in mutations.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.executor = Arc::new(
            MutationExecutor::new(self.transport.clone(), self.cache.clone()).with_today(today),
        );
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The shared cache.
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Book list with default parameters.
    pub fn books(&self) -> ListController<T, BookQuery> {
        self.books_with(BookQuery::new())
    }

    /// Book list starting from `query`.
    pub fn books_with(&self, query: BookQuery) -> ListController<T, BookQuery> {
        ListController::new(self.transport.clone(), self.cache.clone(), query)
    }

    /// Borrow summary list with default parameters.
    pub fn borrow_summary(&self) -> ListController<T, SummaryQuery> {
        self.borrow_summary_with(SummaryQuery::new())
    }

    /// Borrow summary list starting from `query`.
    pub fn borrow_summary_with(&self, query: SummaryQuery) -> ListController<T, SummaryQuery> {
        ListController::new(self.transport.clone(), self.cache.clone(), query)
    }

    /// A detail fetcher.
    pub fn detail(&self) -> DetailFetcher<T> {
        DetailFetcher::new(self.transport.clone(), self.cache.clone())
    }

    /// The mutation executor.
    pub fn mutations(&self) -> &MutationExecutor<T> {
        &self.executor
    }

    /// Dialog controller for a rendered book card.
    pub fn card(&self, book: &Book) -> CardController<T> {
        CardController::new(book, self.executor.clone(), self.cache.clone())
    }
}
