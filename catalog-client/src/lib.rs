//! # catalog-client
//!
//! Client library for the Bookify catalog service.
//!
//! This is the synchronization layer renderers talk to: it turns list, detail
//! and mutation requests into HTTP calls and keeps one consistent cache of
//! the results.
//!
//! ## Features
//!
//! - **Query cache**: keyed by request signature, deduplicates identical
//!   in-flight requests, invalidated by tag after mutations
//! - **Last change wins**: list and detail controllers drop responses for
//!   parameters they no longer want
//! - **Structured failures**: mutations return validation, not-eligible or
//!   server failures instead of erroring out
//! - **Transport abstraction**: reqwest over HTTP, or a mock for tests
//!
//! ## Example
//!
//! ```ignore
//! use bookify_client::{CatalogClient, ClientConfig};
//! use bookify_types::Genre;
//!
//! let client = CatalogClient::connect(ClientConfig::default())?;
//! let books = client.books();
//! books.set_filter(Some(Genre::Science)).await;
//! let view = books.view().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod api;
pub mod cache;
pub mod card;
pub mod client;
pub mod detail;
pub mod error;
pub mod list;
pub mod mutation;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use cache::{CacheEvent, CacheLookup, QueryCache, Resource};
pub use card::{CardController, CardStep, Committed};
pub use client::{CatalogClient, ClientConfig, ClientError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use detail::DetailFetcher;
pub use error::{FetchError, MutationFailure, MutationResult};
pub use list::{ListController, Listing};
pub use mutation::MutationExecutor;
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, Method, MockTransport, Transport, TransportError,
};
