//! # catalog-types
//!
//! Data model and wire format types for the Bookify catalog client.
//!
//! This crate provides the foundational types used across all Bookify crates:
//! - [`BookId`] - Opaque server-assigned identifier
//! - [`Book`], [`Genre`], [`BookDraft`] - Catalog entries and their editable subset
//! - [`BorrowSummary`], [`BorrowRequest`] - Borrow activity
//! - [`Page`], [`PageMeta`], [`DataEnvelope`] - Response envelopes
//! - [`ServerErrorBody`] - Error payload returned by the catalog service
//! - [`TypesError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod book;
mod borrow;
mod error;
mod ids;
mod page;

pub use book::{Book, BookDraft, Genre};
pub use borrow::{BorrowReceipt, BorrowRequest, BorrowSummary, BorrowedBook};
pub use error::{ServerErrorBody, TypesError};
pub use ids::BookId;
pub use page::{DataEnvelope, Page, PageMeta, SortField, SortOrder};
