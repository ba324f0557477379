//! # catalog-core
//!
//! Pure logic for the Bookify catalog client (no I/O, instant tests).
//!
//! This crate implements the parts of the synchronization layer that are
//! plain state and functions: request signatures, list query parameters,
//! validation error mapping and the per-card dialog state machine.
//!
//! ## Design Philosophy
//!
//! Nothing in this crate touches the network or a clock. Inputs such as
//! "today" are passed in. The actual I/O is performed by `catalog-client`,
//! which drives these types and interprets the actions they produce.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod detail;
pub mod dialog;
pub mod key;
pub mod query;
pub mod validation;
pub mod view;

pub use detail::DetailState;
pub use dialog::{
    CardDialog, DialogAction, DialogEvent, DialogKind, Eligibility, Notice, NOT_ELIGIBLE_MESSAGE,
};
pub use key::{BookListParams, CacheTag, QueryKey, SummaryParams};
pub use query::{
    BookQuery, ListParams, Pager, QueryError, SummaryQuery, BOOK_PAGE_SIZES, DEFAULT_BOOK_PAGE_SIZE,
    DEFAULT_SUMMARY_PAGE_SIZE, SUMMARY_PAGE_SIZES,
};
pub use validation::{
    map_validation_error, validate_borrow, validate_draft, DraftKind, FieldErrors, FormErrors,
};
pub use view::QueryView;
