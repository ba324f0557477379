//! List query parameters for paginated collections.
//!
//! This module holds the state behind a list view: page, page size, sort
//! and filter. It enforces two rules:
//! - Changing filter, sort field, sort direction or page size resets the
//!   page to 1. The old page index means nothing for a different result set.
//! - `next_page`/`previous_page` clamp at the bounds and never fail.
//!
//! Fetching is done by `catalog-client`, which reads [`ListParams::key`]
//! after every change.

use bookify_types::{Genre, PageMeta, SortField, SortOrder};
use thiserror::Error;

use crate::key::{BookListParams, QueryKey, SummaryParams};

/// Page sizes offered for the book list.
pub const BOOK_PAGE_SIZES: &[u32] = &[4, 8, 10, 12, 16, 20, 28, 50];
/// Default book list page size.
pub const DEFAULT_BOOK_PAGE_SIZE: u32 = 12;
/// Page sizes offered for the borrow summary.
pub const SUMMARY_PAGE_SIZES: &[u32] = &[10, 20, 50];
/// Default borrow summary page size.
pub const DEFAULT_SUMMARY_PAGE_SIZE: u32 = 10;

/// Errors from list query updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Page size outside the allowed set.
    #[error("unsupported page size {size} (allowed: {allowed:?})")]
    UnsupportedPageSize {
        /// Requested size.
        size: u32,
        /// Sizes this list accepts.
        allowed: &'static [u32],
    },
}

/// Page position plus the collection size last reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    page_size: u32,
    total_pages: u32,
    total: u64,
    allowed_sizes: &'static [u32],
}

impl Pager {
    /// Create a pager on page 1.
    ///
    /// Until the first response arrives there is exactly one known page.
    pub fn new(page_size: u32, allowed_sizes: &'static [u32]) -> Self {
        Self {
            page: 1,
            page_size,
            total_pages: 1,
            total: 0,
            allowed_sizes,
        }
    }

    /// Current 1-based page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Current page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Total pages as last reported.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Total items as last reported.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Sizes accepted by [`Pager::set_page_size`].
    pub fn allowed_sizes(&self) -> &'static [u32] {
        self.allowed_sizes
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Advance one page. Returns false (and does nothing) on the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.page += 1;
        true
    }

    /// Go back one page. Returns false (and does nothing) on page 1.
    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Change the page size and go back to page 1.
    pub fn set_page_size(&mut self, size: u32) -> Result<(), QueryError> {
        if !self.allowed_sizes.contains(&size) {
            return Err(QueryError::UnsupportedPageSize {
                size,
                allowed: self.allowed_sizes,
            });
        }
        self.page_size = size;
        self.reset();
        Ok(())
    }

    /// Back to page 1.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Record metadata from a response for the current parameters.
    ///
    /// Returns true if the current page no longer exists and was clamped to
    /// the last page, in which case the caller must fetch again.
    pub fn observe(&mut self, meta: &PageMeta) -> bool {
        self.total = meta.total;
        // An empty result still has one (empty) page.
        self.total_pages = meta.total_pages.max(1);
        if self.page > self.total_pages {
            self.page = self.total_pages;
            return true;
        }
        false
    }
}

/// Shared behaviour of list query states.
pub trait ListParams: Clone + Send + Sync + 'static {
    /// Request signature for the current parameters.
    fn key(&self) -> QueryKey;

    /// Pagination state.
    fn pager(&self) -> &Pager;

    /// Mutable pagination state.
    fn pager_mut(&mut self) -> &mut Pager;
}

/// Parameters of the book collection view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pager: Pager,
    sort_field: SortField,
    sort_order: SortOrder,
    filter: Option<Genre>,
}

impl BookQuery {
    /// Newest books first, 12 per page, all genres.
    pub fn new() -> Self {
        Self {
            pager: Pager::new(DEFAULT_BOOK_PAGE_SIZE, BOOK_PAGE_SIZES),
            sort_field: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
            filter: None,
        }
    }

    /// Genre filter; `None` shows all genres.
    pub fn filter(&self) -> Option<Genre> {
        self.filter
    }

    /// Sort field.
    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    /// Sort direction.
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Set the genre filter and go back to page 1.
    pub fn set_filter(&mut self, filter: Option<Genre>) {
        self.filter = filter;
        self.pager.reset();
    }

    /// Set field and direction together and go back to page 1.
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        self.sort_field = field;
        self.sort_order = order;
        self.pager.reset();
    }

    /// Set the sort field and go back to page 1.
    pub fn set_sort_field(&mut self, field: SortField) {
        self.sort_field = field;
        self.pager.reset();
    }

    /// Set the sort direction and go back to page 1.
    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
        self.pager.reset();
    }

    /// Set the page size and go back to page 1.
    pub fn set_page_size(&mut self, size: u32) -> Result<(), QueryError> {
        self.pager.set_page_size(size)
    }

    /// Advance one page if possible.
    pub fn next_page(&mut self) -> bool {
        self.pager.next_page()
    }

    /// Go back one page if possible.
    pub fn previous_page(&mut self) -> bool {
        self.pager.previous_page()
    }

    /// The request parameters for the current state.
    pub fn params(&self) -> BookListParams {
        BookListParams {
            page: self.pager.page(),
            limit: self.pager.page_size(),
            sort_by: self.sort_field,
            order: self.sort_order,
            filter: self.filter,
        }
    }
}

impl Default for BookQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ListParams for BookQuery {
    fn key(&self) -> QueryKey {
        QueryKey::BookList(self.params())
    }

    fn pager(&self) -> &Pager {
        &self.pager
    }

    fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }
}

/// Parameters of the borrow summary view. Only paginated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    pager: Pager,
}

impl SummaryQuery {
    /// Page 1, 10 rows per page.
    pub fn new() -> Self {
        Self {
            pager: Pager::new(DEFAULT_SUMMARY_PAGE_SIZE, SUMMARY_PAGE_SIZES),
        }
    }

    /// Set the page size and go back to page 1.
    pub fn set_page_size(&mut self, size: u32) -> Result<(), QueryError> {
        self.pager.set_page_size(size)
    }

    /// Advance one page if possible.
    pub fn next_page(&mut self) -> bool {
        self.pager.next_page()
    }

    /// Go back one page if possible.
    pub fn previous_page(&mut self) -> bool {
        self.pager.previous_page()
    }

    /// The request parameters for the current state.
    pub fn params(&self) -> SummaryParams {
        SummaryParams {
            page: self.pager.page(),
            limit: self.pager.page_size(),
        }
    }
}

impl Default for SummaryQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ListParams for SummaryQuery {
    fn key(&self) -> QueryKey {
        QueryKey::BorrowSummary(self.params())
    }

    fn pager(&self) -> &Pager {
        &self.pager
    }

    fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }
}
