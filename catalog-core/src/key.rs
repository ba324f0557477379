//! Request signatures and cache tags.
//!
//! A [`QueryKey`] captures every parameter that affects a query's result.
//! Two structurally equal keys address the same cache entry; any difference
//! is a distinct query.

use bookify_types::{BookId, Genre, SortField, SortOrder};
use std::fmt;

/// Coarse label used to invalidate every entry a mutation affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// Book list pages.
    Books,
    /// Single-book detail entries.
    Book,
    /// Borrow summary pages.
    BorrowSummary,
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheTag::Books => "books",
            CacheTag::Book => "book",
            CacheTag::BorrowSummary => "borrow-summary",
        })
    }
}

/// Parameters of a book list request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookListParams {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Sort field.
    pub sort_by: SortField,
    /// Sort direction.
    pub order: SortOrder,
    /// Genre filter; `None` means all genres.
    pub filter: Option<Genre>,
}

/// Parameters of a borrow summary request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummaryParams {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

/// Request signature: what to fetch, fully parameterized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `GET books?...`
    BookList(BookListParams),
    /// `GET books/{id}`
    Book(BookId),
    /// `GET borrow-summary?...`
    BorrowSummary(SummaryParams),
}

impl QueryKey {
    /// The tag this entry is invalidated by.
    pub fn tag(&self) -> CacheTag {
        match self {
            QueryKey::BookList(_) => CacheTag::Books,
            QueryKey::Book(_) => CacheTag::Book,
            QueryKey::BorrowSummary(_) => CacheTag::BorrowSummary,
        }
    }

    /// The book this key addresses, for detail keys.
    pub fn book_id(&self) -> Option<&BookId> {
        match self {
            QueryKey::Book(id) => Some(id),
            _ => None,
        }
    }

    /// Resource path relative to the API base.
    pub fn path(&self) -> String {
        match self {
            QueryKey::BookList(_) => "books".to_string(),
            QueryKey::Book(id) => format!("books/{}", id),
            QueryKey::BorrowSummary(_) => "borrow-summary".to_string(),
        }
    }

    /// Query string pairs, in a fixed order.
    ///
    /// The genre filter is omitted entirely when all genres are selected.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            QueryKey::BookList(p) => {
                let mut pairs = vec![
                    ("page", p.page.to_string()),
                    ("limit", p.limit.to_string()),
                    ("sortBy", p.sort_by.as_str().to_string()),
                    ("sort", p.order.as_str().to_string()),
                ];
                if let Some(genre) = p.filter {
                    pairs.push(("filter", genre.as_str().to_string()));
                }
                pairs
            }
            QueryKey::Book(_) => Vec::new(),
            QueryKey::BorrowSummary(p) => vec![
                ("page", p.page.to_string()),
                ("limit", p.limit.to_string()),
            ],
        }
    }
}

impl fmt::Display for QueryKey {
    /// Deterministic encoding, e.g. `books?page=1&limit=12&sortBy=createdAt&sort=desc`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())?;
        let pairs = self.query_pairs();
        for (i, (name, value)) in pairs.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}
