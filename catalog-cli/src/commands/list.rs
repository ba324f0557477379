//! List books.

use anyhow::{bail, Result};
use bookify_core::{BookQuery, ListParams};
use bookify_types::{Genre, SortField, SortOrder};

use super::Session;
use crate::render;

/// List options.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Genre filter.
    pub genre: Option<Genre>,
    /// Sort field.
    pub sort: Option<SortField>,
    /// Sort direction.
    pub order: Option<SortOrder>,
    /// Page size; the configured size when absent.
    pub limit: Option<u32>,
    /// Page to show.
    pub page: u32,
}

/// Run the list command.
pub async fn run(session: &Session, options: ListOptions) -> Result<()> {
    let mut query = BookQuery::new();
    query.set_page_size(options.limit.unwrap_or(session.settings.page_size))?;
    query.set_filter(options.genre);
    query.set_sort(
        options.sort.unwrap_or_default(),
        options.order.unwrap_or_default(),
    );

    if let Some(demo) = session.demo() {
        demo.seed_books(&query);
    }

    let books = session.client.books_with(query);
    let mut view = books.load().await;
    while !view.is_error && books.query().await.pager().page() < options.page {
        if !books.next_page().await {
            break;
        }
        view = books.view().await;
    }

    if view.is_error {
        bail!(
            "Failed to load books: {}",
            view.error.unwrap_or_else(|| "unknown error".into())
        );
    }
    let query = books.query().await;
    if let Some(page) = view.data {
        print!("{}", render::book_page(&page, query.pager()));
    }
    Ok(())
}
