//! Borrow summary.

use anyhow::{bail, Result};
use bookify_core::{ListParams, SummaryQuery};

use super::Session;
use crate::render;

/// Run the summary command.
pub async fn run(session: &Session, page: u32, limit: Option<u32>) -> Result<()> {
    let mut query = SummaryQuery::new();
    if let Some(limit) = limit {
        query.set_page_size(limit)?;
    }

    if let Some(demo) = session.demo() {
        demo.seed_summary(&query);
    }

    let summary = session.client.borrow_summary_with(query);
    let mut view = summary.load().await;
    while !view.is_error && summary.query().await.pager().page() < page {
        if !summary.next_page().await {
            break;
        }
        view = summary.view().await;
    }

    if view.is_error {
        bail!("Failed to load borrow summary");
    }
    let query = summary.query().await;
    if let Some(rows) = view.data {
        print!("{}", render::summary_page(&rows, query.pager()));
    }
    Ok(())
}
