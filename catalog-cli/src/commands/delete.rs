//! Delete a book, after confirmation.

use anyhow::{bail, Result};
use bookify_client::Committed;
use bookify_types::BookId;

use super::{confirm, fetch_book, Session};
use crate::render;

/// Run the delete command. `yes` skips the prompt.
pub async fn run(session: &Session, id: &BookId, yes: bool) -> Result<()> {
    let book = fetch_book(session, id).await?;
    let card = session.client.card(&book);

    card.request_delete().await;
    if !yes && !confirm(&format!("Delete \"{}\"?", book.title))? {
        card.cancel().await;
        println!("Cancelled");
        return Ok(());
    }

    if let Some(demo) = session.demo() {
        demo.seed_delete(id);
    }

    match card.confirm_delete().await.result {
        Some(Ok(Committed::Deleted)) => {
            println!("Deleted \"{}\"", book.title);
            Ok(())
        }
        Some(Ok(other)) => bail!("Unexpected outcome: {other:?}"),
        Some(Err(failure)) => bail!(render::failure(&failure)),
        None => bail!("Delete was not submitted"),
    }
}
