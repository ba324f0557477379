//! Borrow copies of a book.

use anyhow::{bail, Result};
use bookify_client::Committed;
use bookify_types::BookId;
use chrono::NaiveDate;

use super::{fetch_book, notice, Session};
use crate::render;

/// Run the borrow command.
pub async fn run(
    session: &Session,
    id: &BookId,
    quantity: u32,
    due_date: Option<NaiveDate>,
) -> Result<()> {
    let book = fetch_book(session, id).await?;
    let card = session.client.card(&book);

    let opened = card.request_borrow().await;
    if let Some(notice) = notice(&opened.actions) {
        bail!(notice.message());
    }

    if let Some(demo) = session.demo() {
        demo.seed_borrow(id, quantity);
    }

    match card.confirm_borrow(quantity, due_date).await.result {
        Some(Ok(Committed::Borrowed(receipt))) => {
            println!("Borrowed {} of \"{}\"", quantity, book.title);
            if let Some(due) = receipt.due_date.or_else(|| due_date.map(|d| d.to_string())) {
                println!("  due: {due}");
            }
            Ok(())
        }
        Some(Ok(other)) => bail!("Unexpected outcome: {other:?}"),
        Some(Err(failure)) => bail!(render::failure(&failure)),
        None => bail!("Borrow was not submitted"),
    }
}
