//! Show one book.

use anyhow::Result;
use bookify_types::BookId;

use super::{fetch_book, Session};
use crate::render;

/// Run the show command.
pub async fn run(session: &Session, id: &BookId) -> Result<()> {
    let book = fetch_book(session, id).await?;
    print!("{}", render::book_detail(&book));
    Ok(())
}
