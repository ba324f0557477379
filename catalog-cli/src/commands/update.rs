//! Edit a book.

use anyhow::{bail, Result};
use bookify_types::BookId;

use super::{fetch_book, rejected, BookArgs, Session};
use crate::render;

/// Run the update command.
///
/// Fields not given keep their current values.
pub async fn run(session: &Session, id: &BookId, args: &BookArgs) -> Result<()> {
    let current = fetch_book(session, id).await?;
    let mut draft = current.to_draft();
    args.apply(&mut draft);

    if let Some(demo) = session.demo() {
        demo.seed_update(id, &draft);
    }

    match session.client.mutations().update(id, &draft).await {
        Ok(book) => {
            println!("Book updated successfully");
            print!("{}", render::book_detail(&book));
            Ok(())
        }
        Err(failure) => bail!(rejected(&draft, &failure)),
    }
}
