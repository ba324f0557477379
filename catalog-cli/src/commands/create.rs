//! Add a book.

use anyhow::{bail, Result};
use bookify_types::BookDraft;

use super::{rejected, BookArgs, Session};
use crate::render;

/// Run the create command.
pub async fn run(session: &Session, args: &BookArgs) -> Result<()> {
    let mut draft = BookDraft::default();
    args.apply(&mut draft);

    if let Some(demo) = session.demo() {
        demo.seed_create(&draft);
    }

    match session.client.mutations().create(&draft).await {
        Ok(book) => {
            println!("Book added successfully");
            print!("{}", render::book_detail(&book));
            Ok(())
        }
        Err(failure) => bail!(rejected(&draft, &failure)),
    }
}
