//! Plain-text rendering of catalog data.

use bookify_client::MutationFailure;
use bookify_core::{FormErrors, Pager};
use bookify_types::{Book, BookDraft, BorrowSummary, Page};
use std::fmt::Write;

/// One line per book, with a page header.
pub fn book_page(page: &Page<Book>, pager: &Pager) -> String {
    let mut out = format!(
        "Page {}/{} ({} books)\n",
        pager.page(),
        pager.total_pages(),
        page.meta.total
    );
    if page.is_empty() {
        out.push_str("  No books found.\n");
    }
    for book in &page.data {
        let _ = writeln!(
            out,
            "  {:<10} {} by {} [{}] {}",
            book.id.as_str(),
            book.title,
            book.author,
            book.genre.label(),
            availability(book)
        );
    }
    out
}

fn availability(book: &Book) -> String {
    if book.is_borrowable() {
        format!("{} available", book.copies)
    } else {
        "unavailable".to_string()
    }
}

/// All fields of one book.
pub fn book_detail(book: &Book) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "  id:          {}", book.id);
    let _ = writeln!(out, "  author:      {}", book.author);
    let _ = writeln!(out, "  genre:       {}", book.genre.label());
    let _ = writeln!(out, "  isbn:        {}", book.isbn);
    if let Some(year) = book.published_year {
        let _ = writeln!(out, "  published:   {}", year);
    }
    let _ = writeln!(out, "  copies:      {}", book.copies);
    let _ = writeln!(out, "  status:      {}", availability(book));
    if !book.description.is_empty() {
        let _ = writeln!(out, "  description: {}", book.description);
    }
    out
}

/// Borrow summary rows, with a page header.
pub fn summary_page(page: &Page<BorrowSummary>, pager: &Pager) -> String {
    let mut out = format!("Borrow summary, page {}/{}\n", pager.page(), pager.total_pages());
    if page.is_empty() {
        out.push_str("  Nothing borrowed yet.\n");
    }
    for row in &page.data {
        let _ = writeln!(
            out,
            "  {:>4}  {} ({})",
            row.total_quantity, row.book.title, row.book.isbn
        );
    }
    out
}

/// Message for a failed mutation; one line per field for validation failures.
pub fn failure(failure: &MutationFailure) -> String {
    match failure {
        MutationFailure::Validation(fields) => {
            let mut out = String::from("Validation failed:");
            for (field, message) in fields.iter() {
                let _ = write!(out, "\n  {field}: {message}");
            }
            out
        }
        other => other.to_string(),
    }
}

/// Field messages of a rejected form, each with the value that was submitted.
pub fn form_errors(draft: &BookDraft, form: &FormErrors) -> String {
    let mut out = String::from("Validation failed:");
    for (field, message) in form.fields().iter() {
        let _ = write!(out, "\n  {field}: {message}");
        if let Some(value) = submitted(draft, field).filter(|v| !v.trim().is_empty()) {
            let _ = write!(out, " (was \"{value}\")");
        }
    }
    out
}

fn submitted(draft: &BookDraft, field: &str) -> Option<String> {
    match field {
        "title" => Some(draft.title.clone()),
        "author" => Some(draft.author.clone()),
        "genre" => Some(draft.genre.label().to_string()),
        "isbn" => Some(draft.isbn.clone()),
        "description" => Some(draft.description.clone()),
        "publishedYear" => draft.published_year.map(|year| year.to_string()),
        "copies" => Some(draft.copies.to_string()),
        "image" => draft.image.clone(),
        _ => None,
    }
}
