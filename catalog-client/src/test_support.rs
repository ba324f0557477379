//! Fixtures shared by the client's unit tests.

use serde_json::{json, Value};

pub(crate) fn book_json(id: &str, copies: u32, available: bool) -> Value {
    json!({
        "_id": id,
        "title": format!("Title {id}"),
        "author": "Ursula K. Le Guin",
        "genre": "FANTASY",
        "isbn": format!("978-{id}"),
        "description": "A book",
        "copies": copies,
        "available": available,
        "createdAt": "2025-06-20T10:00:00.000Z",
        "updatedAt": "2025-06-20T10:00:00.000Z"
    })
}

/// A book page of `count` borrowable books, ids prefixed with `prefix`.
pub(crate) fn book_page_json(prefix: &str, count: usize, total_pages: u32) -> Value {
    let data: Vec<Value> = (0..count)
        .map(|i| book_json(&format!("{prefix}{i}"), 2, true))
        .collect();
    json!({
        "data": data,
        "meta": { "total": count as u64 * total_pages as u64, "totalPages": total_pages }
    })
}

pub(crate) fn summary_page_json(titles: &[&str], total_pages: u32) -> Value {
    let data: Vec<Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            json!({
                "book": { "title": title, "isbn": format!("isbn-{i}") },
                "totalQuantity": i + 1
            })
        })
        .collect();
    json!({
        "data": data,
        "meta": { "total": titles.len(), "totalPages": total_pages }
    })
}

pub(crate) const BOOKS_PAGE_1: &str = "GET books?page=1&limit=12&sortBy=createdAt&sort=desc";
pub(crate) const BOOKS_PAGE_2: &str = "GET books?page=2&limit=12&sortBy=createdAt&sort=desc";
pub(crate) const BOOKS_PAGE_3: &str = "GET books?page=3&limit=12&sortBy=createdAt&sort=desc";
pub(crate) const SUMMARY_PAGE_1: &str = "GET borrow-summary?page=1&limit=10";
