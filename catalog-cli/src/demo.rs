//! Canned catalog for `--mock` runs.
//!
//! Answers are computed from a small in-memory catalog and registered on the
//! mock transport for the exact requests a command is about to make.

use bookify_client::MockTransport;
use bookify_core::{BookQuery, QueryKey, SummaryQuery};
use bookify_types::{Book, BookDraft, BookId, BorrowSummary, Genre, SortField, SortOrder};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

/// Demo catalog wired to a mock transport.
pub struct DemoServer {
    books: Vec<Book>,
    summary: Vec<BorrowSummary>,
    transport: MockTransport,
}

type Entry = (&'static str, &'static str, &'static str, Genre, i32, u32, bool);

const CATALOG: &[Entry] = &[
    ("demo-1", "The Left Hand of Darkness", "Ursula K. Le Guin", Genre::Fiction, 1969, 3, true),
    ("demo-2", "A Brief History of Time", "Stephen Hawking", Genre::Science, 1988, 2, true),
    ("demo-3", "The Guns of August", "Barbara W. Tuchman", Genre::History, 1962, 1, true),
    ("demo-4", "Long Walk to Freedom", "Nelson Mandela", Genre::Biography, 1994, 4, true),
    ("demo-5", "The Hobbit", "J. R. R. Tolkien", Genre::Fantasy, 1937, 5, true),
    ("demo-6", "Sapiens", "Yuval Noah Harari", Genre::NonFiction, 2011, 2, true),
    ("demo-7", "The Lost Manuscript", "Anonymous", Genre::History, 1850, 0, false),
    ("demo-8", "Cosmos", "Carl Sagan", Genre::Science, 1980, 3, false),
];

/// Entry `index` was added on day `index + 1` of June 2025.
fn demo_book(index: usize, entry: &Entry) -> Option<Book> {
    let (id, title, author, genre, year, copies, available) = *entry;
    let day = index as u32 + 1;
    let created = Utc.with_ymd_and_hms(2025, 6, day, 9, 0, 0).single();
    Some(Book {
        id: BookId::new(id).ok()?,
        title: title.to_string(),
        author: author.to_string(),
        genre,
        isbn: format!("978-0-{day:02}-{year}"),
        description: format!("{title} by {author}."),
        published_year: Some(year),
        copies,
        available,
        image: None,
        created_at: created,
        updated_at: created,
    })
}

impl DemoServer {
    /// The demo catalog, answering through `transport`.
    pub fn new(transport: MockTransport) -> Self {
        let books: Vec<Book> = CATALOG
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| demo_book(index, entry))
            .collect();
        let summary = [("demo-5", 4), ("demo-1", 2), ("demo-2", 1)]
            .iter()
            .filter_map(|(id, quantity)| {
                let book = books.iter().find(|b| b.id.as_str() == *id)?;
                serde_json::from_value(json!({
                    "book": { "bookId": id, "title": book.title, "isbn": book.isbn },
                    "totalQuantity": quantity
                }))
                .ok()
            })
            .collect();

        Self {
            books,
            summary,
            transport,
        }
    }

    fn find(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|b| &b.id == id)
    }

    fn not_found() -> Value {
        json!({ "success": false, "message": "Book not found" })
    }

    /// Every page of the list `query` describes.
    pub fn seed_books(&self, query: &BookQuery) {
        let mut params = query.params();
        let mut rows: Vec<&Book> = self
            .books
            .iter()
            .filter(|b| params.filter.map_or(true, |genre| b.genre == genre))
            .collect();
        match params.sort_by {
            SortField::CreatedAt => rows.sort_by_key(|b| b.created_at),
            SortField::Title => rows.sort_by(|a, b| a.title.cmp(&b.title)),
            SortField::Author => rows.sort_by(|a, b| a.author.cmp(&b.author)),
        }
        if params.order == SortOrder::Desc {
            rows.reverse();
        }

        let pages = paginate(&rows, params.limit);
        let total_pages = pages.len() as u32;
        for (index, page) in pages.into_iter().enumerate() {
            params.page = index as u32 + 1;
            let key = QueryKey::BookList(params.clone());
            self.transport.always_respond_to(
                format!("GET {key}"),
                200,
                json!({
                    "data": page,
                    "meta": { "total": rows.len(), "totalPages": total_pages }
                }),
            );
        }
    }

    /// `GET books/{id}`
    pub fn seed_book(&self, id: &BookId) {
        let line = format!("GET books/{id}");
        match self.find(id) {
            Some(book) => self
                .transport
                .always_respond_to(line, 200, json!({ "success": true, "data": book })),
            None => self.transport.always_respond_to(line, 404, Self::not_found()),
        }
    }

    /// `POST books`
    pub fn seed_create(&self, draft: &BookDraft) {
        let mut book = json!(draft);
        book["_id"] = json!("demo-new");
        book["createdAt"] = json!(Utc::now());
        book["updatedAt"] = book["createdAt"].clone();
        self.transport.always_respond_to(
            "POST books",
            201,
            json!({ "success": true, "message": "Book created successfully", "data": book }),
        );
    }

    /// `PUT books/{id}`
    pub fn seed_update(&self, id: &BookId, draft: &BookDraft) {
        let line = format!("PUT books/{id}");
        match self.find(id) {
            Some(existing) => {
                let mut book = json!(draft);
                book["_id"] = json!(id);
                book["createdAt"] = json!(existing.created_at);
                book["updatedAt"] = json!(Utc::now());
                self.transport
                    .always_respond_to(line, 200, json!({ "success": true, "data": book }));
            }
            None => self.transport.always_respond_to(line, 404, Self::not_found()),
        }
    }

    /// `DELETE books/{id}`
    pub fn seed_delete(&self, id: &BookId) {
        let line = format!("DELETE books/{id}");
        match self.find(id) {
            Some(_) => self.transport.always_respond_to(
                line,
                200,
                json!({ "success": true, "message": "Book deleted successfully", "data": null }),
            ),
            None => self.transport.always_respond_to(line, 404, Self::not_found()),
        }
    }

    /// `POST borrows`
    pub fn seed_borrow(&self, id: &BookId, quantity: u32) {
        let (status, body) = match self.find(id) {
            None => (404, Self::not_found()),
            Some(book) if !book.is_borrowable() || quantity > book.copies => (
                400,
                json!({ "success": false, "message": "Not enough copies available" }),
            ),
            Some(_) => (
                201,
                json!({
                    "success": true,
                    "message": "Book borrowed successfully",
                    "data": { "_id": "demo-borrow-1", "book": id, "quantity": quantity }
                }),
            ),
        };
        self.transport.always_respond_to("POST borrows", status, body);
    }

    /// Every page of the borrow summary for `query`'s page size.
    pub fn seed_summary(&self, query: &SummaryQuery) {
        let mut params = query.params();
        let rows: Vec<&BorrowSummary> = self.summary.iter().collect();
        let pages = paginate(&rows, params.limit);
        let total_pages = pages.len() as u32;
        for (index, page) in pages.into_iter().enumerate() {
            params.page = index as u32 + 1;
            let key = QueryKey::BorrowSummary(params.clone());
            self.transport.always_respond_to(
                format!("GET {key}"),
                200,
                json!({
                    "data": page,
                    "meta": { "total": rows.len(), "totalPages": total_pages }
                }),
            );
        }
    }
}

/// Split into pages of `limit`; an empty collection is one empty page.
fn paginate<'a, T>(rows: &[&'a T], limit: u32) -> Vec<Vec<&'a T>> {
    let limit = limit.max(1) as usize;
    if rows.is_empty() {
        return vec![Vec::new()];
    }
    rows.chunks(limit).map(|chunk| chunk.to_vec()).collect()
}
