//! Borrow requests and the borrow summary aggregation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::BookId;

/// Request body for `POST borrows`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    /// The book being borrowed.
    pub book_id: BookId,
    /// Number of copies.
    pub quantity: u32,
    /// Return date, if the borrower picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// What the service echoes back for a recorded borrow.
///
/// Every field is optional; the client only needs to know the call succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowReceipt {
    /// Identifier of the borrow record.
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Quantity recorded.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Due date as sent by the server.
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Denormalized book reference inside a [`BorrowSummary`] row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowedBook {
    /// Identifier of the book, when the service includes it.
    #[serde(rename = "bookId", alias = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookId>,
    /// Title at aggregation time.
    pub title: String,
    /// ISBN at aggregation time.
    pub isbn: String,
}

/// Total quantity borrowed per book. Read-only, recomputed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummary {
    /// The book this row aggregates.
    pub book: BorrowedBook,
    /// Sum of all borrow quantities for the book.
    pub total_quantity: u64,
}
