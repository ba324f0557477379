//! Mutation Executor: create, update, delete, borrow.
//!
//! Every operation returns a [`MutationResult`]; nothing escapes as a panic.
//! On success the executor invalidates the cache entries the change affects
//! and never patches cached data itself. The one exception is delete, which
//! records the book as gone so detail views stop showing it.

use std::sync::Arc;

use bookify_core::{
    map_validation_error, validate_borrow, validate_draft, CacheTag, DraftKind,
    NOT_ELIGIBLE_MESSAGE,
};
use bookify_types::{Book, BookDraft, BookId, BorrowReceipt, BorrowRequest, DataEnvelope};
use chrono::NaiveDate;
use serde_json::Value;

use crate::api;
use crate::cache::QueryCache;
use crate::error::{MutationFailure, MutationResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Update,
    Delete,
    Borrow,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Borrow => "borrow",
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Operation::Create => "Failed to add book",
            Operation::Update => "Failed to update book",
            Operation::Delete => "Failed to delete book",
            Operation::Borrow => "Failed to borrow book",
        }
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Runs mutations against the service and keeps the cache honest.
pub struct MutationExecutor<T: Transport> {
    transport: Arc<T>,
    cache: Arc<QueryCache>,
    today: fn() -> NaiveDate,
}

impl<T: Transport> MutationExecutor<T> {
    /// Create an executor sharing `cache` with the read side.
    pub fn new(transport: Arc<T>, cache: Arc<QueryCache>) -> Self {
        Self {
            transport,
            cache,
            today: local_today,
        }
    }

    /// Use a fixed calendar for date validation.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// `POST books`
    pub async fn create(&self, draft: &BookDraft) -> MutationResult<Arc<Book>> {
        validate_draft(draft, DraftKind::Create, (self.today)())
            .map_err(MutationFailure::Validation)?;

        let request = ApiRequest::new(Method::Post, "books").with_body(to_body(draft)?);
        let body = self.send(Operation::Create, request).await?;

        self.cache.invalidate(CacheTag::Books).await;
        let book = decode_book(Operation::Create, body)?;
        self.cache.invalidate_book(&book.id).await;
        tracing::info!(id = %book.id, title = %book.title, "Book created");
        Ok(book)
    }

    /// `PUT books/{id}`
    pub async fn update(&self, id: &BookId, draft: &BookDraft) -> MutationResult<Arc<Book>> {
        validate_draft(draft, DraftKind::Update, (self.today)())
            .map_err(MutationFailure::Validation)?;

        let request =
            ApiRequest::new(Method::Put, format!("books/{id}")).with_body(to_body(draft)?);
        let body = self.send(Operation::Update, request).await?;

        self.cache.invalidate(CacheTag::Books).await;
        self.cache.invalidate_book(id).await;
        let book = decode_book(Operation::Update, body)?;
        tracing::info!(%id, "Book updated");
        Ok(book)
    }

    /// `DELETE books/{id}`
    ///
    /// On success any detail view of `id` reports `NotFound`.
    pub async fn delete(&self, id: &BookId) -> MutationResult<()> {
        let request = ApiRequest::new(Method::Delete, format!("books/{id}"));
        self.send(Operation::Delete, request).await?;

        self.cache.invalidate(CacheTag::Books).await;
        self.cache.remove_book(id).await;
        tracing::info!(%id, "Book deleted");
        Ok(())
    }

    /// `POST borrows`
    ///
    /// Refused without a request when the freshest cached copy of the book
    /// has no copies or is flagged unavailable. With nothing cached the
    /// service decides.
    pub async fn borrow(
        &self,
        id: &BookId,
        quantity: u32,
        due_date: Option<NaiveDate>,
    ) -> MutationResult<BorrowReceipt> {
        let today = (self.today)();
        let checked = match self.cache.find_book(id).await {
            Some(book) if !book.is_borrowable() => {
                tracing::debug!(
                    %id,
                    copies = book.copies,
                    available = book.available,
                    "Borrow refused locally"
                );
                return Err(MutationFailure::NotEligible {
                    reason: NOT_ELIGIBLE_MESSAGE.to_string(),
                });
            }
            Some(book) => validate_borrow(quantity, book.copies, due_date, today),
            None => validate_borrow(quantity, u32::MAX, due_date, today),
        };
        checked.map_err(MutationFailure::Validation)?;

        let request = BorrowRequest {
            book_id: id.clone(),
            quantity,
            due_date,
        };
        let request = ApiRequest::new(Method::Post, "borrows").with_body(to_body(&request)?);
        let body = self.send(Operation::Borrow, request).await?;

        self.cache.invalidate(CacheTag::Books).await;
        self.cache.invalidate_book(id).await;
        self.cache.invalidate(CacheTag::BorrowSummary).await;
        tracing::info!(%id, quantity, "Book borrowed");

        Ok(decode_receipt(body))
    }

    async fn send(&self, operation: Operation, request: ApiRequest) -> MutationResult<Value> {
        let line = request.line();
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(request = %line, %error, "Mutation not sent");
                return Err(MutationFailure::Server {
                    message: error.to_string(),
                });
            }
        };

        if response.is_success() {
            return Ok(response.body);
        }
        let failure = classify(operation, &response);
        tracing::warn!(
            operation = operation.name(),
            request = %line,
            status = response.status,
            %failure,
            "Mutation failed"
        );
        Err(failure)
    }
}

/// Turn a non-2xx response into a structured failure.
fn classify(operation: Operation, response: &ApiResponse) -> MutationFailure {
    if let Some(fields) = map_validation_error(&response.body) {
        return MutationFailure::Validation(fields);
    }

    let message = api::error_message(&response.body);
    let refused = operation == Operation::Borrow && refuses_copies(response, message.as_deref());
    if response.status == 409 || refused {
        return MutationFailure::NotEligible {
            reason: message.unwrap_or_else(|| NOT_ELIGIBLE_MESSAGE.to_string()),
        };
    }

    MutationFailure::Server {
        message: message.unwrap_or_else(|| operation.default_message().to_string()),
    }
}

fn refuses_copies(response: &ApiResponse, message: Option<&str>) -> bool {
    if !(400..500).contains(&response.status) {
        return false;
    }
    let Some(message) = message else {
        return false;
    };
    let message = message.to_lowercase();
    ["not available", "unavailable", "insufficient", "not enough"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn to_body<S: serde::Serialize>(value: &S) -> MutationResult<Value> {
    serde_json::to_value(value).map_err(|e| MutationFailure::Server {
        message: e.to_string(),
    })
}

fn decode_book(operation: Operation, body: Value) -> MutationResult<Arc<Book>> {
    serde_json::from_value::<DataEnvelope<Book>>(body)
        .map(|envelope| Arc::new(envelope.data))
        .map_err(|e| {
            tracing::warn!(
                operation = operation.name(),
                error = %e,
                "Unexpected mutation response"
            );
            MutationFailure::Server {
                message: format!("{}: unexpected response", operation.default_message()),
            }
        })
}

/// The borrow is already recorded, so an unreadable body only loses the receipt.
fn decode_receipt(body: Value) -> BorrowReceipt {
    serde_json::from_value::<DataEnvelope<BorrowReceipt>>(body)
        .map(|envelope| envelope.data)
        .unwrap_or_else(|e| {
            tracing::warn!(
                operation = Operation::Borrow.name(),
                error = %e,
                "Unexpected mutation response"
            );
            BorrowReceipt::default()
        })
}
