//! Runs a card's dialog state machine against the mutation executor.

use std::sync::Arc;

use bookify_core::{CardDialog, DialogAction, DialogEvent, Eligibility};
use bookify_types::{Book, BookId, BorrowReceipt};
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::cache::QueryCache;
use crate::error::MutationResult;
use crate::mutation::MutationExecutor;
use crate::transport::Transport;

/// A mutation a card committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed {
    /// The book was deleted.
    Deleted,
    /// The book was borrowed.
    Borrowed(BorrowReceipt),
}

/// What one user interaction produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardStep {
    /// Dialog actions, in order, including executed mutations.
    pub actions: Vec<DialogAction>,
    /// Outcome of the mutation, when one was committed.
    pub result: Option<MutationResult<Committed>>,
}

/// Dialog state and actions for one book card.
pub struct CardController<T: Transport> {
    id: BookId,
    rendered: Eligibility,
    executor: Arc<MutationExecutor<T>>,
    cache: Arc<QueryCache>,
    dialog: Mutex<CardDialog>,
}

impl<T: Transport> CardController<T> {
    /// A card for `book` as it was rendered.
    pub fn new(book: &Book, executor: Arc<MutationExecutor<T>>, cache: Arc<QueryCache>) -> Self {
        Self {
            id: book.id.clone(),
            rendered: Eligibility::of(book),
            executor,
            cache,
            dialog: Mutex::new(CardDialog::new()),
        }
    }

    /// The card's book.
    pub fn book_id(&self) -> &BookId {
        &self.id
    }

    /// Current dialog state.
    pub async fn dialog(&self) -> CardDialog {
        self.dialog.lock().await.clone()
    }

    /// Open the delete confirmation.
    pub async fn request_delete(&self) -> CardStep {
        self.dispatch(DialogEvent::DeleteRequested).await
    }

    /// Open the borrow dialog, unless the book is not eligible right now.
    ///
    /// Uses the freshest cached copy of the book, falling back to the one
    /// the card was rendered from.
    pub async fn request_borrow(&self) -> CardStep {
        let eligibility = self
            .cache
            .find_book(&self.id)
            .await
            .map(|book| Eligibility::of(&book))
            .unwrap_or(self.rendered);
        self.dispatch(DialogEvent::BorrowRequested(eligibility)).await
    }

    /// Confirm the delete and run it.
    pub async fn confirm_delete(&self) -> CardStep {
        self.dispatch(DialogEvent::DeleteConfirmed).await
    }

    /// Submit the borrow form and run it.
    pub async fn confirm_borrow(&self, quantity: u32, due_date: Option<NaiveDate>) -> CardStep {
        self.dispatch(DialogEvent::BorrowConfirmed { quantity, due_date })
            .await
    }

    /// Close whatever is open.
    pub async fn cancel(&self) -> CardStep {
        self.dispatch(DialogEvent::Cancelled).await
    }

    async fn transition(&self, event: DialogEvent) -> Vec<DialogAction> {
        let mut dialog = self.dialog.lock().await;
        let (next, actions) = dialog.clone().on_event(event);
        *dialog = next;
        actions
    }

    async fn dispatch(&self, event: DialogEvent) -> CardStep {
        let mut step = CardStep::default();

        for action in self.transition(event).await {
            let result = match &action {
                DialogAction::ExecuteDelete => {
                    Some(self.executor.delete(&self.id).await.map(|()| Committed::Deleted))
                }
                DialogAction::ExecuteBorrow { quantity, due_date } => Some(
                    self.executor
                        .borrow(&self.id, *quantity, *due_date)
                        .await
                        .map(Committed::Borrowed),
                ),
                _ => None,
            };
            step.actions.push(action);

            if let Some(result) = result {
                step.result = Some(result);
                step.actions.extend(self.transition(DialogEvent::Completed).await);
            }
        }

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MutationFailure;
    use crate::test_support::book_json;
    use crate::transport::MockTransport;
    use bookify_core::{DialogKind, Notice, QueryKey};
    use serde_json::json;

    fn book(raw: &str, copies: u32, available: bool) -> Book {
        serde_json::from_value(book_json(raw, copies, available)).unwrap()
    }

    fn card(
        transport: &MockTransport,
        book: &Book,
    ) -> (CardController<MockTransport>, Arc<QueryCache>) {
        let cache = Arc::new(QueryCache::new());
        let executor = Arc::new(MutationExecutor::new(Arc::new(transport.clone()), cache.clone()));
        (CardController::new(book, executor, cache.clone()), cache)
    }

    #[tokio::test]
    async fn delete_flow_returns_to_idle() {
        let transport = MockTransport::new();
        transport.respond_to("DELETE books/a", 200, json!({ "data": null }));
        let (card, _) = card(&transport, &book("a", 1, true));

        let opened = card.request_delete().await;
        assert_eq!(opened.actions, vec![DialogAction::Open(DialogKind::Delete)]);
        assert_eq!(card.dialog().await, CardDialog::ConfirmingDelete);

        let done = card.confirm_delete().await;
        assert_eq!(
            done.actions,
            vec![DialogAction::ExecuteDelete, DialogAction::Close(DialogKind::Delete)]
        );
        assert_eq!(done.result, Some(Ok(Committed::Deleted)));
        assert_eq!(card.dialog().await, CardDialog::Idle);
    }

    #[tokio::test]
    async fn failed_commit_still_returns_to_idle() {
        let transport = MockTransport::new();
        transport.respond_to("DELETE books/a", 500, json!({ "message": "boom" }));
        let (card, _) = card(&transport, &book("a", 1, true));

        card.request_delete().await;
        let done = card.confirm_delete().await;

        assert_eq!(
            done.result,
            Some(Err(MutationFailure::Server {
                message: "boom".into()
            }))
        );
        assert_eq!(card.dialog().await, CardDialog::Idle);
    }

    #[tokio::test]
    async fn borrow_refused_when_rendered_book_is_empty() {
        let transport = MockTransport::new();
        let (card, _) = card(&transport, &book("a", 0, true));

        let step = card.request_borrow().await;

        assert_eq!(step.actions, vec![DialogAction::Notify(Notice::NotEligible)]);
        assert_eq!(card.dialog().await, CardDialog::Idle);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn borrow_guard_reads_fresh_cache_data() {
        let transport = MockTransport::new();
        let (card, cache) = card(&transport, &book("a", 3, true));

        // The book ran out after the card was rendered.
        transport.respond_to("GET books/a", 200, json!({ "data": book_json("a", 0, false) }));
        let key = QueryKey::Book(BookId::new("a").unwrap());
        cache
            .resolve(&key, || crate::api::fetch(&transport, &key))
            .await
            .unwrap();

        let step = card.request_borrow().await;
        assert_eq!(step.actions, vec![DialogAction::Notify(Notice::NotEligible)]);
    }

    #[tokio::test]
    async fn borrow_flow_switches_from_delete_and_commits() {
        let transport = MockTransport::new();
        transport.respond_to("POST borrows", 201, json!({ "data": { "_id": "r1" } }));
        let (card, _) = card(&transport, &book("a", 3, true));

        card.request_delete().await;
        let switched = card.request_borrow().await;
        assert_eq!(
            switched.actions,
            vec![
                DialogAction::Close(DialogKind::Delete),
                DialogAction::Open(DialogKind::Borrow)
            ]
        );
        assert_eq!(card.dialog().await, CardDialog::ConfirmingBorrow { max_quantity: 3 });

        let done = card.confirm_borrow(2, None).await;
        assert!(matches!(done.result, Some(Ok(Committed::Borrowed(_)))));
        assert_eq!(
            done.actions.last(),
            Some(&DialogAction::Close(DialogKind::Borrow))
        );
        assert_eq!(card.dialog().await, CardDialog::Idle);
    }

    #[tokio::test]
    async fn cancel_has_no_side_effects() {
        let transport = MockTransport::new();
        let (card, _) = card(&transport, &book("a", 3, true));

        card.request_borrow().await;
        let step = card.cancel().await;

        assert_eq!(step.actions, vec![DialogAction::Close(DialogKind::Borrow)]);
        assert_eq!(step.result, None);
        assert_eq!(transport.request_count(), 0);
    }
}
