//! Per-card dialog state machine.
//!
//! Each book card (list entry or detail page) can show at most one of two
//! dialogs: delete confirmation or borrow. This module is a pure state
//! machine: it takes events and returns the new state plus actions for the
//! caller to perform. Opening one dialog always closes the other first.
//!
//! Borrowing is guarded: the request is refused when the book has no copies
//! or is flagged unavailable. The guard reads the [`Eligibility`] passed with
//! the event, so callers must build it from the data they hold at that moment.

use bookify_types::Book;
use chrono::NaiveDate;

/// Message shown when a borrow is refused client-side.
pub const NOT_ELIGIBLE_MESSAGE: &str = "This book is not available for borrowing! Try another one.";

/// Dialog state of one card.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CardDialog {
    /// No dialog open.
    #[default]
    Idle,
    /// Delete confirmation is open.
    ConfirmingDelete,
    /// Borrow dialog is open.
    ConfirmingBorrow {
        /// Upper bound for the quantity input.
        max_quantity: u32,
    },
    /// The confirmed mutation is in flight. Every request is ignored until it completes.
    Submitting(DialogKind),
}

/// Which dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    /// Delete confirmation.
    Delete,
    /// Borrow dialog.
    Borrow,
}

/// Snapshot of the borrow guard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    /// Copies on hand.
    pub copies: u32,
    /// Server availability flag.
    pub available: bool,
}

impl Eligibility {
    /// Read the guard inputs from a book.
    pub fn of(book: &Book) -> Self {
        Self {
            copies: book.copies,
            available: book.available,
        }
    }

    /// Zero copies or the unavailable flag both refuse a borrow.
    pub fn allows_borrow(&self) -> bool {
        self.copies > 0 && self.available
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// User clicked delete.
    DeleteRequested,
    /// User clicked borrow.
    BorrowRequested(Eligibility),
    /// User confirmed the delete.
    DeleteConfirmed,
    /// User submitted the borrow form.
    BorrowConfirmed {
        /// Copies to borrow.
        quantity: u32,
        /// Optional return date.
        due_date: Option<NaiveDate>,
    },
    /// User dismissed the open dialog.
    Cancelled,
    /// The submitted mutation finished, successfully or not.
    Completed,
}

/// Notifications for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Borrow refused because the book is not eligible.
    NotEligible,
}

impl Notice {
    /// Text to display.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NotEligible => NOT_ELIGIBLE_MESSAGE,
        }
    }
}

/// Instructions for the caller. Nothing here has happened yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    /// Show a dialog.
    Open(DialogKind),
    /// Hide a dialog.
    Close(DialogKind),
    /// Show a non-blocking notification.
    Notify(Notice),
    /// Run the delete mutation for this card's book.
    ExecuteDelete,
    /// Run the borrow mutation for this card's book.
    ExecuteBorrow {
        /// Copies to borrow.
        quantity: u32,
        /// Optional return date.
        due_date: Option<NaiveDate>,
    },
}

impl CardDialog {
    /// A card with no dialog open.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function. The caller performs the returned actions and
    /// reports `Completed` once an `Execute*` action has finished.
    pub fn on_event(self, event: DialogEvent) -> (Self, Vec<DialogAction>) {
        use DialogAction::{Close, Open};

        match (self, event) {
            // In flight: only completion moves us
            (Self::Submitting(kind), DialogEvent::Completed) => (Self::Idle, vec![Close(kind)]),
            (state @ Self::Submitting(_), _) => (state, vec![]),

            // Borrow guard, evaluated on every attempt
            (state, DialogEvent::BorrowRequested(eligibility)) if !eligibility.allows_borrow() => {
                (state, vec![DialogAction::Notify(Notice::NotEligible)])
            }

            // Opening delete
            (Self::Idle, DialogEvent::DeleteRequested) => {
                (Self::ConfirmingDelete, vec![Open(DialogKind::Delete)])
            }
            (Self::ConfirmingBorrow { .. }, DialogEvent::DeleteRequested) => (
                Self::ConfirmingDelete,
                vec![Close(DialogKind::Borrow), Open(DialogKind::Delete)],
            ),

            // Opening borrow
            (Self::Idle, DialogEvent::BorrowRequested(eligibility)) => (
                Self::ConfirmingBorrow {
                    max_quantity: eligibility.copies,
                },
                vec![Open(DialogKind::Borrow)],
            ),
            (Self::ConfirmingDelete, DialogEvent::BorrowRequested(eligibility)) => (
                Self::ConfirmingBorrow {
                    max_quantity: eligibility.copies,
                },
                vec![Close(DialogKind::Delete), Open(DialogKind::Borrow)],
            ),
            (Self::ConfirmingBorrow { .. }, DialogEvent::BorrowRequested(eligibility)) => (
                Self::ConfirmingBorrow {
                    max_quantity: eligibility.copies,
                },
                vec![],
            ),

            // Commit
            (Self::ConfirmingDelete, DialogEvent::DeleteConfirmed) => (
                Self::Submitting(DialogKind::Delete),
                vec![DialogAction::ExecuteDelete],
            ),
            (
                Self::ConfirmingBorrow { .. },
                DialogEvent::BorrowConfirmed { quantity, due_date },
            ) => (
                Self::Submitting(DialogKind::Borrow),
                vec![DialogAction::ExecuteBorrow { quantity, due_date }],
            ),

            // Cancel
            (Self::ConfirmingDelete, DialogEvent::Cancelled) => {
                (Self::Idle, vec![Close(DialogKind::Delete)])
            }
            (Self::ConfirmingBorrow { .. }, DialogEvent::Cancelled) => {
                (Self::Idle, vec![Close(DialogKind::Borrow)])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// The dialog currently open, if any.
    pub fn open_dialog(&self) -> Option<DialogKind> {
        match self {
            Self::Idle => None,
            Self::ConfirmingDelete => Some(DialogKind::Delete),
            Self::ConfirmingBorrow { .. } => Some(DialogKind::Borrow),
            Self::Submitting(kind) => Some(*kind),
        }
    }

    /// Whether a mutation is in flight.
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELIGIBLE: Eligibility = Eligibility {
        copies: 3,
        available: true,
    };

    fn borrow_requested() -> DialogEvent {
        DialogEvent::BorrowRequested(ELIGIBLE)
    }

    #[test]
    fn starts_idle() {
        let dialog = CardDialog::new();
        assert_eq!(dialog, CardDialog::Idle);
        assert_eq!(dialog.open_dialog(), None);
    }

    #[test]
    fn delete_request_opens_confirmation() {
        let (state, actions) = CardDialog::Idle.on_event(DialogEvent::DeleteRequested);
        assert_eq!(state, CardDialog::ConfirmingDelete);
        assert_eq!(actions, vec![DialogAction::Open(DialogKind::Delete)]);
    }

    #[test]
    fn borrow_request_opens_borrow_dialog_with_max_quantity() {
        let (state, actions) = CardDialog::Idle.on_event(borrow_requested());
        assert_eq!(state, CardDialog::ConfirmingBorrow { max_quantity: 3 });
        assert_eq!(actions, vec![DialogAction::Open(DialogKind::Borrow)]);
    }

    // ===========================================
    // Mutual exclusion
    // ===========================================

    #[test]
    fn delete_from_borrow_closes_borrow_first() {
        let (state, _) = CardDialog::Idle.on_event(borrow_requested());
        let (state, actions) = state.on_event(DialogEvent::DeleteRequested);

        assert_eq!(state, CardDialog::ConfirmingDelete);
        assert_eq!(
            actions,
            vec![
                DialogAction::Close(DialogKind::Borrow),
                DialogAction::Open(DialogKind::Delete),
            ]
        );
    }

    #[test]
    fn borrow_from_delete_closes_delete_first() {
        let (state, _) = CardDialog::Idle.on_event(DialogEvent::DeleteRequested);
        let (state, actions) = state.on_event(borrow_requested());

        assert_eq!(state, CardDialog::ConfirmingBorrow { max_quantity: 3 });
        assert_eq!(
            actions,
            vec![
                DialogAction::Close(DialogKind::Delete),
                DialogAction::Open(DialogKind::Borrow),
            ]
        );
    }

    #[test]
    fn at_most_one_dialog_is_ever_open() {
        let events = [
            DialogEvent::DeleteRequested,
            borrow_requested(),
            DialogEvent::DeleteRequested,
            DialogEvent::Cancelled,
            borrow_requested(),
            borrow_requested(),
        ];

        let mut state = CardDialog::Idle;
        let mut open: Vec<DialogKind> = Vec::new();
        for event in events {
            let (next, actions) = state.on_event(event);
            for action in actions {
                match action {
                    DialogAction::Open(kind) => open.push(kind),
                    DialogAction::Close(kind) => open.retain(|k| *k != kind),
                    _ => {}
                }
                assert!(open.len() <= 1, "two dialogs open at once: {:?}", open);
            }
            assert_eq!(open.first().copied(), next.open_dialog());
            state = next;
        }
    }

    // ===========================================
    // Borrow guard
    // ===========================================

    #[test]
    fn borrow_refused_with_zero_copies() {
        let event = DialogEvent::BorrowRequested(Eligibility {
            copies: 0,
            available: true,
        });
        let (state, actions) = CardDialog::Idle.on_event(event);

        assert_eq!(state, CardDialog::Idle);
        assert_eq!(actions, vec![DialogAction::Notify(Notice::NotEligible)]);
    }

    #[test]
    fn borrow_refused_when_unavailable() {
        let event = DialogEvent::BorrowRequested(Eligibility {
            copies: 5,
            available: false,
        });
        let (state, actions) = CardDialog::ConfirmingDelete.on_event(event);

        assert_eq!(state, CardDialog::ConfirmingDelete);
        assert_eq!(actions, vec![DialogAction::Notify(Notice::NotEligible)]);
    }

    #[test]
    fn guard_uses_latest_snapshot() {
        let (state, _) = CardDialog::Idle.on_event(borrow_requested());
        let (state, _) = state.on_event(DialogEvent::Cancelled);

        // Data refreshed since the card was rendered: now out of stock
        let (state, actions) = state.on_event(DialogEvent::BorrowRequested(Eligibility {
            copies: 0,
            available: false,
        }));
        assert_eq!(state, CardDialog::Idle);
        assert_eq!(actions, vec![DialogAction::Notify(Notice::NotEligible)]);
    }

    #[test]
    fn notice_text() {
        assert_eq!(
            Notice::NotEligible.message(),
            "This book is not available for borrowing! Try another one."
        );
    }

    // ===========================================
    // Commit and cancel
    // ===========================================

    #[test]
    fn delete_confirm_executes_then_returns_to_idle() {
        let (state, _) = CardDialog::Idle.on_event(DialogEvent::DeleteRequested);
        let (state, actions) = state.on_event(DialogEvent::DeleteConfirmed);
        assert_eq!(state, CardDialog::Submitting(DialogKind::Delete));
        assert_eq!(actions, vec![DialogAction::ExecuteDelete]);

        let (state, actions) = state.on_event(DialogEvent::Completed);
        assert_eq!(state, CardDialog::Idle);
        assert_eq!(actions, vec![DialogAction::Close(DialogKind::Delete)]);
    }

    #[test]
    fn borrow_confirm_carries_quantity() {
        let due = NaiveDate::from_ymd_opt(2026, 11, 1);
        let (state, _) = CardDialog::Idle.on_event(borrow_requested());
        let (state, actions) = state.on_event(DialogEvent::BorrowConfirmed {
            quantity: 2,
            due_date: due,
        });

        assert!(state.is_submitting());
        assert_eq!(
            actions,
            vec![DialogAction::ExecuteBorrow {
                quantity: 2,
                due_date: due
            }]
        );
    }

    #[test]
    fn cancel_returns_to_idle_without_side_effects() {
        let (state, _) = CardDialog::Idle.on_event(borrow_requested());
        let (state, actions) = state.on_event(DialogEvent::Cancelled);

        assert_eq!(state, CardDialog::Idle);
        assert_eq!(actions, vec![DialogAction::Close(DialogKind::Borrow)]);
        let executes = |a: &DialogAction| {
            matches!(a, DialogAction::ExecuteBorrow { .. } | DialogAction::ExecuteDelete)
        };
        assert!(!actions.iter().any(executes));
    }

    #[test]
    fn requests_are_ignored_while_submitting() {
        let state = CardDialog::Submitting(DialogKind::Borrow);
        for event in [
            DialogEvent::DeleteRequested,
            borrow_requested(),
            DialogEvent::Cancelled,
            DialogEvent::DeleteConfirmed,
        ] {
            let (next, actions) = state.clone().on_event(event);
            assert_eq!(next, state);
            assert!(actions.is_empty());
        }
    }

    #[test]
    fn confirm_without_open_dialog_is_ignored() {
        let (state, actions) = CardDialog::Idle.on_event(DialogEvent::DeleteConfirmed);
        assert_eq!(state, CardDialog::Idle);
        assert!(actions.is_empty());

        let (state, actions) = CardDialog::ConfirmingDelete.on_event(DialogEvent::BorrowConfirmed {
            quantity: 1,
            due_date: None,
        });
        assert_eq!(state, CardDialog::ConfirmingDelete);
        assert!(actions.is_empty());
    }
}
