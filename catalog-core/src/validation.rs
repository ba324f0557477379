//! Field-level validation errors.
//!
//! Two sources feed the same [`FieldErrors`] map:
//! - [`map_validation_error`] reads a server error payload.
//! - [`validate_draft`] and [`validate_borrow`] check input before any
//!   request is sent.
//!
//! A [`FormErrors`] holds the messages a form currently displays.

use bookify_types::BookDraft;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;

/// Earliest accepted publication year.
pub const MIN_PUBLISHED_YEAR: i32 = 1600;

/// Error `name` the service uses for field validation failures.
const VALIDATION_ERROR_NAME: &str = "ValidationError";

/// Field name to human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, replacing any previous one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Message for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether no field has an error.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Fields and messages, ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// One-line-per-field text for a single notification.
    pub fn summary(&self) -> String {
        let mut out = String::from("Validation failed:");
        for (_, message) in self.iter() {
            out.push('\n');
            out.push_str(message);
        }
        out
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Extract field errors from a server error payload.
///
/// Recognizes `{ "error": { "name": "ValidationError", "errors": { field: { "message": .. } } } }`.
/// Returns `None` for any other shape, including malformed ones, so the caller
/// falls back to a generic message. Entries without a string message are
/// skipped; if none remain the result is `None`.
pub fn map_validation_error(payload: &Value) -> Option<FieldErrors> {
    let error = payload.get("error")?.as_object()?;
    if error.get("name")?.as_str()? != VALIDATION_ERROR_NAME {
        return None;
    }

    let errors: FieldErrors = error
        .get("errors")?
        .as_object()?
        .iter()
        .filter_map(|(field, detail)| {
            let message = detail.get("message")?.as_str()?;
            Some((field.clone(), message.to_string()))
        })
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}

/// Whether a draft is for a new book or an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    /// New book; needs at least one copy.
    Create,
    /// Existing book; zero copies allowed.
    Update,
}

/// Check a draft before sending it.
///
/// Field names match the wire names so server and client errors land on the
/// same form fields.
pub fn validate_draft(
    draft: &BookDraft,
    kind: DraftKind,
    today: NaiveDate,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.title.trim().is_empty() {
        errors.insert("title", "Title is required");
    }
    if draft.author.trim().is_empty() {
        errors.insert("author", "Author is required");
    }
    if draft.isbn.trim().is_empty() {
        errors.insert("isbn", "ISBN is required");
    }
    if draft.description.trim().is_empty() {
        errors.insert("description", "Description is required");
    }
    if kind == DraftKind::Create && draft.copies == 0 {
        errors.insert("copies", "At least one copy is required");
    }
    if let Some(year) = draft.published_year {
        let current = today.year();
        if !(MIN_PUBLISHED_YEAR..=current).contains(&year) {
            errors.insert(
                "publishedYear",
                format!(
                    "Publication year must be between {} and {}",
                    MIN_PUBLISHED_YEAR, current
                ),
            );
        }
    }

    errors.into_result()
}

/// Check a borrow quantity and due date against the copies on hand.
pub fn validate_borrow(
    quantity: u32,
    copies: u32,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if quantity == 0 {
        errors.insert("quantity", "Quantity must be at least 1");
    } else if quantity > copies {
        errors.insert("quantity", format!("Only {copies} copies available"));
    }
    if let Some(due) = due_date {
        if due < today {
            errors.insert("dueDate", "Due date cannot be in the past");
        }
    }

    errors.into_result()
}

/// Messages currently attached to a form's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: FieldErrors,
}

impl FormErrors {
    /// A form with no errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach every message in `errors`, replacing messages for the same fields.
    pub fn apply(&mut self, errors: &FieldErrors) {
        for (field, message) in errors.iter() {
            self.fields.insert(field, message);
        }
    }

    /// The user edited a field; its message no longer applies.
    pub fn clear_field(&mut self, field: &str) {
        self.fields.0.remove(field);
    }

    /// Drop every message (successful submit).
    pub fn clear(&mut self) {
        self.fields = FieldErrors::new();
    }

    /// Message shown under a field.
    pub fn message(&self, field: &str) -> Option<&str> {
        self.fields.get(field)
    }

    /// Whether any field has a message.
    pub fn has_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Every field message.
    pub fn fields(&self) -> &FieldErrors {
        &self.fields
    }
}
