//! Books and their editable subset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BookId, TypesError};

/// Genre of a book, as stored by the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    /// Fiction
    Fiction,
    /// Non-fiction
    NonFiction,
    /// Science
    Science,
    /// History
    History,
    /// Biography
    Biography,
    /// Fantasy
    Fantasy,
}

impl Genre {
    /// Every genre, in display order.
    pub const ALL: [Genre; 6] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Science,
        Genre::History,
        Genre::Biography,
        Genre::Fantasy,
    ];

    /// Wire representation (`"NON_FICTION"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "FICTION",
            Genre::NonFiction => "NON_FICTION",
            Genre::Science => "SCIENCE",
            Genre::History => "HISTORY",
            Genre::Biography => "BIOGRAPHY",
            Genre::Fantasy => "FANTASY",
        }
    }

    /// Human-readable label (`"Non-Fiction"`).
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Science => "Science",
            Genre::History => "History",
            Genre::Biography => "Biography",
            Genre::Fantasy => "Fantasy",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = TypesError;

    /// Accepts the wire form and the label, case-insensitively
    /// (`NON_FICTION`, `non-fiction`, `Non Fiction`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| TypesError::UnknownGenre(s.to_string()))
    }
}

/// A catalog entry as returned by the service.
///
/// `created_at`/`updated_at` are server-assigned and never sent back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Genre.
    pub genre: Genre,
    /// ISBN, free-form.
    pub isbn: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Year of publication, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// Number of copies the library holds.
    pub copies: u32,
    /// Availability flag maintained by the server. Advisory only, see [`Book::is_borrowable`].
    pub available: bool,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Whether the book can be borrowed right now.
    ///
    /// Zero copies means not borrowable even when the server flag says available.
    pub fn is_borrowable(&self) -> bool {
        self.copies > 0 && self.available
    }

    /// The editable subset of this book, for pre-filling an edit form.
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            genre: self.genre,
            isbn: self.isbn.clone(),
            description: self.description.clone(),
            published_year: self.published_year,
            copies: self.copies,
            available: self.available,
            image: self.image.clone().filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Fields a form may create or edit.
///
/// Never carries the identifier or timestamps; the identifier travels in the
/// request path for updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    /// Title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Genre.
    pub genre: Genre,
    /// ISBN.
    pub isbn: String,
    /// Description.
    pub description: String,
    /// Year of publication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// Number of copies.
    pub copies: u32,
    /// Availability flag.
    pub available: bool,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Default for BookDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            genre: Genre::Fiction,
            isbn: String::new(),
            description: String::new(),
            published_year: None,
            copies: 1,
            available: true,
            image: None,
        }
    }
}
