//! Response envelopes and list ordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// `{ data: T }` wrapper used by single-entity and mutation responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    /// The payload.
    pub data: T,
}

/// Pagination metadata reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            total: 0,
            total_pages: 1,
        }
    }
}

/// One page of a collection: `{ data: [...], meta: { total, totalPages } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order.
    pub data: Vec<T>,
    /// Collection-wide metadata.
    #[serde(default)]
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page has no items.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Field a book list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Creation time.
    #[default]
    CreatedAt,
    /// Title.
    Title,
    /// Author.
    Author,
}

impl SortField {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Title => "title",
            SortField::Author => "author",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "createdat" | "created_at" | "created" => Ok(SortField::CreatedAt),
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            _ => Err(TypesError::UnknownSortField(s.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            _ => Err(TypesError::UnknownSortOrder(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_decodes_list_response() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"data":[1,2,3],"meta":{"total":25,"totalPages":9}}"#)
                .unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.total_pages, 9);
    }

    #[test]
    fn missing_meta_defaults_to_single_page() {
        let page: Page<u32> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.meta, PageMeta::default());
        assert_eq!(page.meta.total_pages, 1);
    }

    #[test]
    fn sort_parsing() {
        assert_eq!("createdAt".parse::<SortField>().unwrap(), SortField::CreatedAt);
        assert_eq!("Title".parse::<SortField>().unwrap(), SortField::Title);
        assert_eq!("ascending".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
