// src/content/item.rs
// =============================================================================
// The data we get from a content source.
//
// A ContentItem is read-only input: we fetch it once per scan and never
// change it. The scan only ever reads its body and copies title/permalink
// into the report.
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier of a content item
///
/// WordPress hands out numbers, export files might use strings. Either way
/// we carry it as text, because it ends up as a JSON object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        ItemId(id)
    }
}

// Accepts both `42` and `"42"`
impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => ItemId::from(n),
            RawId::Text(s) => ItemId(s),
        })
    }
}

/// One published piece of content
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: ItemId,
    pub title: String,
    pub permalink: String,
    /// Raw markup (HTML, or Markdown for Markdown sources)
    pub body: String,
}

impl ContentItem {
    pub fn new(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        permalink: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        ContentItem {
            id: id.into(),
            title: title.into(),
            permalink: permalink.into(),
            body: body.into(),
        }
    }
}

/// Which page of items to fetch
///
/// One scan reads exactly one page. Walking several pages is left to the
/// caller (run the scan again with a bigger offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// "post", "page", or a custom post type
    pub post_type: String,
    /// Maximum number of items in the page
    pub page_size: usize,
    /// Number of items to skip before the page starts
    pub offset: usize,
    /// Publication status to ask for (always "publish" from the CLI)
    pub status: String,
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            post_type: "post".to_string(),
            page_size: 500,
            offset: 0,
            status: "publish".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_from_number_and_string() {
        let from_number: ItemId = serde_json::from_str("42").unwrap();
        let from_string: ItemId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "42");
    }

    #[test]
    fn test_item_id_serializes_as_string() {
        let id = ItemId::from(7u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn test_default_page_query() {
        let query = PageQuery::default();
        assert_eq!(query.page_size, 500);
        assert_eq!(query.offset, 0);
        assert_eq!(query.status, "publish");
    }
}
