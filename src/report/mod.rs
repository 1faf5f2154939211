// src/report/mod.rs
// =============================================================================
// This module holds the scan's findings and writes them out.
//
// - ScanReport: item id -> BrokenItemRecord, in the order items were fetched
// - ReportSink: where a finished report goes (a file by default)
//
// Only items with at least one broken image are in the report. An item
// whose images all pass simply isn't there.
// =============================================================================

mod writer;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;

use crate::content::{ContentItem, ItemId};
use crate::error::ReportError;

pub use writer::{render_report, FileSink};

/// Broken images found in one content item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrokenItemRecord {
    /// Key in the report, not repeated inside the record
    #[serde(skip)]
    pub item_id: ItemId,
    #[serde(rename = "post_title")]
    pub title: String,
    #[serde(rename = "post_url")]
    pub permalink: String,
    /// In the order they appear in the body
    #[serde(rename = "broken_images")]
    pub broken_urls: Vec<String>,
}

impl BrokenItemRecord {
    // Builds a record for an item, or None when nothing is broken
    pub fn from_item(item: ContentItem, broken_urls: Vec<String>) -> Option<Self> {
        if broken_urls.is_empty() {
            return None;
        }
        Some(BrokenItemRecord {
            item_id: item.id,
            title: item.title,
            permalink: item.permalink,
            broken_urls,
        })
    }
}

/// The aggregate of one scan run
///
/// Serializes as a plain JSON object keyed by item id. Insertion order is
/// fetch order, and IndexMap keeps it when serializing, so two runs over the
/// same items produce the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScanReport {
    entries: IndexMap<ItemId, BrokenItemRecord>,
}

impl ScanReport {
    pub fn new() -> Self {
        ScanReport::default()
    }

    // Adds a record. A second record for the same item replaces the first
    // but keeps its position.
    pub fn insert(&mut self, record: BrokenItemRecord) {
        self.entries.insert(record.item_id.clone(), record);
    }

    pub fn get(&self, id: &ItemId) -> Option<&BrokenItemRecord> {
        self.entries.get(id)
    }

    pub fn records(&self) -> impl Iterator<Item = &BrokenItemRecord> {
        self.entries.values()
    }

    /// Number of items with broken images
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total broken image references across all items
    pub fn broken_count(&self) -> usize {
        self.entries.values().map(|r| r.broken_urls.len()).sum()
    }
}

/// Destination for a finished report
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persists the report, replacing any earlier one
    async fn write_report(&self, report: &ScanReport) -> Result<(), ReportError>;

    /// Human-readable location, used in the completion message
    fn location(&self) -> String;
}
