// src/content/mod.rs
// =============================================================================
// This module is where content items come from.
//
// The scan doesn't care whether posts live in WordPress or in an export
// file. It only needs "give me one page of published items", which is the
// ContentSource trait below.
//
// Sources:
// - wordpress: the WordPress REST API (wp-json/wp/v2)
// - file: a JSON export on disk
// =============================================================================

mod file;
mod item;
mod wordpress;

use async_trait::async_trait;

use crate::error::SourceError;

pub use file::FileSource;
pub use item::{ContentItem, ItemId, PageQuery};
pub use wordpress::WordPressSource;

/// Anything that can list published content items
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches one page of items, in the backend's order
    async fn fetch_published(&self, query: &PageQuery) -> Result<Vec<ContentItem>, SourceError>;
}

// A plain list of items is a source too. Handy for tests and for callers
// that already have the items in memory.
#[async_trait]
impl ContentSource for Vec<ContentItem> {
    async fn fetch_published(&self, query: &PageQuery) -> Result<Vec<ContentItem>, SourceError> {
        Ok(self
            .iter()
            .skip(query.offset)
            .take(query.page_size)
            .cloned()
            .collect())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - Traits with async methods used behind `dyn` need boxing
//    - The async-trait macro rewrites `async fn` into a method returning
//      Pin<Box<dyn Future + Send>>
//    - That lets main.rs pick a source at runtime: Box<dyn ContentSource>
//
// 2. Why Send + Sync?
//    - tokio may move our futures between threads
//    - Anything the futures borrow must be safe to share
// -----------------------------------------------------------------------------
