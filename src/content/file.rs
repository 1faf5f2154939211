// src/content/file.rs
// =============================================================================
// Content source that reads a JSON export from disk.
//
// Expected file shape (a JSON array):
//   [
//     { "id": 42, "title": "Hello", "permalink": "https://x/42",
//       "body": "<img src=...>", "status": "publish", "post_type": "post" }
//   ]
//
// "status" and "post_type" are optional. A missing status counts as
// published; a missing post type matches any requested type.
// =============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ContentItem, ContentSource, ItemId, PageQuery};
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct FileRecord {
    id: ItemId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    body: String,
    status: Option<String>,
    post_type: Option<String>,
}

impl FileRecord {
    fn matches(&self, query: &PageQuery) -> bool {
        let status = self.status.as_deref().unwrap_or("publish");
        let type_ok = self
            .post_type
            .as_deref()
            .map_or(true, |t| t == query.post_type);
        status == query.status && type_ok
    }
}

/// Content source backed by a JSON export file
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ContentSource for FileSource {
    async fn fetch_published(&self, query: &PageQuery) -> Result<Vec<ContentItem>, SourceError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        let records: Vec<FileRecord> =
            serde_json::from_slice(&raw).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let items: Vec<ContentItem> = records
            .into_iter()
            .filter(|record| record.matches(query))
            .skip(query.offset)
            .take(query.page_size)
            .map(|record| ContentItem::new(record.id, record.title, record.permalink, record.body))
            .collect();

        info!(count = items.len(), path = %self.path.display(), "loaded items from file");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn export(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_published_items_in_order() {
        let file = export(
            r#"[
                {"id": 1, "title": "One", "permalink": "https://x/1", "body": "a"},
                {"id": "two", "title": "Two", "permalink": "https://x/2", "body": "b", "status": "draft"},
                {"id": 3, "title": "Three", "permalink": "https://x/3", "body": "c", "status": "publish"}
            ]"#,
        );

        let items = FileSource::new(file.path())
            .fetch_published(&PageQuery::default())
            .await
            .unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_offset_and_page_size() {
        let file = export(
            r#"[
                {"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}, {"id": 5}
            ]"#,
        );

        let query = PageQuery {
            page_size: 2,
            offset: 1,
            ..PageQuery::default()
        };
        let items = FileSource::new(file.path()).fetch_published(&query).await.unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_post_type_filter() {
        let file = export(
            r#"[
                {"id": 1, "post_type": "page"},
                {"id": 2, "post_type": "post"},
                {"id": 3}
            ]"#,
        );

        let items = FileSource::new(file.path())
            .fetch_published(&PageQuery::default())
            .await
            .unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = FileSource::new("/definitely/not/here.json")
            .fetch_published(&PageQuery::default())
            .await;
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }

    #[tokio::test]
    async fn test_bad_json_is_an_error() {
        let file = export("{ not json");
        let result = FileSource::new(file.path())
            .fetch_published(&PageQuery::default())
            .await;
        assert!(matches!(result, Err(SourceError::Parse { .. })));
    }
}
