// src/report/writer.rs
// =============================================================================
// This module turns a ScanReport into bytes and puts them on disk.
//
// Output format:
//   {
//       "42": {
//           "post_title": "Hello",
//           "post_url": "https://x/42",
//           "broken_images": [
//               "https://bad/b.png"
//           ]
//       }
//   }
//
// - 4-space indentation, newline at the end
// - Non-ASCII text stays as-is (serde_json only escapes control chars,
//   quotes and backslashes)
// - '/' is never escaped, so URLs read naturally
//
// Writing goes to a temporary file next to the target, then a rename puts
// it in place. Readers never see a half-written report, and each run
// replaces the previous file instead of appending to it.
// =============================================================================

use async_trait::async_trait;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ReportSink, ScanReport};
use crate::error::ReportError;

// Renders the report exactly as it is written to disk
pub fn render_report(report: &ScanReport) -> Result<Vec<u8>, ReportError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    report.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Writes reports to a JSON file
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // broken_images.json -> .broken_images.json.tmp in the same directory,
    // so the final rename never crosses filesystems
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn io_error(&self, source: std::io::Error) -> ReportError {
        ReportError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn write_report(&self, report: &ScanReport) -> Result<(), ReportError> {
        let bytes = render_report(report)?;
        let temp = self.temp_path();

        if let Err(e) = tokio::fs::write(&temp, &bytes).await {
            return Err(self.io_error(e));
        }
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            // Don't leave the temp file behind
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(self.io_error(e));
        }

        info!(path = %self.path.display(), items = report.len(), "report written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentItem;
    use crate::report::BrokenItemRecord;
    use tempfile::TempDir;

    fn hello_report() -> ScanReport {
        let item = ContentItem::new(42u64, "Hello", "https://x/42", "");
        let mut report = ScanReport::new();
        report.insert(
            BrokenItemRecord::from_item(item, vec!["https://bad/b.png".to_string()]).unwrap(),
        );
        report
    }

    #[test]
    fn test_render_exact_layout() {
        let rendered = String::from_utf8(render_report(&hello_report()).unwrap()).unwrap();
        let expected = r#"{
    "42": {
        "post_title": "Hello",
        "post_url": "https://x/42",
        "broken_images": [
            "https://bad/b.png"
        ]
    }
}
"#;
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_empty_report() {
        let rendered = render_report(&ScanReport::new()).unwrap();
        assert_eq!(rendered, b"{}\n");
    }

    #[test]
    fn test_non_ascii_and_slashes_unescaped() {
        let item = ContentItem::new(1u64, "Café – 東京", "https://x/caf%C3%A9", "");
        let mut report = ScanReport::new();
        report.insert(
            BrokenItemRecord::from_item(item, vec!["https://x/ü/bild.png".to_string()]).unwrap(),
        );

        let rendered = String::from_utf8(render_report(&report).unwrap()).unwrap();
        assert!(rendered.contains("\"Café – 東京\""));
        assert!(rendered.contains("\"https://x/ü/bild.png\""));
        assert!(!rendered.contains("\\/"));
        assert!(!rendered.contains("\\u"));
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken_images.json");
        std::fs::write(&path, "old contents that are much longer than an empty report").unwrap();

        let sink = FileSink::new(&path);
        sink.write_report(&ScanReport::new()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
        // Only the report itself is left in the directory
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_write_twice_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        let sink = FileSink::new(&path);

        sink.write_report(&hello_report()).await.unwrap();
        let first = std::fs::read(&path).unwrap();
        sink.write_report(&hello_report()).await.unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unwritable_location() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(dir.path().join("missing-dir").join("report.json"));

        let result = sink.write_report(&ScanReport::new()).await;
        assert!(matches!(result, Err(ReportError::Io { .. })));
    }
}
