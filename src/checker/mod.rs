// src/checker/mod.rs
// =============================================================================
// This module contains the per-URL work of a scan.
//
// Submodules:
// - html: Extracts <img> sources from HTML bodies
// - markdown: Extracts images from Markdown bodies
// - http: Checks whether an image URL is reachable
//
// This file ties them together: extract_image_urls() picks the right
// extractor for a body format.
// =============================================================================

mod html;
mod http;
mod markdown;

use serde::{Deserialize, Serialize};

pub use html::{extract_html_images, resolve_reference};
pub use http::{CheckSettings, PassCriterion, ReachabilityChecker, ReachabilityResult};
pub use markdown::extract_markdown_images;

/// Markup flavour of content bodies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    /// HTML (WordPress post content)
    #[default]
    Html,
    /// CommonMark, with raw HTML allowed inside
    Markdown,
}

// Extracts the image references of one body, in document order
//
// Never fails: anything unparseable just yields fewer (or zero) URLs.
pub fn extract_image_urls(body: &str, format: BodyFormat) -> Vec<String> {
    match format {
        BodyFormat::Html => extract_html_images(body),
        BodyFormat::Markdown => extract_markdown_images(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dispatch() {
        let html = r#"<img src="/a.png">"#;
        assert_eq!(extract_image_urls(html, BodyFormat::Html), vec!["/a.png"]);

        let markdown = "![a](/a.png)";
        assert_eq!(extract_image_urls(markdown, BodyFormat::Markdown), vec!["/a.png"]);
        assert!(extract_image_urls(markdown, BodyFormat::Html).is_empty());
    }
}
