// src/checker/markdown.rs
// =============================================================================
// This module extracts image URLs from Markdown post bodies.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, image, etc.)
// - Follows the CommonMark specification
// - Is fast and memory-efficient (it's a streaming parser)
//
// Markdown posts often mix both styles:
//   ![diagram](https://x/diagram.png)
//   <img src="https://x/photo.jpg" width="300">
// so raw HTML events are handed to the HTML extractor. Events arrive in
// document order, which keeps the image order intact.
// =============================================================================

use pulldown_cmark::{Event, Parser, Tag};

use super::html::extract_html_images;

// Extracts all image URLs from Markdown text
//
// Example input:
//   "Intro ![logo](https://x/logo.png) then <img src='/y.png'>"
//
// Example output:
//   vec!["https://x/logo.png", "/y.png"]
pub fn extract_markdown_images(markdown: &str) -> Vec<String> {
    let mut images = Vec::new();
    // An HTML block arrives one line per event, so a tag spread over
    // several lines is only whole once the run of Html events ends
    let mut html_run = String::new();

    for event in Parser::new(markdown) {
        if let Event::Html(html) = &event {
            html_run.push_str(html);
            continue;
        }
        flush_html(&mut html_run, &mut images);

        // In pulldown-cmark 0.9, Image is Tag::Image(link_type, dest_url, title)
        if let Event::Start(Tag::Image(_link_type, dest_url, _title)) = event {
            if !dest_url.trim().is_empty() {
                images.push(dest_url.to_string());
            }
        }
    }
    flush_html(&mut html_run, &mut images);

    images
}

fn flush_html(html_run: &mut String, images: &mut Vec<String>) {
    if !html_run.is_empty() {
        images.extend(extract_html_images(html_run));
        html_run.clear();
    }
}
