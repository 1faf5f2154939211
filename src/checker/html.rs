// src/checker/html.rs
// =============================================================================
// This module extracts image URLs from HTML post bodies.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Because html5ever parses like a browser does, we get a few things for free:
// - <IMG SRC=...> and <img src=...> are the same element
// - 'single', "double" and unquoted attribute values all work
// - Broken markup never makes us fail, it just yields fewer images
//
// One thing html5ever does NOT give us: it parses with scripting on, so the
// inside of <noscript> is plain text. Lazy-loading plugins put the real <img>
// there, so that text is parsed again as its own fragment.
//
// We do NOT validate the URLs here. Relative paths, //cdn/... and data: URIs
// come out exactly as written. The checker decides what it can request.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Extracts the src of every <img> element, in document order
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//
// Returns: Vec<String> with one entry per <img>, duplicates kept
//
// Example:
//   html = r#"<p><img src="/a.png"><IMG alt='x' SRC='https://b/c.png'></p>"#
//   result = ["/a.png", "https://b/c.png"]
pub fn extract_html_images(html: &str) -> Vec<String> {
    // A post body is a fragment, not a whole document
    let fragment = Html::parse_fragment(html);

    // Constant selector, known to be valid
    let selector = Selector::parse("img[src], noscript").unwrap();

    let mut images = Vec::new();
    for element in fragment.select(&selector) {
        if element.value().name() == "noscript" {
            let inner: String = element.text().collect();
            images.extend(extract_html_images(&inner));
            continue;
        }

        if let Some(src) = element.value().attr("src") {
            // <img src=""> has nothing to check
            if !src.trim().is_empty() {
                images.push(src.to_string());
            }
        }
    }
    images
}

// Resolves a possibly-relative image reference against a base URL
//
// Parameters:
//   base: the site URL relative references belong to
//   reference: the src value as written in the post
//
// Returns: Some(absolute_url) or None if it can't be resolved
//
// Examples:
//   base = "https://blog.example/"
//   reference = "/uploads/a.png"     -> Some("https://blog.example/uploads/a.png")
//   reference = "//cdn.example/b.png" -> Some("https://cdn.example/b.png")
//   reference = "https://other/c.png" -> Some("https://other/c.png")
pub fn resolve_reference(base: &Url, reference: &str) -> Option<String> {
    // Absolute URLs parse on their own; everything else is joined to base
    match Url::parse(reference) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(reference).ok().map(|url| url.to_string()),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. parse_fragment vs parse_document?
//    - parse_document expects a full page (<html><head>...)
//    - Post content is just a piece of a page, so parse_fragment is the
//      honest choice. Both are forgiving about broken markup.
//
// 2. What does "img[src]" mean?
//    - "all <img> tags that have a src attribute"
//    - Tags without src are skipped entirely
//    - ", noscript" adds a second selector; a match on either is returned
//
// 3. Why can extract_html_images call itself?
//    - The text inside <noscript> is markup that was never parsed
//    - Each call works on a smaller string, so the recursion ends
//
// 4. Why does order matter?
//    - The report lists broken images in the order they appear in the post
//    - select() walks the DOM in document order, so we keep that order
// -----------------------------------------------------------------------------
