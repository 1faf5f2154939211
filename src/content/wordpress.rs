// src/content/wordpress.rs
// =============================================================================
// This module fetches published posts from a WordPress site.
//
// Strategy:
// - Turn the site URL into the REST API root (https://site/wp-json/wp/v2/)
// - Ask the collection endpoint for posts (or pages, or a custom type)
// - Only request the fields we need (_fields=id,title,link,content)
//
// WordPress caps per_page at 100, so a page of 500 items takes several
// requests with an advancing offset. We stop early when the site runs out
// of posts (X-WP-Total header, or a short batch).
//
// No authentication: we only read what the public API shows, which means
// content.rendered rather than the raw editor content.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{ContentItem, ContentSource, ItemId, PageQuery};
use crate::error::SourceError;

// Hard limit enforced by the WordPress REST API
const MAX_PER_REQUEST: usize = 100;

// Shape of one entry in /wp-json/wp/v2/posts
#[derive(Debug, Deserialize)]
struct WpPost {
    id: ItemId,
    link: String,
    title: Rendered,
    content: Rendered,
}

#[derive(Debug, Deserialize)]
struct Rendered {
    rendered: String,
}

impl WpPost {
    fn into_item(self) -> ContentItem {
        ContentItem {
            id: self.id,
            title: decode_title(&self.title.rendered),
            permalink: self.link,
            body: self.content.rendered,
        }
    }
}

/// Content source backed by the WordPress REST API
pub struct WordPressSource {
    client: Client,
    api_root: Url,
}

impl WordPressSource {
    // Creates a source for a site
    //
    // Parameters:
    //   site_url: the site's home URL (e.g. "https://blog.example.com")
    //   timeout: per-request timeout for listing calls
    //   user_agent: User-Agent header to send
    pub fn new(site_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, SourceError> {
        let api_root = api_root(site_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(WordPressSource { client, api_root })
    }

    fn collection_url(&self, post_type: &str) -> Result<Url, SourceError> {
        self.api_root
            .join(rest_base(post_type))
            .map_err(|e| SourceError::InvalidUrl {
                url: self.api_root.to_string(),
                reason: e.to_string(),
            })
    }

    // Fetches one batch; also returns X-WP-Total when the site sends it
    async fn fetch_batch(
        &self,
        url: &Url,
        per_page: usize,
        offset: usize,
        status: &str,
    ) -> Result<(Vec<WpPost>, Option<usize>), SourceError> {
        debug!(%url, per_page, offset, "fetching WordPress batch");

        let response = self
            .client
            .get(url.clone())
            .query(&[
                ("per_page", per_page.to_string()),
                ("offset", offset.to_string()),
                ("status", status.to_string()),
                ("_fields", "id,title,link,content".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let total = response
            .headers()
            .get("x-wp-total")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());

        let posts = response.json::<Vec<WpPost>>().await?;
        Ok((posts, total))
    }
}

#[async_trait]
impl ContentSource for WordPressSource {
    async fn fetch_published(&self, query: &PageQuery) -> Result<Vec<ContentItem>, SourceError> {
        let url = self.collection_url(&query.post_type)?;

        let mut items = Vec::with_capacity(query.page_size.min(MAX_PER_REQUEST));
        let mut offset = query.offset;

        while items.len() < query.page_size {
            let per_page = (query.page_size - items.len()).min(MAX_PER_REQUEST);
            let (batch, total) = self.fetch_batch(&url, per_page, offset, &query.status).await?;

            let received = batch.len();
            items.extend(batch.into_iter().map(WpPost::into_item));
            offset += received;

            // Asking past the last post makes WordPress answer 400, so don't
            if received < per_page || total.is_some_and(|total| offset >= total) {
                break;
            }
        }

        info!(count = items.len(), post_type = %query.post_type, "fetched WordPress items");
        Ok(items)
    }
}

// Builds the REST API root from a site URL
//
// Examples:
//   "https://blog.example.com"      -> "https://blog.example.com/wp-json/wp/v2/"
//   "https://example.com/blog"      -> "https://example.com/blog/wp-json/wp/v2/"
fn api_root(site_url: &str) -> Result<Url, SourceError> {
    let invalid = |reason: &str| SourceError::InvalidUrl {
        url: site_url.to_string(),
        reason: reason.to_string(),
    };

    let mut site = Url::parse(site_url).map_err(|e| invalid(&e.to_string()))?;
    if site.scheme() != "http" && site.scheme() != "https" {
        return Err(invalid("only http and https sites are supported"));
    }

    // Url::join replaces the last path segment unless the path ends in '/'
    if !site.path().ends_with('/') {
        let path = format!("{}/", site.path());
        site.set_path(&path);
    }
    site.set_query(None);
    site.set_fragment(None);

    site.join("wp-json/wp/v2/")
        .map_err(|e| invalid(&e.to_string()))
}

// Maps a post type to its REST collection
fn rest_base(post_type: &str) -> &str {
    match post_type {
        "post" => "posts",
        "page" => "pages",
        other => other,
    }
}

// title.rendered is HTML ("Caf&eacute; &#8211; Menu"); the report wants text
fn decode_title(rendered: &str) -> String {
    let fragment = Html::parse_fragment(rendered);
    fragment.root_element().text().collect::<String>().trim().to_string()
}
