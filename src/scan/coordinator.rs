// src/scan/coordinator.rs
// =============================================================================
// This module runs a scan from start to finish.
//
// How it works:
// 1. Fetch one page of published items from the source
// 2. For each item, extract its image references
// 3. Check every reference (concurrently, but bounded)
// 4. Collect the references that failed into a BrokenItemRecord
// 5. Hand the finished report to the sink, once
//
// Concurrency without changing the answer:
// - `buffered` (not `buffer_unordered`) yields results in the order the
//   work was submitted, whatever order the network answers in
// - so each item's broken list is in body order, and items are folded into
//   the report in fetch order
// - a semaphore caps the number of probes in flight across ALL items
//
// Politeness:
// - an optional delay before each item after the first, to go easy on the
//   image host
// =============================================================================

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::checker::{
    extract_image_urls, resolve_reference, BodyFormat, CheckSettings, ReachabilityChecker,
    ReachabilityResult,
};
use crate::content::{ContentItem, ContentSource, PageQuery};
use crate::error::ScanError;
use crate::report::{BrokenItemRecord, ReportSink, ScanReport};

/// Everything that shapes a scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Which page of items to fetch
    pub page: PageQuery,
    /// Timeout, redirects and pass criterion for each probe
    pub check: CheckSettings,
    /// Max probes in flight at once, across all items
    pub concurrency: usize,
    /// Max items being checked at once
    pub item_concurrency: usize,
    /// Pause before each item after the first
    pub inter_item_delay: Option<Duration>,
    pub body_format: BodyFormat,
    /// Relative references are resolved against this before probing
    pub base_url: Option<Url>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            page: PageQuery::default(),
            check: CheckSettings::default(),
            concurrency: 8,
            item_concurrency: 1,
            inter_item_delay: None,
            body_format: BodyFormat::Html,
            base_url: None,
        }
    }
}

/// Runs scans with one shared HTTP client
pub struct Scanner {
    checker: ReachabilityChecker,
    options: ScanOptions,
    permits: Semaphore,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Result<Self, ScanError> {
        let checker = ReachabilityChecker::new(&options.check).map_err(ScanError::Client)?;
        let permits = Semaphore::new(options.concurrency.max(1));
        Ok(Scanner {
            checker,
            options,
            permits,
        })
    }

    // Fetch, check, write
    //
    // Returns the report that was written. A fetch failure stops the run
    // before any probe; a write failure loses the run's work.
    pub async fn run(
        &self,
        source: &dyn ContentSource,
        sink: &dyn ReportSink,
    ) -> Result<ScanReport, ScanError> {
        let items = source
            .fetch_published(&self.options.page)
            .await
            .map_err(ScanError::Fetch)?;

        info!(
            items = items.len(),
            concurrency = self.options.concurrency,
            criterion = %self.options.check.criterion,
            "starting scan"
        );

        let report = self.scan_items(items).await;

        sink.write_report(&report).await.map_err(ScanError::Write)?;

        info!(
            broken_items = report.len(),
            broken_images = report.broken_count(),
            "scan finished"
        );
        Ok(report)
    }

    // Checks a list of items and builds the report, without any I/O besides
    // the probes themselves
    pub async fn scan_items(&self, items: Vec<ContentItem>) -> ScanReport {
        let delay = self.options.inter_item_delay.filter(|d| !d.is_zero());

        // `then` runs one at a time, so the delay spaces out item starts
        let records: Vec<Option<BrokenItemRecord>> = stream::iter(items.into_iter().enumerate())
            .then(move |(index, item)| async move {
                if let Some(delay) = delay {
                    if index > 0 {
                        tokio::time::sleep(delay).await;
                    }
                }
                item
            })
            .map(|item| self.scan_item(item))
            .buffered(self.options.item_concurrency.max(1))
            .collect()
            .await;

        // Join-then-fold: the report is only touched here, in fetch order
        let mut report = ScanReport::new();
        for record in records.into_iter().flatten() {
            report.insert(record);
        }
        report
    }

    async fn scan_item(&self, item: ContentItem) -> Option<BrokenItemRecord> {
        let references = extract_image_urls(&item.body, self.options.body_format);

        if references.is_empty() {
            debug!(id = %item.id, "no images");
            return None;
        }

        let results: Vec<ReachabilityResult> = stream::iter(references.iter())
            .map(|reference| self.check_reference(reference))
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let broken: Vec<String> = results
            .into_iter()
            .filter(|result| !result.reachable)
            .map(|result| result.url)
            .collect();

        if broken.is_empty() {
            debug!(id = %item.id, images = references.len(), "all images reachable");
        } else {
            warn!(
                id = %item.id,
                title = %item.title,
                broken = broken.len(),
                images = references.len(),
                "broken images found"
            );
        }

        BrokenItemRecord::from_item(item, broken)
    }

    // Checks one reference as written in the body. The result always
    // carries the raw reference, even when a base URL was used to resolve it.
    async fn check_reference(&self, reference: &str) -> ReachabilityResult {
        // The semaphore is never closed, so acquire() can't fail
        let _permit = self.permits.acquire().await.ok();

        let target = match &self.options.base_url {
            Some(base) => {
                resolve_reference(base, reference).unwrap_or_else(|| reference.to_string())
            }
            None => reference.to_string(),
        };

        let mut result = self.checker.check(&target).await;
        if let Some(error) = &result.error {
            debug!(reference, target = %target, %error, "image check failed");
        }
        result.url = reference.to_string();
        result
    }
}

// Single entry point for any trigger (CLI, cron job, ...)
pub async fn run_scan(
    source: &dyn ContentSource,
    sink: &dyn ReportSink,
    options: ScanOptions,
) -> Result<ScanReport, ScanError> {
    Scanner::new(options)?.run(source, sink).await
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. buffered vs buffer_unordered?
//    - Both run up to N futures at once
//    - buffer_unordered hands back results as they finish (fast first)
//    - buffered hands them back in the original order
//    - The report must not depend on network timing, so we use buffered
//
// 2. Why a Semaphore as well?
//    - buffered(N) limits probes per item
//    - With several items in flight, the totals would add up
//    - The semaphore is the global cap: a probe waits for a permit
//
// 3. What is `.flatten()` on Vec<Option<_>>?
//    - Option is iterable (zero or one element)
//    - flatten() skips the None values, i.e. items with nothing broken
// -----------------------------------------------------------------------------
