// src/scan/mod.rs
// =============================================================================
// This module coordinates a scan.
//
// Features:
// - Fetches one page of published items from a ContentSource
// - Checks every embedded image with a bounded number of probes in flight
// - Keeps the report's order identical to a one-at-a-time scan
// - Optional delay between items to throttle requests
// - Writes the report through a ReportSink exactly once
// =============================================================================

mod coordinator;

pub use coordinator::{run_scan, ScanOptions};
