//! Metrics definitions for the feed services.
//!
//! This module defines all metrics used throughout the feed pipeline.
//! Metrics are collected using the `metrics` crate and can be exported
//! to Prometheus via `metrics-exporter-prometheus`.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "pages_served_total",
        "Total number of feed pages served"
    );
    describe_counter!(
        "boundary_probes_total",
        "Total number of existence probes issued to compute page info"
    );
    describe_counter!(
        "bad_cursor_total",
        "Total number of cursors that failed to decode"
    );
    describe_counter!(
        "messages_created_total",
        "Total number of messages created"
    );
    describe_counter!(
        "feed_requests_rejected_total",
        "Total number of pagination or mutation requests rejected"
    );
    describe_histogram!(
        "page_fetch_duration_seconds",
        "Time taken to fetch and assemble a feed page in seconds"
    );
}

/// Record a served page.
///
/// # Arguments
/// * `direction` - The scan direction ("older" or "newer")
pub fn record_page_served(direction: &str) {
    counter!("pages_served_total", "direction" => direction.to_string()).increment(1);
}

/// Record a created message.
pub fn record_message_created() {
    counter!("messages_created_total").increment(1);
}

/// Record a rejected request.
///
/// # Arguments
/// * `operation` - The rejected operation ("page" or "create")
pub fn record_request_rejected(operation: &str) {
    counter!("feed_requests_rejected_total", "operation" => operation.to_string()).increment(1);
}

/// Record page fetch duration.
pub fn record_page_fetch_duration(duration_secs: f64) {
    histogram!("page_fetch_duration_seconds").record(duration_secs);
}

/// A timer that automatically records duration when dropped.
pub struct PageTimer {
    start: Instant,
}

impl PageTimer {
    /// Start a new page timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for PageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PageTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_page_fetch_duration(duration);
    }
}
