//! Metrics instrumentation for Firestore operations.

use metrics::{counter, histogram};

/// Metric names.
pub mod names {
    pub const FIRESTORE_REQUESTS_TOTAL: &str = "firestore_requests_total";
    pub const FIRESTORE_REQUEST_LATENCY_MS: &str = "firestore_request_latency_ms";
    pub const FIRESTORE_RETRIES_TOTAL: &str = "firestore_retries_total";
}

/// Record a completed Firestore request with its resolved HTTP status.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::FIRESTORE_REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        names::FIRESTORE_REQUEST_LATENCY_MS,
        "operation" => operation.to_string(),
    )
    .record(latency_ms);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::FIRESTORE_RETRIES_TOTAL,
        "operation" => operation.to_string(),
    )
    .increment(1);
}
