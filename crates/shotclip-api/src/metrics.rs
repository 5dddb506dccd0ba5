//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "shotclip_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "shotclip_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "shotclip_http_requests_in_flight";

    // Extraction metrics
    pub const UPLOAD_BYTES: &str = "shotclip_upload_bytes";
    pub const TRANSCODE_DURATION_SECONDS: &str = "shotclip_transcode_duration_seconds";
    pub const CLIPS_EXTRACTED_TOTAL: &str = "shotclip_clips_extracted_total";
    pub const EXTRACTION_FAILURES_TOTAL: &str = "shotclip_extraction_failures_total";
    pub const STAGING_CLEANUP_FAILURES_TOTAL: &str = "shotclip_staging_cleanup_failures_total";

    // Archive metrics
    pub const CLIPS_ARCHIVED_TOTAL: &str = "shotclip_clips_archived_total";
    pub const ARCHIVED_BYTES: &str = "shotclip_archived_bytes";
    pub const ARCHIVE_FAILURES_TOTAL: &str = "shotclip_archive_failures_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "shotclip_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", route_label(path).to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the size of a staged upload.
pub fn record_upload_bytes(bytes: u64) {
    histogram!(names::UPLOAD_BYTES).record(bytes as f64);
}

/// Record how long the transcoder ran.
pub fn record_transcode_duration(duration_secs: f64) {
    histogram!(names::TRANSCODE_DURATION_SECONDS).record(duration_secs);
}

/// Record a successfully extracted clip.
pub fn record_clip_extracted() {
    counter!(names::CLIPS_EXTRACTED_TOTAL).increment(1);
}

/// Record a failed extraction by failure kind.
pub fn record_extraction_failure(kind: &'static str) {
    counter!(names::EXTRACTION_FAILURES_TOTAL, "kind" => kind).increment(1);
}

/// Record a staged upload that could not be deleted.
pub fn record_staging_cleanup_failure() {
    counter!(names::STAGING_CLEANUP_FAILURES_TOTAL).increment(1);
}

/// Record a clip written to the archive bucket.
pub fn record_clip_archived(bytes: u64) {
    counter!(names::CLIPS_ARCHIVED_TOTAL).increment(1);
    histogram!(names::ARCHIVED_BYTES).record(bytes as f64);
}

/// Record a failed archive write.
pub fn record_archive_failure() {
    counter!(names::ARCHIVE_FAILURES_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", route_label(endpoint).to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse request paths to the known routes so arbitrary URLs cannot blow up
/// label cardinality.
fn route_label(path: &str) -> &'static str {
    match path {
        "/api/extract-clip" => "/api/extract-clip",
        "/api/upload" => "/api/upload",
        "/health" => "/health",
        "/healthz" => "/healthz",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        _ => "other",
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
