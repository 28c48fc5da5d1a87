//! Metrics definitions for the media control plane.
//!
//! All metrics follow Prometheus naming conventions:
//! - `media_` prefix for this service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! Labels are bounded to prevent cardinality explosion: `kind` has two
//! values (audio, video), `direction` two (send, recv), `error_type` is
//! bounded by the `MediaError` variants.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus recorder and return the handle for serving
/// metrics via HTTP. Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns an error if the recorder fails to install (e.g., already
/// installed in this process).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("media_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record an HTTP request completion.
///
/// Metric: `media_http_requests_total`, `media_http_request_duration_seconds`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let status = if status_code < 400 { "success" } else { "error" };

    counter!(
        "media_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status,
    )
    .increment(1);

    histogram!(
        "media_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record a room creation. Metric: `media_rooms_created_total`, `media_rooms_active`.
pub fn record_room_created() {
    counter!("media_rooms_created_total").increment(1);
    gauge!("media_rooms_active").increment(1.0);
}

/// Record a room teardown. Metric: `media_rooms_closed_total`, `media_rooms_active`.
pub fn record_room_closed() {
    counter!("media_rooms_closed_total").increment(1);
    gauge!("media_rooms_active").decrement(1.0);
}

/// Record a transport creation. Metric: `media_transports_created_total`.
pub fn record_transport_created(direction: &'static str) {
    counter!("media_transports_created_total", "direction" => direction).increment(1);
}

/// Record a producer creation. Metric: `media_producers_created_total`.
pub fn record_producer_created(kind: &'static str) {
    counter!("media_producers_created_total", "kind" => kind).increment(1);
}

/// Record a consumer creation. Metric: `media_consumers_created_total`.
pub fn record_consumer_created(kind: &'static str) {
    counter!("media_consumers_created_total", "kind" => kind).increment(1);
}

/// Record a request rejected by the error taxonomy.
/// Metric: `media_errors_total`, label bounded by `MediaError` variants.
pub fn record_error(error_type: &'static str) {
    counter!("media_errors_total", "error_type" => error_type).increment(1);
}
