//! Metrics definitions for the signaling orchestrator.
//!
//! All metrics follow Prometheus naming conventions:
//! - `signal_` prefix for this service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! Labels are bounded: `event` is bounded by the client event names,
//! `outcome` by the error taxonomy, `operation` by the media control
//! API surface. Room ids are deliberately NOT used as labels.

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
            Matcher::Prefix("signal_media_call".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set media call buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record a WebSocket connection being accepted.
/// Metric: `signal_connections_total`, `signal_connections_active`.
pub fn record_connection_opened() {
    counter!("signal_connections_total").increment(1);
    gauge!("signal_connections_active").increment(1.0);
}

/// Record a WebSocket connection closing. Metric: `signal_connections_active`.
pub fn record_connection_closed() {
    gauge!("signal_connections_active").decrement(1.0);
}

/// Record a handled client event and its outcome.
/// Metric: `signal_events_total`.
pub fn record_event(event: &'static str, outcome: &'static str) {
    counter!(
        "signal_events_total",
        "event" => event,
        "outcome" => outcome,
    )
    .increment(1);
}

/// Record a frame that failed to parse. Metric: `signal_malformed_frames_total`.
pub fn record_malformed_frame() {
    counter!("signal_malformed_frames_total").increment(1);
}

/// Record a room join. Metric: `signal_joins_total`, `signal_participants_active`.
pub fn record_join(_room_id: &str) {
    counter!("signal_joins_total").increment(1);
    gauge!("signal_participants_active").increment(1.0);
}

/// Record a participant leaving. Metric: `signal_leaves_total`, `signal_participants_active`.
pub fn record_leave(_room_id: &str) {
    counter!("signal_leaves_total").increment(1);
    gauge!("signal_participants_active").decrement(1.0);
}

/// Record a chat message accepted. Metric: `signal_chat_messages_total`.
pub fn record_chat_message(_room_id: &str) {
    counter!("signal_chat_messages_total").increment(1);
}

/// Record a producer announced to a room. Metric: `signal_producers_announced_total`.
pub fn record_producer_announced(kind: &'static str) {
    counter!("signal_producers_announced_total", "kind" => kind).increment(1);
}

/// Record a media control API call.
/// Metric: `signal_media_calls_total`, `signal_media_call_duration_seconds`.
pub fn record_media_call(operation: &'static str, status: &'static str, duration: Duration) {
    counter!(
        "signal_media_calls_total",
        "operation" => operation,
        "status" => status,
    )
    .increment(1);

    histogram!(
        "signal_media_call_duration_seconds",
        "operation" => operation,
    )
    .record(duration.as_secs_f64());
}
