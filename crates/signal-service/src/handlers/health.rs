//! Health, stats and metrics handlers.
//!
//! - `/health`: liveness probe - returns OK if the process is running
//! - `/stats`: room, participant and chat message counts
//! - `/metrics`: Prometheus scrape endpoint

use crate::routes::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Does NOT check the media engine - failure means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Handler for GET /stats
///
/// Reports room, participant and chat message counts.
#[tracing::instrument(skip_all, name = "signal.stats")]
pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.signaling.stats().await)
}

/// Handler for GET /metrics
///
/// Returns Prometheus-formatted metrics for scraping. Unauthenticated;
/// only operational data with bounded cardinality labels is exposed.
#[tracing::instrument(skip_all, name = "signal.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert_eq!(result, "OK");
    }

    // /stats and /metrics are covered by the integration tests in
    // tests/session_flow_tests.rs, which drive the full router.
}
