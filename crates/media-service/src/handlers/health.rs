//! Health, stats and metrics handlers.
//!
//! - `/health`: liveness probe - returns OK if the process is running
//! - `/stats`: worker and room counts
//! - `/metrics`: Prometheus scrape endpoint

use crate::routes::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Does NOT check any dependencies - failure means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Handler for GET /stats
///
/// Reports worker and room counts for operational visibility.
#[tracing::instrument(skip_all, name = "media.stats")]
pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.engine.stats().await)
}

/// Handler for GET /metrics
///
/// Returns Prometheus-formatted metrics for scraping. Unauthenticated;
/// only operational data with bounded cardinality labels is exposed.
#[tracing::instrument(skip_all, name = "media.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
