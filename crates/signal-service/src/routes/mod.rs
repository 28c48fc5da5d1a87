//! HTTP routes for the signaling orchestrator.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::router::SignalingState;
use crate::ws;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers.
pub struct AppState {
    /// The shared signaling router.
    pub signaling: Arc<SignalingState>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// - `/health` - liveness probe (plain "OK")
/// - `/stats` - room and participant counts
/// - `/ws` - the signaling WebSocket endpoint
/// - `/metrics` - Prometheus metrics endpoint
/// - TraceLayer for request logging. No request timeout layer here:
///   signaling sockets are long-lived by design.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::stats))
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
}
