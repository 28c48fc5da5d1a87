//! HTTP routes for the media control plane.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::engine::MediaEngine;
use crate::handlers;
use crate::observability::metrics;
use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
pub struct AppState {
    /// The process-scoped engine context.
    pub engine: Arc<MediaEngine>,

    /// Service configuration.
    pub config: Config,
}

/// Records count and duration for every completed request.
///
/// The endpoint label is the matched route template, not the raw path,
/// so ids never leak into metric cardinality.
async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());

    let response = next.run(request).await;

    metrics::record_http_request(
        &method,
        &endpoint,
        response.status().as_u16(),
        start.elapsed(),
    );
    response
}

/// Build the application routes.
///
/// - `/health` - liveness probe (plain "OK")
/// - `/stats` - worker and room counts
/// - `/metrics` - Prometheus metrics endpoint
/// - `/rooms...` - the control API of the engine
/// - TraceLayer for request logging, request metrics middleware,
///   30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::stats))
        .route("/rooms", post(handlers::create_room))
        .route("/rooms/:room_id", get(handlers::get_room))
        .route("/rooms/:room_id", delete(handlers::delete_room))
        .route(
            "/rooms/:room_id/transports",
            post(handlers::create_transport),
        )
        .route(
            "/rooms/:room_id/transports/:transport_id/connect",
            post(handlers::connect_transport),
        )
        .route("/rooms/:room_id/producers", post(handlers::create_producer))
        .route("/rooms/:room_id/consumers", post(handlers::create_consumer))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(middleware::from_fn(track_http_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
