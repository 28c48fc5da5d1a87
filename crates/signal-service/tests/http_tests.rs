//! HTTP surface tests for the signaling orchestrator.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use signal_service::config::Config;
use signal_service::media::{MediaApi, MediaApiError};
use signal_service::router::SignalingState;
use signal_service::routes::{build_routes, AppState};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

struct NoMedia;

#[async_trait]
impl MediaApi for NoMedia {
    async fn create_room(
        &self,
        _room_id: &str,
    ) -> Result<common::types::RoomInfo, MediaApiError> {
        Err(MediaApiError::Unavailable("offline".to_string()))
    }

    async fn close_room(&self, _room_id: &str) -> Result<(), MediaApiError> {
        Err(MediaApiError::Unavailable("offline".to_string()))
    }

    async fn create_transport(
        &self,
        _room_id: &str,
        _direction: common::types::TransportDirection,
    ) -> Result<common::types::TransportInfo, MediaApiError> {
        Err(MediaApiError::Unavailable("offline".to_string()))
    }

    async fn connect_transport(
        &self,
        _room_id: &str,
        _transport_id: &str,
        _dtls_parameters: common::rtp::DtlsParameters,
    ) -> Result<(), MediaApiError> {
        Err(MediaApiError::Unavailable("offline".to_string()))
    }

    async fn create_producer(
        &self,
        _room_id: &str,
        _transport_id: &str,
        _kind: common::types::MediaKind,
        _rtp_parameters: common::rtp::RtpParameters,
    ) -> Result<common::types::ProducerInfo, MediaApiError> {
        Err(MediaApiError::Unavailable("offline".to_string()))
    }

    async fn create_consumer(
        &self,
        _room_id: &str,
        _transport_id: &str,
        _producer_id: &str,
        _rtp_capabilities: common::rtp::RtpCapabilities,
    ) -> Result<common::types::ConsumerInfo, MediaApiError> {
        Err(MediaApiError::Unavailable("offline".to_string()))
    }
}

fn test_app() -> axum::Router {
    let config = Config::from_vars(&HashMap::new()).expect("Config should load");
    let state = Arc::new(AppState {
        signaling: Arc::new(SignalingState::new(Arc::new(NoMedia))),
        config,
    });

    // Per-test recorder; the global recorder is only installed by main.
    let handle = PrometheusBuilder::new().build_recorder().handle();
    build_routes(state, handle)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_stats_endpoint_reports_empty_state() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["rooms"], 0);
    assert_eq!(json["participants"], 0);
    assert_eq!(json["messages"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_scrapes() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ws_endpoint_rejects_plain_get() {
    let app = test_app();

    // Without upgrade headers the WebSocket handshake is refused.
    let response = app
        .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::OK);
}
