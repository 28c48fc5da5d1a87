//! Room control API integration tests.
//!
//! Drives the full Axum router in-process via `tower::ServiceExt::oneshot`,
//! without binding a socket.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use media_service::config::Config;
use media_service::engine::MediaEngine;
use media_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app(pool_size: usize) -> Router {
    let vars = HashMap::from([(
        "MEDIA_WORKER_POOL_SIZE".to_string(),
        pool_size.to_string(),
    )]);
    let config = Config::from_vars(&vars).expect("test config");
    let (engine, _fatal_rx) = MediaEngine::new(&config);

    let state = Arc::new(AppState {
        engine: Arc::new(engine),
        config,
    });

    // A per-test recorder handle; nothing is installed globally.
    let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
    routes::build_routes(state, metrics_handle)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_create_room_returns_201_with_capabilities() {
    let app = test_app(1);

    let response = app
        .oneshot(post_json("/rooms", serde_json::json!({"roomId": "r1"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["roomId"], "r1");
    assert!(json["createdAt"].is_string());

    let codecs = json["routerCapabilities"]["codecs"].as_array().unwrap();
    assert_eq!(codecs.len(), 2);
}

#[tokio::test]
async fn test_create_room_twice_is_idempotent() {
    let app = test_app(2);

    let first = app
        .clone()
        .oneshot(post_json("/rooms", serde_json::json!({"roomId": "r1"})))
        .await
        .unwrap();
    let first_json = body_json(first).await;

    let second = app
        .clone()
        .oneshot(post_json("/rooms", serde_json::json!({"roomId": "r1"})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);
    let second_json = body_json(second).await;

    // Identical router capabilities, no second router.
    assert_eq!(
        first_json["routerCapabilities"],
        second_json["routerCapabilities"]
    );
    assert_eq!(first_json["createdAt"], second_json["createdAt"]);

    let stats = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let stats_json = body_json(stats).await;
    assert_eq!(stats_json["rooms"], 1);
}

#[tokio::test]
async fn test_create_room_without_id_generates_one() {
    let app = test_app(1);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rooms")
                .header("content-type", "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(!json["roomId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_room_rejects_empty_room_id() {
    let app = test_app(1);

    let response = app
        .oneshot(post_json("/rooms", serde_json::json!({"roomId": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_get_room_roundtrip_and_404() {
    let app = test_app(1);

    app.clone()
        .oneshot(post_json("/rooms", serde_json::json!({"roomId": "r1"})))
        .await
        .unwrap();

    let found = app
        .clone()
        .oneshot(Request::builder().uri("/rooms/r1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);

    let missing = app
        .oneshot(
            Request::builder()
                .uri("/rooms/ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let json = body_json(missing).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_room_then_404() {
    let app = test_app(1);

    app.clone()
        .oneshot(post_json("/rooms", serde_json::json!({"roomId": "r1"})))
        .await
        .unwrap();

    let deleted = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/rooms/r1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let json = body_json(deleted).await;
    assert_eq!(json["ok"], true);

    let again = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/rooms/r1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_stats_endpoints() {
    let app = test_app(3);

    let health = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let bytes = health.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");

    let stats = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
    let json = body_json(stats).await;
    assert_eq!(json["workers"], 3);
    assert_eq!(json["rooms"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let app = test_app(1);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_http_request_metrics_recorded() {
    // Installs the process-global recorder; every other test in this
    // binary uses a detached per-test handle, so this runs once.
    let handle = media_service::observability::metrics::init_metrics_recorder()
        .expect("recorder installs");

    let vars = HashMap::from([("MEDIA_WORKER_POOL_SIZE".to_string(), "1".to_string())]);
    let config = Config::from_vars(&vars).expect("test config");
    let (engine, _fatal_rx) = MediaEngine::new(&config);
    let state = Arc::new(AppState {
        engine: Arc::new(engine),
        config,
    });
    let app = routes::build_routes(state, handle.clone());

    app.clone()
        .oneshot(post_json("/rooms", serde_json::json!({"roomId": "r1"})))
        .await
        .unwrap();
    app.oneshot(Request::builder().uri("/rooms/r1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let rendered = handle.render();
    assert!(rendered.contains("media_http_requests_total"));
    assert!(rendered.contains("media_http_request_duration_seconds"));
    // The endpoint label is the route template, not the raw path.
    assert!(rendered.contains("endpoint=\"/rooms/:room_id\""));
    assert!(!rendered.contains("endpoint=\"/rooms/r1\""));
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = test_app(1);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
