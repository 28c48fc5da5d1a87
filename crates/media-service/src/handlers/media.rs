//! Transport, producer and consumer lifecycle handlers.
//!
//! - `POST /rooms/{roomId}/transports` - create a per-client transport
//! - `POST /rooms/{roomId}/transports/{transportId}/connect` - apply DTLS
//! - `POST /rooms/{roomId}/producers` - register an inbound stream
//! - `POST /rooms/{roomId}/consumers` - create an outbound stream, gated
//!   by the capability-intersection check

use crate::errors::MediaError;
use crate::models::{
    ConnectTransportRequest, CreateConsumerRequest, CreateProducerRequest, CreateTransportRequest,
    OkResponse,
};
use crate::observability::metrics;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::types::{ConsumerInfo, ProducerInfo, TransportInfo};
use std::sync::Arc;

/// Deserialize a request body, mapping failures to 400 (not Axum's
/// default 422) with a client-visible reason.
fn parse_body<T: serde::de::DeserializeOwned>(body: &axum::body::Bytes) -> Result<T, MediaError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(target: "media.handlers.media", error = %e, "Invalid request body");
        metrics::record_error("invalid_input");
        MediaError::InvalidInput(format!("Invalid request body: {}", e))
    })
}

/// Handler for POST /rooms/{roomId}/transports
///
/// # Response
///
/// - 201 Created: `{id, iceParameters, iceCandidates, dtlsParameters}`
/// - 400 Bad Request: malformed body or unknown direction
/// - 404 Not Found: room does not exist
#[tracing::instrument(skip_all, name = "media.transport.create", fields(room_id = %room_id))]
pub async fn create_transport(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<TransportInfo>), MediaError> {
    let request: CreateTransportRequest = parse_body(&body)?;

    let info = state
        .engine
        .create_transport(&room_id, request.direction)
        .await
        .inspect_err(|e| metrics::record_error(e.error_type_label()))?;

    Ok((StatusCode::CREATED, Json(info)))
}

/// Handler for POST /rooms/{roomId}/transports/{transportId}/connect
///
/// Completes DTLS handshake setup for the transport.
///
/// # Response
///
/// - 200 OK: `{ok: true}`
/// - 400 Bad Request: missing or malformed dtlsParameters
/// - 404 Not Found: room or transport unknown
#[tracing::instrument(
    skip_all,
    name = "media.transport.connect",
    fields(room_id = %path.0, transport_id = %path.1)
)]
pub async fn connect_transport(
    State(state): State<Arc<AppState>>,
    Path(path): Path<(String, String)>,
    body: axum::body::Bytes,
) -> Result<Json<OkResponse>, MediaError> {
    let (room_id, transport_id) = path;
    let request: ConnectTransportRequest = parse_body(&body)?;

    state
        .engine
        .connect_transport(&room_id, &transport_id, request.dtls_parameters)
        .await
        .inspect_err(|e| metrics::record_error(e.error_type_label()))?;

    Ok(Json(OkResponse::ok()))
}

/// Handler for POST /rooms/{roomId}/producers
///
/// Registers an inbound stream. The control plane raises no events; the
/// signaling layer broadcasts producer-added after a successful call.
///
/// # Response
///
/// - 201 Created: `{id, kind}`
/// - 400 Bad Request: malformed body
/// - 404 Not Found: room or transport unknown
#[tracing::instrument(skip_all, name = "media.producer.create", fields(room_id = %room_id))]
pub async fn create_producer(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<ProducerInfo>), MediaError> {
    let request: CreateProducerRequest = parse_body(&body)?;

    if request.rtp_parameters.codecs.is_empty() {
        metrics::record_error("invalid_input");
        return Err(MediaError::InvalidInput(
            "rtpParameters must carry at least one codec".to_string(),
        ));
    }

    let info = state
        .engine
        .create_producer(
            &room_id,
            &request.transport_id,
            request.kind,
            request.rtp_parameters,
        )
        .await
        .inspect_err(|e| metrics::record_error(e.error_type_label()))?;

    Ok((StatusCode::CREATED, Json(info)))
}

/// Handler for POST /rooms/{roomId}/consumers
///
/// The capability-intersection check runs before anything is created: an
/// incompatible receiver gets a 400 with code INCOMPATIBLE_CAPABILITIES
/// rather than a silently degraded stream.
///
/// # Response
///
/// - 201 Created: `{id, producerId, kind, rtpParameters}`
/// - 400 Bad Request: malformed body or incompatible capabilities
/// - 404 Not Found: room, transport or producer unknown
#[tracing::instrument(skip_all, name = "media.consumer.create", fields(room_id = %room_id))]
pub async fn create_consumer(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<ConsumerInfo>), MediaError> {
    let request: CreateConsumerRequest = parse_body(&body)?;

    let info = state
        .engine
        .create_consumer(
            &room_id,
            &request.transport_id,
            &request.producer_id,
            request.rtp_capabilities,
        )
        .await
        .inspect_err(|e| metrics::record_error(e.error_type_label()))?;

    Ok((StatusCode::CREATED, Json(info)))
}
