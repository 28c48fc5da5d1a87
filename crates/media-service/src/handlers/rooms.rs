//! Room registry handlers.
//!
//! - `POST /rooms` - create (or return) a room, idempotent per roomId
//! - `GET /rooms/{roomId}` - look up a room
//! - `DELETE /rooms/{roomId}` - close a room and everything it owns

use crate::errors::MediaError;
use crate::models::{CreateRoomRequest, OkResponse};
use crate::observability::metrics;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::types::RoomInfo;
use std::sync::Arc;

/// Handler for POST /rooms
///
/// Idempotent per roomId: repeated calls return the same router
/// capabilities and never create a second router.
///
/// # Response
///
/// - 201 Created: `{roomId, routerCapabilities, createdAt}`
/// - 400 Bad Request: malformed body
#[tracing::instrument(skip_all, name = "media.room.create")]
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<RoomInfo>), MediaError> {
    // Deserialize manually to return 400 (not Axum's default 422). An
    // empty body is accepted as "no roomId requested".
    let request: CreateRoomRequest = if body.is_empty() {
        CreateRoomRequest { room_id: None }
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(target: "media.handlers.rooms", error = %e, "Invalid request body");
            metrics::record_error("invalid_input");
            MediaError::InvalidInput("Invalid request body".to_string())
        })?
    };

    if let Some(room_id) = &request.room_id {
        if room_id.trim().is_empty() {
            metrics::record_error("invalid_input");
            return Err(MediaError::InvalidInput(
                "roomId must not be empty".to_string(),
            ));
        }
    }

    let info = state.engine.get_or_create_room(request.room_id).await;
    Ok((StatusCode::CREATED, Json(info)))
}

/// Handler for GET /rooms/{roomId}
#[tracing::instrument(skip_all, name = "media.room.get", fields(room_id = %room_id))]
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomInfo>, MediaError> {
    let info = state.engine.room_info(&room_id).await.inspect_err(|e| {
        metrics::record_error(e.error_type_label());
    })?;
    Ok(Json(info))
}

/// Handler for DELETE /rooms/{roomId}
///
/// Closes the router, all transports owned by the room, and removes the
/// room. Teardown is always explicit; the registry never expires idle
/// rooms on its own.
#[tracing::instrument(skip_all, name = "media.room.delete", fields(room_id = %room_id))]
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<OkResponse>, MediaError> {
    state.engine.close_room(&room_id).await.inspect_err(|e| {
        metrics::record_error(e.error_type_label());
    })?;
    Ok(Json(OkResponse::ok()))
}
