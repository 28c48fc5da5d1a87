//! WebSocket connection handling.
//!
//! Each accepted socket gets a generated connection id, a writer task
//! draining an unbounded outbound channel, and a read loop that handles
//! frames strictly in arrival order. When the socket closes for any
//! reason the connection is removed from every room it joined.

use crate::events::{ClientEnvelope, Outbound};
use crate::observability::metrics;
use crate::router::{Connection, SignalingState};
use crate::routes::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Handler for GET /ws - upgrades to the signaling protocol.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let signaling = state.signaling.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, signaling))
}

/// Drive one client connection to completion.
#[tracing::instrument(skip_all)]
async fn handle_socket(socket: WebSocket, signaling: Arc<SignalingState>) {
    let connection_id = Uuid::new_v4().to_string();
    metrics::record_connection_opened();
    tracing::info!(connection_id = %connection_id, "Connection opened");

    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();

    let writer_connection_id = connection_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            match frame.into_text() {
                Ok(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %writer_connection_id,
                        error = %e,
                        "Failed to serialize outbound frame"
                    );
                }
            }
        }
    });

    let conn = Connection {
        connection_id: connection_id.clone(),
        outbound: outbound_tx,
    };

    while let Some(result) = stream.next().await {
        let message = match result {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "Socket error");
                break;
            }
        };

        match message {
            Message::Text(text) => handle_frame(&signaling, &conn, &text).await,
            Message::Close(_) => break,
            // Pings are answered by the protocol layer; binary frames
            // are not part of the signaling protocol.
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => {}
        }
    }

    signaling.handle_disconnect(&connection_id).await;
    metrics::record_connection_closed();
    tracing::info!(connection_id = %connection_id, "Connection closed");

    // Dropping the last sender ends the writer once queued frames drain.
    drop(conn);
    let _ = writer.await;
}

/// Parse and dispatch one inbound text frame. Acks are only sent for
/// requests carrying a correlation id.
async fn handle_frame(signaling: &SignalingState, conn: &Connection, text: &str) {
    let envelope: ClientEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            metrics::record_malformed_frame();
            tracing::debug!(
                connection_id = %conn.connection_id,
                error = %e,
                "Malformed frame"
            );
            if let Some(id) = extract_frame_id(text) {
                let _ = conn.outbound.send(Outbound::ErrorAck {
                    id,
                    code: "INVALID_INPUT",
                    error: "Malformed frame".to_string(),
                });
            }
            return;
        }
    };

    let id = envelope.id;
    let result = signaling.handle_event(conn, envelope.event).await;

    let Some(id) = id else {
        return;
    };

    let ack = match result {
        Ok(data) => Outbound::Ack { id, data },
        Err(e) => Outbound::ErrorAck {
            id,
            code: e.code(),
            error: e.client_message(),
        },
    };
    let _ = conn.outbound.send(ack);
}

/// Best-effort extraction of the ack id from an otherwise unparseable
/// frame, so the client still gets an error ack.
fn extract_frame_id(text: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()?
        .get("id")?
        .as_u64()
}
