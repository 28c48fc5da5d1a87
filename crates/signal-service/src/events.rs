//! Signaling wire protocol.
//!
//! Inbound client events arrive as JSON text frames of the form
//! `{"id": 7, "event": "room:join", "data": {...}}` where `id` is an
//! optional acknowledgment correlation number. Outbound frames are
//! either acks (`{"id": 7, "ok": true, ...}`) or server events
//! (`{"event": "room:peer-joined", "data": {...}}`).

use common::rtp::{DtlsParameters, RtpCapabilities, RtpParameters};
use common::types::{MediaKind, TransportDirection};
use serde::{Deserialize, Serialize};

/// Participant role within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Cohost,
    Speaker,
    Viewer,
}

impl Default for Role {
    fn default() -> Self {
        Role::Viewer
    }
}

/// An inbound frame: optional ack id plus the event payload.
#[derive(Debug, Deserialize)]
pub struct ClientEnvelope {
    /// Ack correlation id. Requests without one get no ack.
    pub id: Option<u64>,

    #[serde(flatten)]
    pub event: ClientEvent,
}

/// Events a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "room:join", rename_all = "camelCase")]
    Join {
        room_id: String,
        user_id: String,
        display_name: String,
        #[serde(default)]
        role: Role,
    },

    #[serde(rename = "room:leave", rename_all = "camelCase")]
    Leave {
        room_id: String,
        /// Advisory; the leaver is identified by its connection.
        #[serde(default)]
        user_id: Option<String>,
    },

    #[serde(rename = "room:raise-hand", rename_all = "camelCase")]
    RaiseHand {
        room_id: String,
        #[serde(default = "default_raised")]
        raised_hand: bool,
    },

    #[serde(rename = "room:message", rename_all = "camelCase")]
    Chat { room_id: String, message: String },

    #[serde(rename = "mediasoup:create-transport", rename_all = "camelCase")]
    CreateTransport {
        room_id: String,
        direction: TransportDirection,
    },

    #[serde(rename = "mediasoup:connect-transport", rename_all = "camelCase")]
    ConnectTransport {
        room_id: String,
        transport_id: String,
        dtls_parameters: DtlsParameters,
    },

    #[serde(rename = "mediasoup:produce", rename_all = "camelCase")]
    Produce {
        room_id: String,
        transport_id: String,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    },

    #[serde(rename = "mediasoup:consume", rename_all = "camelCase")]
    Consume {
        room_id: String,
        transport_id: String,
        producer_id: String,
        rtp_capabilities: RtpCapabilities,
    },
}

fn default_raised() -> bool {
    true
}

impl ClientEvent {
    /// Bounded event name for logging and metrics labels.
    pub fn label(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "room:join",
            ClientEvent::Leave { .. } => "room:leave",
            ClientEvent::RaiseHand { .. } => "room:raise-hand",
            ClientEvent::Chat { .. } => "room:message",
            ClientEvent::CreateTransport { .. } => "mediasoup:create-transport",
            ClientEvent::ConnectTransport { .. } => "mediasoup:connect-transport",
            ClientEvent::Produce { .. } => "mediasoup:produce",
            ClientEvent::Consume { .. } => "mediasoup:consume",
        }
    }
}

/// Events the server pushes to room participants.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "room:peer-joined", rename_all = "camelCase")]
    PeerJoined {
        user_id: String,
        display_name: String,
        role: Role,
    },

    #[serde(rename = "room:peer-left", rename_all = "camelCase")]
    PeerLeft { user_id: String },

    #[serde(rename = "room:rtp-capabilities", rename_all = "camelCase")]
    RouterCapabilities { router_capabilities: RtpCapabilities },

    #[serde(rename = "room:producer-added", rename_all = "camelCase")]
    ProducerAdded {
        id: String,
        user_id: String,
        kind: MediaKind,
    },

    #[serde(rename = "room:producer-removed", rename_all = "camelCase")]
    ProducerRemoved { producer_id: String },

    #[serde(rename = "room:hand-raised", rename_all = "camelCase")]
    HandRaised { user_id: String, raised_hand: bool },

    #[serde(rename = "room:message")]
    Chat(crate::presence::ChatMessage),
}

/// A frame queued onto a connection's outbound channel.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A server-initiated event broadcast.
    Event(ServerEvent),

    /// A success ack for a client request. The `data` object is merged
    /// alongside `ok: true`.
    Ack { id: u64, data: serde_json::Value },

    /// A failure ack carrying the error code and client-safe message.
    ErrorAck {
        id: u64,
        code: &'static str,
        error: String,
    },
}

impl Outbound {
    /// Serialize to the wire text frame.
    pub fn into_text(self) -> Result<String, serde_json::Error> {
        let value = match self {
            Outbound::Event(event) => serde_json::to_value(&event)?,
            Outbound::Ack { id, data } => {
                let mut frame = serde_json::Map::new();
                frame.insert("id".to_string(), serde_json::json!(id));
                frame.insert("ok".to_string(), serde_json::json!(true));
                if let serde_json::Value::Object(fields) = data {
                    frame.extend(fields);
                }
                serde_json::Value::Object(frame)
            }
            Outbound::ErrorAck { id, code, error } => serde_json::json!({
                "id": id,
                "ok": false,
                "code": code,
                "error": error,
            }),
        };
        serde_json::to_string(&value)
    }
}
