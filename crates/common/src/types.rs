//! Shared data types for the media control API.
//!
//! These are the wire shapes exchanged between `signal-service` and
//! `media-service`. All fields serialize in camelCase.

use crate::rtp::{DtlsParameters, IceCandidate, IceParameters, RtpCapabilities, RtpParameters};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Returns the lowercase wire label for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

/// Direction of a transport, from the client's point of view.
///
/// A client holds at most one transport of each direction per room;
/// the signaling layer enforces that limit, not the media engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportDirection {
    Send,
    Recv,
}

impl TransportDirection {
    /// Returns the lowercase wire label for this direction.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransportDirection::Send => "send",
            TransportDirection::Recv => "recv",
        }
    }
}

/// Room description returned by the control API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    /// Opaque room identifier.
    pub room_id: String,
    /// Negotiated router capabilities, read-only after creation.
    pub router_capabilities: RtpCapabilities,
    /// When the room's router was created.
    pub created_at: DateTime<Utc>,
}

/// Transport negotiation parameters returned on transport creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportInfo {
    pub id: String,
    pub ice_parameters: IceParameters,
    pub ice_candidates: Vec<IceCandidate>,
    pub dtls_parameters: DtlsParameters,
}

/// Producer summary returned on producer creation and broadcast to peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerInfo {
    pub id: String,
    pub kind: MediaKind,
}

/// Consumer negotiation parameters returned on consumer creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerInfo {
    pub id: String,
    pub producer_id: String,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::rtp;

    #[test]
    fn test_media_kind_wire_labels() {
        assert_eq!(
            serde_json::to_string(&MediaKind::Audio).unwrap(),
            "\"audio\""
        );
        assert_eq!(
            serde_json::to_string(&MediaKind::Video).unwrap(),
            "\"video\""
        );
        assert_eq!(MediaKind::Audio.as_str(), "audio");
        assert_eq!(MediaKind::Video.as_str(), "video");
    }

    #[test]
    fn test_transport_direction_wire_labels() {
        let send: TransportDirection = serde_json::from_str("\"send\"").unwrap();
        assert_eq!(send, TransportDirection::Send);
        let recv: TransportDirection = serde_json::from_str("\"recv\"").unwrap();
        assert_eq!(recv, TransportDirection::Recv);
    }

    #[test]
    fn test_room_info_serializes_camel_case() {
        let info = RoomInfo {
            room_id: "r1".to_string(),
            router_capabilities: rtp::router_rtp_capabilities(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("roomId").is_some());
        assert!(json.get("routerCapabilities").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_room_info_round_trip() {
        let info = RoomInfo {
            room_id: "r1".to_string(),
            router_capabilities: rtp::router_rtp_capabilities(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&info).unwrap();
        let back: RoomInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.room_id, "r1");
        assert_eq!(
            back.router_capabilities.codecs.len(),
            info.router_capabilities.codecs.len()
        );
    }
}
