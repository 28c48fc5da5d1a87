//! Request and response wire types for the control API.

use common::rtp::{DtlsParameters, RtpCapabilities, RtpParameters};
use common::types::{MediaKind, TransportDirection};
use serde::{Deserialize, Serialize};

/// Body of `POST /rooms`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Optional caller-chosen room id; generated when absent.
    #[serde(default)]
    pub room_id: Option<String>,
}

/// Body of `POST /rooms/{roomId}/transports`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransportRequest {
    pub direction: TransportDirection,
}

/// Body of `POST /rooms/{roomId}/transports/{transportId}/connect`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectTransportRequest {
    pub dtls_parameters: DtlsParameters,
}

/// Body of `POST /rooms/{roomId}/producers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProducerRequest {
    pub transport_id: String,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
}

/// Body of `POST /rooms/{roomId}/consumers`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsumerRequest {
    pub transport_id: String,
    pub producer_id: String,
    pub rtp_capabilities: RtpCapabilities,
}

/// Generic `{ok: true}` acknowledgment body.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_room_request_room_id_optional() {
        let with_id: CreateRoomRequest = serde_json::from_str(r#"{"roomId":"r1"}"#).unwrap();
        assert_eq!(with_id.room_id.as_deref(), Some("r1"));

        let without: CreateRoomRequest = serde_json::from_str("{}").unwrap();
        assert!(without.room_id.is_none());
    }

    #[test]
    fn test_create_transport_request_requires_direction() {
        let ok: CreateTransportRequest = serde_json::from_str(r#"{"direction":"send"}"#).unwrap();
        assert_eq!(ok.direction, TransportDirection::Send);

        assert!(serde_json::from_str::<CreateTransportRequest>("{}").is_err());
        assert!(serde_json::from_str::<CreateTransportRequest>(r#"{"direction":"both"}"#).is_err());
    }

    #[test]
    fn test_create_producer_request_camel_case_fields() {
        let json = r#"{
            "transportId": "t1",
            "kind": "audio",
            "rtpParameters": {"codecs": [
                {"mimeType": "audio/opus", "payloadType": 100, "clockRate": 48000, "channels": 2}
            ]}
        }"#;

        let request: CreateProducerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.transport_id, "t1");
        assert_eq!(request.kind, MediaKind::Audio);
        assert_eq!(request.rtp_parameters.codecs.len(), 1);
    }

    #[test]
    fn test_ok_response_serializes() {
        let json = serde_json::to_value(OkResponse::ok()).unwrap();
        assert_eq!(json["ok"], true);
    }
}
