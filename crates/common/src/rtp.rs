//! RTP capability model and the fixed router codec profile.
//!
//! The router advertises exactly one audio codec (Opus, 48 kHz stereo) and
//! one video codec (VP8, 90 kHz). Clients consume these capabilities to
//! configure local negotiation; producer/consumer compatibility is decided
//! by [`can_consume`], a capability-intersection check over MIME type and
//! clock rate.

use crate::types::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opus MIME type advertised by the router.
pub const MIME_TYPE_OPUS: &str = "audio/opus";

/// VP8 MIME type advertised by the router.
pub const MIME_TYPE_VP8: &str = "video/VP8";

/// A codec the router (or a receiving client) is capable of handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpCodecCapability {
    pub kind: MediaKind,
    pub mime_type: String,
    pub clock_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// A set of codec capabilities (the router's negotiated set, or a
/// receiving client's advertised set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpCapabilities {
    pub codecs: Vec<RtpCodecCapability>,
}

/// A codec as actually used by a producer's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpCodecParameters {
    pub mime_type: String,
    pub payload_type: u8,
    pub clock_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
}

/// RTP parameters describing an inbound or outbound stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpParameters {
    pub codecs: Vec<RtpCodecParameters>,
}

/// ICE username fragment and password for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceParameters {
    pub username_fragment: String,
    pub password: String,
    pub ice_lite: bool,
}

/// A single ICE candidate offered by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub foundation: String,
    pub priority: u32,
    pub ip: String,
    pub port: u16,
    pub protocol: String,
    #[serde(rename = "type")]
    pub candidate_type: String,
}

/// DTLS fingerprint (algorithm + hex digest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtlsFingerprint {
    pub algorithm: String,
    pub value: String,
}

/// DTLS parameters for one side of a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtlsParameters {
    pub role: String,
    pub fingerprints: Vec<DtlsFingerprint>,
}

/// The fixed codec profile every router is created with.
///
/// Read-only after creation: one audio codec, one video codec, both with
/// fixed parameters.
#[must_use]
pub fn router_rtp_capabilities() -> RtpCapabilities {
    let mut opus_parameters = BTreeMap::new();
    opus_parameters.insert("useinbandfec".to_string(), serde_json::json!(1));
    opus_parameters.insert("minptime".to_string(), serde_json::json!(10));

    let mut vp8_parameters = BTreeMap::new();
    vp8_parameters.insert("x-google-start-bitrate".to_string(), serde_json::json!(1000));

    RtpCapabilities {
        codecs: vec![
            RtpCodecCapability {
                kind: MediaKind::Audio,
                mime_type: MIME_TYPE_OPUS.to_string(),
                clock_rate: 48_000,
                channels: Some(2),
                parameters: opus_parameters,
            },
            RtpCodecCapability {
                kind: MediaKind::Video,
                mime_type: MIME_TYPE_VP8.to_string(),
                clock_rate: 90_000,
                channels: None,
                parameters: vp8_parameters,
            },
        ],
    }
}

/// Decides whether a receiver with `receiver_capabilities` can consume a
/// stream described by `producer_parameters`.
///
/// The intersection rule: the receiver must advertise at least one codec
/// whose MIME type (compared case-insensitively) and clock rate match one
/// of the producer's codecs. An empty intersection means the consumer
/// request must be rejected rather than silently degraded.
#[must_use]
pub fn can_consume(
    producer_parameters: &RtpParameters,
    receiver_capabilities: &RtpCapabilities,
) -> bool {
    producer_parameters.codecs.iter().any(|produced| {
        receiver_capabilities.codecs.iter().any(|offered| {
            offered.mime_type.eq_ignore_ascii_case(&produced.mime_type)
                && offered.clock_rate == produced.clock_rate
        })
    })
}
