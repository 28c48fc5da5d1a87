//! Media control API client seam.
//!
//! The signaling router talks to the media engine exclusively through the
//! [`MediaApi`] trait so tests can substitute a mock; the production
//! implementation is [`client::HttpMediaClient`].

pub mod client;

pub use client::HttpMediaClient;

use async_trait::async_trait;
use common::rtp::{DtlsParameters, RtpCapabilities, RtpParameters};
use common::types::{ConsumerInfo, MediaKind, ProducerInfo, RoomInfo, TransportDirection, TransportInfo};
use thiserror::Error;

/// Errors surfaced by the media control API.
#[derive(Debug, Error)]
pub enum MediaApiError {
    /// Room, transport or producer unknown upstream (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected as invalid upstream (400).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Consumer negotiation rejected: no shared codec (400 with
    /// INCOMPATIBLE_CAPABILITIES).
    #[error("Incompatible capabilities: {0}")]
    Incompatible(String),

    /// Media engine unreachable or errored (network failure or 5xx).
    #[error("Media engine unavailable: {0}")]
    Unavailable(String),
}

/// The media-engine control API as consumed by the signaling router.
#[async_trait]
pub trait MediaApi: Send + Sync {
    /// Idempotent room creation; returns the room's router capabilities.
    async fn create_room(&self, room_id: &str) -> Result<RoomInfo, MediaApiError>;

    /// Close a room and everything it owns.
    async fn close_room(&self, room_id: &str) -> Result<(), MediaApiError>;

    /// Create a per-client transport.
    async fn create_transport(
        &self,
        room_id: &str,
        direction: TransportDirection,
    ) -> Result<TransportInfo, MediaApiError>;

    /// Apply the client's DTLS parameters to a transport.
    async fn connect_transport(
        &self,
        room_id: &str,
        transport_id: &str,
        dtls_parameters: DtlsParameters,
    ) -> Result<(), MediaApiError>;

    /// Register an inbound stream.
    async fn create_producer(
        &self,
        room_id: &str,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    ) -> Result<ProducerInfo, MediaApiError>;

    /// Create an outbound stream, gated upstream by the capability check.
    async fn create_consumer(
        &self,
        room_id: &str,
        transport_id: &str,
        producer_id: &str,
        rtp_capabilities: RtpCapabilities,
    ) -> Result<ConsumerInfo, MediaApiError>;
}
