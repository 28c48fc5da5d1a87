//! Per-room router state and the transport/producer/consumer arena.
//!
//! Ownership mirrors the engine's entity model: a room owns its
//! transports, a send transport owns the producers registered on it, and
//! a receive transport holds the consumers created for its client. All
//! cross-references are stored as ids, never as embedded copies.

use crate::errors::MediaError;
use chrono::{DateTime, Utc};
use common::rtp::{
    self, DtlsFingerprint, DtlsParameters, IceCandidate, IceParameters, RtpCapabilities,
    RtpParameters,
};
use common::types::{
    ConsumerInfo, MediaKind, ProducerInfo, RoomInfo, TransportDirection, TransportInfo,
};
use std::collections::HashMap;
use uuid::Uuid;

/// An inbound media stream registered on a send transport.
#[derive(Debug, Clone)]
pub struct Producer {
    pub id: String,
    pub kind: MediaKind,
    pub rtp_parameters: RtpParameters,
}

/// An outbound media stream bound to a receive transport.
#[derive(Debug, Clone)]
pub struct Consumer {
    pub id: String,
    pub producer_id: String,
    pub kind: MediaKind,
}

/// A per-client, per-direction network endpoint.
#[derive(Debug)]
pub struct Transport {
    pub id: String,
    pub direction: TransportDirection,
    ice_parameters: IceParameters,
    ice_candidates: Vec<IceCandidate>,
    dtls_parameters: DtlsParameters,
    /// DTLS parameters supplied by the client; present once connected.
    remote_dtls: Option<DtlsParameters>,
    producers: HashMap<String, Producer>,
    consumers: HashMap<String, Consumer>,
}

impl Transport {
    /// Whether the client's DTLS parameters have been applied.
    pub fn is_connected(&self) -> bool {
        self.remote_dtls.is_some()
    }

    fn info(&self) -> TransportInfo {
        TransportInfo {
            id: self.id.clone(),
            ice_parameters: self.ice_parameters.clone(),
            ice_candidates: self.ice_candidates.clone(),
            dtls_parameters: self.dtls_parameters.clone(),
        }
    }
}

/// A room and its router, bound to one worker for its lifetime.
#[derive(Debug)]
pub struct Room {
    id: String,
    worker_id: usize,
    router_capabilities: RtpCapabilities,
    created_at: DateTime<Utc>,
    transports: HashMap<String, Transport>,
}

impl Room {
    /// Create the room's router with the fixed codec profile.
    pub fn new(id: String, worker_id: usize) -> Self {
        Self {
            id,
            worker_id,
            router_capabilities: rtp::router_rtp_capabilities(),
            created_at: Utc::now(),
            transports: HashMap::new(),
        }
    }

    /// Worker this room is bound to.
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Wire description of the room.
    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.id.clone(),
            router_capabilities: self.router_capabilities.clone(),
            created_at: self.created_at,
        }
    }

    /// Create a transport and mint its ICE/DTLS negotiation parameters.
    pub fn create_transport(
        &mut self,
        direction: TransportDirection,
        announced_ip: &str,
        port: u16,
    ) -> TransportInfo {
        let transport = Transport {
            id: Uuid::new_v4().to_string(),
            direction,
            ice_parameters: mint_ice_parameters(),
            ice_candidates: vec![mint_ice_candidate(announced_ip, port)],
            dtls_parameters: mint_dtls_parameters(),
            remote_dtls: None,
            producers: HashMap::new(),
            consumers: HashMap::new(),
        };

        let info = transport.info();
        self.transports.insert(transport.id.clone(), transport);
        info
    }

    /// Apply the client's DTLS parameters.
    pub fn connect_transport(
        &mut self,
        transport_id: &str,
        dtls_parameters: DtlsParameters,
    ) -> Result<(), MediaError> {
        let transport = self.transports.get_mut(transport_id).ok_or_else(|| {
            MediaError::NotFound(format!("transport {} not found", transport_id))
        })?;

        transport.remote_dtls = Some(dtls_parameters);
        Ok(())
    }

    /// Register an inbound stream on a transport.
    pub fn create_producer(
        &mut self,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    ) -> Result<ProducerInfo, MediaError> {
        let transport = self.transports.get_mut(transport_id).ok_or_else(|| {
            MediaError::NotFound(format!("transport {} not found", transport_id))
        })?;

        let producer = Producer {
            id: Uuid::new_v4().to_string(),
            kind,
            rtp_parameters,
        };

        let info = ProducerInfo {
            id: producer.id.clone(),
            kind,
        };
        transport.producers.insert(producer.id.clone(), producer);

        tracing::debug!(
            target: "media.room",
            room_id = %self.id,
            transport_id,
            producer_id = %info.id,
            kind = kind.as_str(),
            "Producer registered"
        );

        Ok(info)
    }

    /// Create a consumer on a receive transport, gated by the
    /// capability-intersection check against the target producer.
    pub fn create_consumer(
        &mut self,
        transport_id: &str,
        producer_id: &str,
        receiver_capabilities: &RtpCapabilities,
    ) -> Result<ConsumerInfo, MediaError> {
        if !self.transports.contains_key(transport_id) {
            return Err(MediaError::NotFound(format!(
                "transport {} not found",
                transport_id
            )));
        }

        let producer = self
            .find_producer(producer_id)
            .ok_or_else(|| MediaError::NotFound(format!("producer {} not found", producer_id)))?;

        if !rtp::can_consume(&producer.rtp_parameters, receiver_capabilities) {
            return Err(MediaError::IncompatibleCapabilities(format!(
                "cannot consume producer {}",
                producer_id
            )));
        }

        let consumer = Consumer {
            id: Uuid::new_v4().to_string(),
            producer_id: producer.id.clone(),
            kind: producer.kind,
        };

        let info = ConsumerInfo {
            id: consumer.id.clone(),
            producer_id: consumer.producer_id.clone(),
            kind: consumer.kind,
            rtp_parameters: producer.rtp_parameters.clone(),
        };

        if let Some(transport) = self.transports.get_mut(transport_id) {
            transport.consumers.insert(consumer.id.clone(), consumer);
        }

        Ok(info)
    }

    /// Close the room, tearing down every transport and the producers and
    /// consumers bound to them. Returns the entity counts removed.
    pub fn close(self) -> (usize, usize, usize) {
        let transports = self.transports.len();
        let producers: usize = self.transports.values().map(|t| t.producers.len()).sum();
        let consumers: usize = self.transports.values().map(|t| t.consumers.len()).sum();
        (transports, producers, consumers)
    }

    /// Access a transport by id.
    pub fn transport(&self, transport_id: &str) -> Option<&Transport> {
        self.transports.get(transport_id)
    }

    fn find_producer(&self, producer_id: &str) -> Option<&Producer> {
        self.transports
            .values()
            .find_map(|t| t.producers.get(producer_id))
    }
}

fn mint_ice_parameters() -> IceParameters {
    IceParameters {
        username_fragment: Uuid::new_v4().simple().to_string(),
        password: Uuid::new_v4().simple().to_string(),
        ice_lite: true,
    }
}

fn mint_ice_candidate(announced_ip: &str, port: u16) -> IceCandidate {
    IceCandidate {
        foundation: "udpcandidate".to_string(),
        priority: 1_076_302_079,
        ip: announced_ip.to_string(),
        port,
        protocol: "udp".to_string(),
        candidate_type: "host".to_string(),
    }
}

fn mint_dtls_parameters() -> DtlsParameters {
    // 32-byte digest rendered as colon-separated hex pairs.
    let digest = format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    );
    let value = digest
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).to_uppercase())
        .collect::<Vec<_>>()
        .join(":");

    DtlsParameters {
        role: "auto".to_string(),
        fingerprints: vec![DtlsFingerprint {
            algorithm: "sha-256".to_string(),
            value,
        }],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::rtp::RtpCodecParameters;

    fn opus_parameters() -> RtpParameters {
        RtpParameters {
            codecs: vec![RtpCodecParameters {
                mime_type: rtp::MIME_TYPE_OPUS.to_string(),
                payload_type: 100,
                clock_rate: 48_000,
                channels: Some(2),
            }],
        }
    }

    #[test]
    fn test_new_room_has_router_profile() {
        let room = Room::new("r1".to_string(), 0);
        let info = room.info();

        assert_eq!(info.room_id, "r1");
        assert_eq!(info.router_capabilities, rtp::router_rtp_capabilities());
    }

    #[test]
    fn test_transport_starts_disconnected() {
        let mut room = Room::new("r1".to_string(), 0);
        let info = room.create_transport(TransportDirection::Send, "127.0.0.1", 40_000);

        let transport = room.transport(&info.id).unwrap();
        assert!(!transport.is_connected());
        assert_eq!(transport.direction, TransportDirection::Send);
    }

    #[test]
    fn test_connect_transport_applies_remote_dtls() {
        let mut room = Room::new("r1".to_string(), 0);
        let info = room.create_transport(TransportDirection::Send, "127.0.0.1", 40_000);

        room.connect_transport(&info.id, info.dtls_parameters.clone())
            .unwrap();

        assert!(room.transport(&info.id).unwrap().is_connected());
    }

    #[test]
    fn test_connect_unknown_transport_is_not_found() {
        let mut room = Room::new("r1".to_string(), 0);
        let result = room.connect_transport(
            "ghost",
            DtlsParameters {
                role: "client".to_string(),
                fingerprints: vec![],
            },
        );
        assert!(matches!(result, Err(MediaError::NotFound(_))));
    }

    #[test]
    fn test_producer_on_unknown_transport_is_not_found() {
        let mut room = Room::new("r1".to_string(), 0);
        let result = room.create_producer("ghost", MediaKind::Audio, opus_parameters());
        assert!(matches!(result, Err(MediaError::NotFound(_))));
    }

    #[test]
    fn test_consumer_for_unknown_producer_is_not_found() {
        let mut room = Room::new("r1".to_string(), 0);
        let recv = room.create_transport(TransportDirection::Recv, "127.0.0.1", 40_001);

        let result = room.create_consumer(&recv.id, "ghost", &rtp::router_rtp_capabilities());
        assert!(matches!(result, Err(MediaError::NotFound(_))));
    }

    #[test]
    fn test_consumer_inherits_producer_kind_and_parameters() {
        let mut room = Room::new("r1".to_string(), 0);
        let send = room.create_transport(TransportDirection::Send, "127.0.0.1", 40_000);
        let recv = room.create_transport(TransportDirection::Recv, "127.0.0.1", 40_001);

        let producer = room
            .create_producer(&send.id, MediaKind::Audio, opus_parameters())
            .unwrap();
        let consumer = room
            .create_consumer(&recv.id, &producer.id, &rtp::router_rtp_capabilities())
            .unwrap();

        assert_eq!(consumer.kind, MediaKind::Audio);
        assert_eq!(consumer.producer_id, producer.id);
        assert_eq!(consumer.rtp_parameters, opus_parameters());
    }

    #[test]
    fn test_close_reports_cascaded_entity_counts() {
        let mut room = Room::new("r1".to_string(), 0);
        let send = room.create_transport(TransportDirection::Send, "127.0.0.1", 40_000);
        let recv = room.create_transport(TransportDirection::Recv, "127.0.0.1", 40_001);

        let producer = room
            .create_producer(&send.id, MediaKind::Video, {
                RtpParameters {
                    codecs: vec![RtpCodecParameters {
                        mime_type: rtp::MIME_TYPE_VP8.to_string(),
                        payload_type: 101,
                        clock_rate: 90_000,
                        channels: None,
                    }],
                }
            })
            .unwrap();
        room.create_consumer(&recv.id, &producer.id, &rtp::router_rtp_capabilities())
            .unwrap();

        let (transports, producers, consumers) = room.close();
        assert_eq!(transports, 2);
        assert_eq!(producers, 1);
        assert_eq!(consumers, 1);
    }

    #[test]
    fn test_minted_fingerprint_shape() {
        let dtls = mint_dtls_parameters();
        let fingerprint = dtls.fingerprints.first().unwrap();

        assert_eq!(fingerprint.algorithm, "sha-256");
        // 32 bytes -> 32 colon-separated hex pairs.
        assert_eq!(fingerprint.value.split(':').count(), 32);
    }
}
