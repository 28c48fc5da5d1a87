//! Worker pool, room registry and media lifecycle.
//!
//! [`MediaEngine`] is the process-scoped context that owns the fixed
//! worker pool and the authoritative room map. It is the single entry
//! point for every control-plane mutation, so tests can run multiple
//! independent engines without shared globals.
//!
//! The room map is guarded by a mutex scoped strictly to map mutation;
//! no lock is ever held across an await point.

pub mod room;
pub mod worker;

use crate::config::Config;
use crate::errors::MediaError;
use common::rtp::{DtlsParameters, RtpCapabilities, RtpParameters};
use common::types::{ConsumerInfo, MediaKind, ProducerInfo, RoomInfo, TransportDirection, TransportInfo};
use room::Room;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use uuid::Uuid;
use worker::WorkerPool;

/// Spread of UDP ports minted for ICE candidates above the base port.
const RTC_PORT_RANGE: u32 = 20_000;

/// Engine-wide counters reported by `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub workers: usize,
    pub rooms: usize,
}

/// The media-engine control plane context.
pub struct MediaEngine {
    pool: WorkerPool,
    rooms: Mutex<HashMap<String, Room>>,
    announced_ip: String,
    rtc_port_base: u16,
    next_port_offset: AtomicU32,
}

impl MediaEngine {
    /// Create the engine with its fixed worker pool.
    ///
    /// Returns the engine and the fatal-death receiver; the binary must
    /// observe the receiver and terminate the process when a worker dies.
    pub fn new(config: &Config) -> (Self, UnboundedReceiver<usize>) {
        let (pool, fatal_rx) = WorkerPool::new(config.worker_pool_size);

        tracing::info!(
            target: "media.engine",
            workers = config.worker_pool_size,
            "Worker pool started"
        );

        (
            Self {
                pool,
                rooms: Mutex::new(HashMap::new()),
                announced_ip: config.announced_ip.clone(),
                rtc_port_base: config.rtc_port_base,
                next_port_offset: AtomicU32::new(0),
            },
            fatal_rx,
        )
    }

    /// Idempotent room creation.
    ///
    /// An existing room is returned unchanged; otherwise a worker is
    /// assigned round-robin and a router is created with the fixed codec
    /// profile. A room maps to exactly one worker for its lifetime.
    pub async fn get_or_create_room(&self, room_id: Option<String>) -> RoomInfo {
        let room_id = room_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut rooms = self.rooms.lock().await;
        if let Some(existing) = rooms.get(&room_id) {
            return existing.info();
        }

        let worker_id = self.pool.assign();
        let room = Room::new(room_id.clone(), worker_id);
        let info = room.info();
        rooms.insert(room_id.clone(), room);

        tracing::info!(
            target: "media.engine",
            room_id = %room_id,
            worker_id,
            "Room created"
        );
        crate::observability::metrics::record_room_created();

        info
    }

    /// Look up an existing room.
    pub async fn room_info(&self, room_id: &str) -> Result<RoomInfo, MediaError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(Room::info)
            .ok_or_else(|| MediaError::NotFound(format!("room {} not found", room_id)))
    }

    /// Close a room: closes the router and every transport it owns
    /// (cascading producer/consumer teardown), then removes the room.
    pub async fn close_room(&self, room_id: &str) -> Result<(), MediaError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .remove(room_id)
            .ok_or_else(|| MediaError::NotFound(format!("room {} not found", room_id)))?;

        let (transports, producers, consumers) = room.close();
        tracing::info!(
            target: "media.engine",
            room_id = %room_id,
            transports,
            producers,
            consumers,
            "Room closed"
        );
        crate::observability::metrics::record_room_closed();

        Ok(())
    }

    /// Create a per-client transport in a room.
    pub async fn create_transport(
        &self,
        room_id: &str,
        direction: TransportDirection,
    ) -> Result<TransportInfo, MediaError> {
        let port = self.next_rtc_port();

        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| MediaError::NotFound(format!("room {} not found", room_id)))?;

        let info = room.create_transport(direction, &self.announced_ip, port);
        crate::observability::metrics::record_transport_created(direction.as_str());
        Ok(info)
    }

    /// Apply the client's DTLS parameters to complete transport setup.
    pub async fn connect_transport(
        &self,
        room_id: &str,
        transport_id: &str,
        dtls_parameters: DtlsParameters,
    ) -> Result<(), MediaError> {
        if dtls_parameters.fingerprints.is_empty() {
            return Err(MediaError::InvalidInput(
                "dtlsParameters must carry at least one fingerprint".to_string(),
            ));
        }

        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| MediaError::NotFound(format!("room {} not found", room_id)))?;

        room.connect_transport(transport_id, dtls_parameters)
    }

    /// Register an inbound stream on a send transport.
    ///
    /// The engine raises no events; the caller is responsible for
    /// broadcasting producer-added to the rest of the room.
    pub async fn create_producer(
        &self,
        room_id: &str,
        transport_id: &str,
        kind: MediaKind,
        rtp_parameters: RtpParameters,
    ) -> Result<ProducerInfo, MediaError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| MediaError::NotFound(format!("room {} not found", room_id)))?;

        let info = room.create_producer(transport_id, kind, rtp_parameters)?;
        crate::observability::metrics::record_producer_created(kind.as_str());
        Ok(info)
    }

    /// Create an outbound stream towards a receiving client, gated by the
    /// capability-intersection check.
    pub async fn create_consumer(
        &self,
        room_id: &str,
        transport_id: &str,
        producer_id: &str,
        receiver_capabilities: RtpCapabilities,
    ) -> Result<ConsumerInfo, MediaError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| MediaError::NotFound(format!("room {} not found", room_id)))?;

        let info = room.create_consumer(transport_id, producer_id, &receiver_capabilities)?;
        crate::observability::metrics::record_consumer_created(info.kind.as_str());
        Ok(info)
    }

    /// Liveness counters for `GET /stats`.
    pub async fn stats(&self) -> EngineStats {
        let rooms = self.rooms.lock().await;
        EngineStats {
            workers: self.pool.len(),
            rooms: rooms.len(),
        }
    }

    /// Test-only access to the worker pool.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn next_rtc_port(&self) -> u16 {
        let offset = self.next_port_offset.fetch_add(1, Ordering::Relaxed) % RTC_PORT_RANGE;
        // RTC_PORT_RANGE keeps base + offset within u16.
        self.rtc_port_base.saturating_add(offset as u16)
    }
}
