//! The signaling event router.
//!
//! Owns all room presence state and drives the media control API.
//! Events from a single connection are handled in arrival order by the
//! connection's read loop; the room map mutex is scoped strictly to map
//! mutation and is never held across an await.

use crate::errors::SignalError;
use crate::events::{ClientEvent, Outbound, ServerEvent};
use crate::media::MediaApi;
use crate::observability::metrics;
use crate::presence::{ChatMessage, OwnedProducer, Participant, RoomPresence};
use chrono::Utc;
use common::types::TransportDirection;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A connected client, as seen by the router.
pub struct Connection {
    pub connection_id: String,
    pub outbound: UnboundedSender<Outbound>,
}

/// Aggregate counts reported by the stats endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SignalStats {
    pub rooms: usize,
    pub participants: usize,
    pub messages: usize,
}

/// Shared signaling state: the room presence map plus the media client.
pub struct SignalingState {
    rooms: Mutex<HashMap<String, RoomPresence>>,
    media: Arc<dyn MediaApi>,
}

fn broadcast(senders: &[UnboundedSender<Outbound>], event: ServerEvent) {
    for tx in senders {
        // A closed channel means the peer is tearing down; its own
        // disconnect path handles cleanup.
        let _ = tx.send(Outbound::Event(event.clone()));
    }
}

impl SignalingState {
    pub fn new(media: Arc<dyn MediaApi>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            media,
        }
    }

    pub async fn stats(&self) -> SignalStats {
        let rooms = self.rooms.lock().await;
        SignalStats {
            rooms: rooms.len(),
            participants: rooms.values().map(|r| r.participants.len()).sum(),
            messages: rooms.values().map(|r| r.messages.len()).sum(),
        }
    }

    /// Dispatch a single client event and produce its ack payload.
    #[tracing::instrument(skip(self, conn, event), fields(connection_id = %conn.connection_id, event = event.label()))]
    pub async fn handle_event(
        &self,
        conn: &Connection,
        event: ClientEvent,
    ) -> Result<serde_json::Value, SignalError> {
        let label = event.label();
        let result = self.dispatch(conn, event).await;

        match &result {
            Ok(_) => metrics::record_event(label, "success"),
            Err(e) => {
                metrics::record_event(label, e.error_type_label());
                tracing::warn!(
                    connection_id = %conn.connection_id,
                    event = label,
                    error = %e,
                    "Event failed"
                );
            }
        }

        result
    }

    async fn dispatch(
        &self,
        conn: &Connection,
        event: ClientEvent,
    ) -> Result<serde_json::Value, SignalError> {
        match event {
            ClientEvent::Join {
                room_id,
                user_id,
                display_name,
                role,
            } => self.join(conn, room_id, user_id, display_name, role).await,
            ClientEvent::Leave { room_id, .. } => self.leave(conn, &room_id).await,
            ClientEvent::RaiseHand {
                room_id,
                raised_hand,
            } => self.raise_hand(conn, &room_id, raised_hand).await,
            ClientEvent::Chat { room_id, message } => self.chat(conn, &room_id, message).await,
            ClientEvent::CreateTransport { room_id, direction } => {
                self.create_transport(conn, &room_id, direction).await
            }
            ClientEvent::ConnectTransport {
                room_id,
                transport_id,
                dtls_parameters,
            } => {
                self.connect_transport(conn, &room_id, &transport_id, dtls_parameters)
                    .await
            }
            ClientEvent::Produce {
                room_id,
                transport_id,
                kind,
                rtp_parameters,
            } => {
                self.produce(conn, &room_id, &transport_id, kind, rtp_parameters)
                    .await
            }
            ClientEvent::Consume {
                room_id,
                transport_id,
                producer_id,
                rtp_capabilities,
            } => {
                self.consume(conn, &room_id, &transport_id, &producer_id, rtp_capabilities)
                    .await
            }
        }
    }

    async fn join(
        &self,
        conn: &Connection,
        room_id: String,
        user_id: String,
        display_name: String,
        role: crate::events::Role,
    ) -> Result<serde_json::Value, SignalError> {
        if room_id.trim().is_empty() {
            return Err(SignalError::InvalidInput("roomId must not be empty".to_string()));
        }
        if user_id.trim().is_empty() {
            return Err(SignalError::InvalidInput("userId must not be empty".to_string()));
        }

        let (roster, messages, cached_caps, peers, fetch_caps) = {
            let mut rooms = self.rooms.lock().await;
            let room = rooms
                .entry(room_id.clone())
                .or_insert_with(|| RoomPresence::new(room_id.clone()));

            // Create-or-update: a re-join on the same connection refreshes
            // the identity fields but keeps the media state. Producers and
            // transports still live in the engine, and peers were never
            // told they went away.
            match room.participants.get_mut(&conn.connection_id) {
                Some(existing) => {
                    existing.user_id = user_id.clone();
                    existing.display_name = display_name.clone();
                    existing.role = role;
                }
                None => {
                    room.participants.insert(
                        conn.connection_id.clone(),
                        Participant {
                            user_id: user_id.clone(),
                            connection_id: conn.connection_id.clone(),
                            display_name: display_name.clone(),
                            role,
                            raised_hand: false,
                            joined_at: Utc::now(),
                            producers: Vec::new(),
                            send_transport_id: None,
                            recv_transport_id: None,
                            outbound: conn.outbound.clone(),
                        },
                    );
                }
            }

            let fetch_caps =
                room.router_capabilities.is_none() && !room.capabilities_fetch_in_flight;
            if fetch_caps {
                room.capabilities_fetch_in_flight = true;
            }

            (
                room.snapshot(&conn.connection_id),
                room.messages.iter().cloned().collect::<Vec<_>>(),
                room.router_capabilities.clone(),
                room.senders_except(&conn.connection_id),
                fetch_caps,
            )
        };

        metrics::record_join(&room_id);
        tracing::info!(room_id = %room_id, user_id = %user_id, "Participant joined");

        broadcast(
            &peers,
            ServerEvent::PeerJoined {
                user_id,
                display_name,
                role,
            },
        );

        if fetch_caps {
            self.fetch_router_capabilities(&room_id).await;
        }

        // Re-read the cache in case our own fetch just populated it.
        let caps = match cached_caps {
            Some(caps) => Some(caps),
            None => {
                let rooms = self.rooms.lock().await;
                rooms
                    .get(&room_id)
                    .and_then(|r| r.router_capabilities.clone())
            }
        };

        Ok(serde_json::json!({
            "roomId": room_id,
            "peers": roster,
            "messages": messages,
            "rtpCapabilities": caps,
        }))
    }

    /// Fetch router capabilities from the media engine and fan them out.
    /// Exactly one fetch runs per room at a time; a failure clears the
    /// in-flight flag so the next join retries.
    async fn fetch_router_capabilities(&self, room_id: &str) {
        let result = self.media.create_room(room_id).await;

        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(room_id) else {
            // Everyone left while the fetch was outstanding.
            return;
        };
        room.capabilities_fetch_in_flight = false;

        match result {
            Ok(info) => {
                room.router_capabilities = Some(info.router_capabilities.clone());
                let senders = room.senders();
                drop(rooms);
                broadcast(
                    &senders,
                    ServerEvent::RouterCapabilities {
                        router_capabilities: info.router_capabilities,
                    },
                );
            }
            Err(e) => {
                tracing::warn!(room_id = %room_id, error = %e, "Router capabilities fetch failed");
            }
        }
    }

    async fn leave(&self, conn: &Connection, room_id: &str) -> Result<serde_json::Value, SignalError> {
        let removed = self.remove_participant(room_id, &conn.connection_id).await;
        if removed {
            Ok(serde_json::json!({"roomId": room_id}))
        } else {
            Err(SignalError::NotFound("Not a participant of this room".to_string()))
        }
    }

    /// Remove a connection from every room it occupies. Invoked when the
    /// socket closes without an explicit leave.
    pub async fn handle_disconnect(&self, connection_id: &str) {
        let room_ids: Vec<String> = {
            let rooms = self.rooms.lock().await;
            rooms
                .values()
                .filter(|r| r.participants.contains_key(connection_id))
                .map(|r| r.room_id.clone())
                .collect()
        };

        for room_id in room_ids {
            self.remove_participant(&room_id, connection_id).await;
        }
    }

    /// Remove one participant, announce their departure, and close the
    /// room upstream when it empties. Returns false when the connection
    /// was not a participant.
    async fn remove_participant(&self, room_id: &str, connection_id: &str) -> bool {
        let (participant, peers, room_emptied) = {
            let mut rooms = self.rooms.lock().await;
            let Some(room) = rooms.get_mut(room_id) else {
                return false;
            };
            let Some(participant) = room.participants.remove(connection_id) else {
                return false;
            };

            let peers = room.senders();
            let emptied = room.participants.is_empty();
            if emptied {
                rooms.remove(room_id);
            }
            (participant, peers, emptied)
        };

        metrics::record_leave(room_id);
        tracing::info!(
            room_id = %room_id,
            user_id = %participant.user_id,
            producers = participant.producers.len(),
            "Participant left"
        );

        for producer in &participant.producers {
            broadcast(
                &peers,
                ServerEvent::ProducerRemoved {
                    producer_id: producer.id.clone(),
                },
            );
        }
        broadcast(
            &peers,
            ServerEvent::PeerLeft {
                user_id: participant.user_id.clone(),
            },
        );

        if room_emptied {
            // Best effort: the media engine tears down the room's
            // transports, producers and consumers.
            if let Err(e) = self.media.close_room(room_id).await {
                tracing::warn!(room_id = %room_id, error = %e, "Upstream room close failed");
            }
        }

        true
    }

    async fn raise_hand(
        &self,
        conn: &Connection,
        room_id: &str,
        raised_hand: bool,
    ) -> Result<serde_json::Value, SignalError> {
        let (user_id, everyone) = {
            let mut rooms = self.rooms.lock().await;
            let room = rooms
                .get_mut(room_id)
                .ok_or_else(|| SignalError::NotFound("Room not found".to_string()))?;
            let participant = room
                .participants
                .get_mut(&conn.connection_id)
                .ok_or_else(|| SignalError::NotFound("Not a participant of this room".to_string()))?;

            participant.raised_hand = raised_hand;
            (participant.user_id.clone(), room.senders())
        };

        broadcast(
            &everyone,
            ServerEvent::HandRaised {
                user_id,
                raised_hand,
            },
        );

        Ok(serde_json::json!({"raisedHand": raised_hand}))
    }

    async fn chat(
        &self,
        conn: &Connection,
        room_id: &str,
        message: String,
    ) -> Result<serde_json::Value, SignalError> {
        if message.trim().is_empty() {
            return Err(SignalError::InvalidInput("Message must not be empty".to_string()));
        }

        let (stored, everyone) = {
            let mut rooms = self.rooms.lock().await;
            let room = rooms
                .get_mut(room_id)
                .ok_or_else(|| SignalError::NotFound("Room not found".to_string()))?;
            let participant = room
                .participants
                .get(&conn.connection_id)
                .ok_or_else(|| SignalError::NotFound("Not a participant of this room".to_string()))?;

            let stored = ChatMessage {
                id: Uuid::new_v4().to_string(),
                room_id: room_id.to_string(),
                user_id: participant.user_id.clone(),
                display_name: participant.display_name.clone(),
                message,
                created_at: Utc::now(),
            };
            room.push_message(stored.clone());
            (stored, room.senders())
        };

        metrics::record_chat_message(room_id);

        broadcast(&everyone, ServerEvent::Chat(stored.clone()));

        Ok(serde_json::json!({"messageId": stored.id}))
    }

    /// Confirm the connection participates in the room, returning its
    /// user id.
    async fn require_membership(
        &self,
        room_id: &str,
        connection_id: &str,
    ) -> Result<String, SignalError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .and_then(|r| r.participants.get(connection_id))
            .map(|p| p.user_id.clone())
            .ok_or_else(|| SignalError::NotFound("Not a participant of this room".to_string()))
    }

    async fn create_transport(
        &self,
        conn: &Connection,
        room_id: &str,
        direction: TransportDirection,
    ) -> Result<serde_json::Value, SignalError> {
        {
            let rooms = self.rooms.lock().await;
            let participant = rooms
                .get(room_id)
                .and_then(|r| r.participants.get(&conn.connection_id))
                .ok_or_else(|| SignalError::NotFound("Not a participant of this room".to_string()))?;

            let existing = match direction {
                TransportDirection::Send => &participant.send_transport_id,
                TransportDirection::Recv => &participant.recv_transport_id,
            };
            if existing.is_some() {
                return Err(SignalError::InvalidInput(
                    "Transport for this direction already exists".to_string(),
                ));
            }
        }

        let transport = self.media.create_transport(room_id, direction).await?;

        {
            let mut rooms = self.rooms.lock().await;
            if let Some(participant) = rooms
                .get_mut(room_id)
                .and_then(|r| r.participants.get_mut(&conn.connection_id))
            {
                match direction {
                    TransportDirection::Send => {
                        participant.send_transport_id = Some(transport.id.clone());
                    }
                    TransportDirection::Recv => {
                        participant.recv_transport_id = Some(transport.id.clone());
                    }
                }
            }
        }

        Ok(serde_json::json!({"transport": transport}))
    }

    async fn connect_transport(
        &self,
        conn: &Connection,
        room_id: &str,
        transport_id: &str,
        dtls_parameters: common::rtp::DtlsParameters,
    ) -> Result<serde_json::Value, SignalError> {
        self.require_owned_transport(room_id, &conn.connection_id, transport_id)
            .await?;

        self.media
            .connect_transport(room_id, transport_id, dtls_parameters)
            .await?;

        Ok(serde_json::json!({"connected": true}))
    }

    /// Confirm the transport belongs to this connection.
    async fn require_owned_transport(
        &self,
        room_id: &str,
        connection_id: &str,
        transport_id: &str,
    ) -> Result<(), SignalError> {
        let rooms = self.rooms.lock().await;
        let participant = rooms
            .get(room_id)
            .and_then(|r| r.participants.get(connection_id))
            .ok_or_else(|| SignalError::NotFound("Not a participant of this room".to_string()))?;

        let owned = participant.send_transport_id.as_deref() == Some(transport_id)
            || participant.recv_transport_id.as_deref() == Some(transport_id);
        if owned {
            Ok(())
        } else {
            Err(SignalError::NotFound("Transport not found".to_string()))
        }
    }

    async fn produce(
        &self,
        conn: &Connection,
        room_id: &str,
        transport_id: &str,
        kind: common::types::MediaKind,
        rtp_parameters: common::rtp::RtpParameters,
    ) -> Result<serde_json::Value, SignalError> {
        {
            let rooms = self.rooms.lock().await;
            let participant = rooms
                .get(room_id)
                .and_then(|r| r.participants.get(&conn.connection_id))
                .ok_or_else(|| SignalError::NotFound("Not a participant of this room".to_string()))?;

            if participant.send_transport_id.as_deref() != Some(transport_id) {
                return Err(SignalError::InvalidInput(
                    "Producing requires the send transport".to_string(),
                ));
            }
        }

        let producer = self
            .media
            .create_producer(room_id, transport_id, kind, rtp_parameters)
            .await?;

        let (user_id, peers) = {
            let mut rooms = self.rooms.lock().await;
            let room = rooms
                .get_mut(room_id)
                .ok_or_else(|| SignalError::NotFound("Room not found".to_string()))?;
            let Some(participant) = room.participants.get_mut(&conn.connection_id) else {
                // Disconnected during the upstream call; the producer is
                // cleaned up when the room closes.
                return Err(SignalError::NotFound(
                    "Not a participant of this room".to_string(),
                ));
            };

            participant.producers.push(OwnedProducer {
                id: producer.id.clone(),
                kind: producer.kind,
            });
            (
                participant.user_id.clone(),
                room.senders_except(&conn.connection_id),
            )
        };

        metrics::record_producer_announced(kind.as_str());

        broadcast(
            &peers,
            ServerEvent::ProducerAdded {
                id: producer.id.clone(),
                user_id,
                kind: producer.kind,
            },
        );

        Ok(serde_json::json!({"producer": producer}))
    }

    async fn consume(
        &self,
        conn: &Connection,
        room_id: &str,
        transport_id: &str,
        producer_id: &str,
        rtp_capabilities: common::rtp::RtpCapabilities,
    ) -> Result<serde_json::Value, SignalError> {
        {
            let rooms = self.rooms.lock().await;
            let participant = rooms
                .get(room_id)
                .and_then(|r| r.participants.get(&conn.connection_id))
                .ok_or_else(|| SignalError::NotFound("Not a participant of this room".to_string()))?;

            if participant.recv_transport_id.as_deref() != Some(transport_id) {
                return Err(SignalError::InvalidInput(
                    "Consuming requires the receive transport".to_string(),
                ));
            }
        }

        let consumer = self
            .media
            .create_consumer(room_id, transport_id, producer_id, rtp_capabilities)
            .await?;

        Ok(serde_json::json!({"consumer": consumer}))
    }
}
