//! Per-room presence state.
//!
//! Each room tracks its participants keyed by connection id, a bounded
//! chat history, and the cached router capabilities fetched from the
//! media engine on first join.

use crate::events::{Outbound, Role};
use chrono::{DateTime, Utc};
use common::rtp::RtpCapabilities;
use common::types::MediaKind;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc::UnboundedSender;

/// Maximum chat messages retained per room. The oldest message is
/// evicted when a new one arrives at capacity.
pub const MAX_CHAT_HISTORY: usize = 50;

/// A chat message as stored and broadcast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub display_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A producer owned by a participant, remembered so its removal can be
/// announced when the participant leaves.
#[derive(Debug, Clone)]
pub struct OwnedProducer {
    pub id: String,
    pub kind: MediaKind,
}

/// A participant's presence record.
pub struct Participant {
    pub user_id: String,
    pub connection_id: String,
    pub display_name: String,
    pub role: Role,
    pub raised_hand: bool,
    pub joined_at: DateTime<Utc>,
    pub producers: Vec<OwnedProducer>,
    pub send_transport_id: Option<String>,
    pub recv_transport_id: Option<String>,
    /// Outbound frame queue for this participant's connection.
    pub outbound: UnboundedSender<Outbound>,
}

/// The roster entry returned in join acks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    pub raised_hand: bool,
    pub producer_ids: Vec<String>,
}

/// Presence state for a single room.
pub struct RoomPresence {
    pub room_id: String,
    /// Participants keyed by connection id.
    pub participants: HashMap<String, Participant>,
    /// Bounded chat history, oldest first.
    pub messages: VecDeque<ChatMessage>,
    /// Router capabilities cached from the media engine.
    pub router_capabilities: Option<RtpCapabilities>,
    /// Set while one connection is fetching capabilities, so concurrent
    /// joins do not trigger duplicate upstream calls.
    pub capabilities_fetch_in_flight: bool,
}

impl RoomPresence {
    pub fn new(room_id: String) -> Self {
        Self {
            room_id,
            participants: HashMap::new(),
            messages: VecDeque::new(),
            router_capabilities: None,
            capabilities_fetch_in_flight: false,
        }
    }

    /// Roster snapshot, excluding the given connection.
    pub fn snapshot(&self, exclude_connection: &str) -> Vec<ParticipantSummary> {
        self.participants
            .values()
            .filter(|p| p.connection_id != exclude_connection)
            .map(|p| ParticipantSummary {
                user_id: p.user_id.clone(),
                display_name: p.display_name.clone(),
                role: p.role,
                raised_hand: p.raised_hand,
                producer_ids: p.producers.iter().map(|pr| pr.id.clone()).collect(),
            })
            .collect()
    }

    /// Outbound senders for every participant except the given
    /// connection. Used for fan-out without holding borrows on the map.
    pub fn senders_except(&self, exclude_connection: &str) -> Vec<UnboundedSender<Outbound>> {
        self.participants
            .values()
            .filter(|p| p.connection_id != exclude_connection)
            .map(|p| p.outbound.clone())
            .collect()
    }

    /// Outbound senders for every participant in the room.
    pub fn senders(&self) -> Vec<UnboundedSender<Outbound>> {
        self.participants
            .values()
            .map(|p| p.outbound.clone())
            .collect()
    }

    /// Append a chat message, evicting the oldest at capacity.
    pub fn push_message(&mut self, message: ChatMessage) {
        if self.messages.len() == MAX_CHAT_HISTORY {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn participant(connection_id: &str, user_id: &str) -> Participant {
        let (tx, _rx) = mpsc::unbounded_channel();
        Participant {
            user_id: user_id.to_string(),
            connection_id: connection_id.to_string(),
            display_name: user_id.to_uppercase(),
            role: Role::Viewer,
            raised_hand: false,
            joined_at: Utc::now(),
            producers: Vec::new(),
            send_transport_id: None,
            recv_transport_id: None,
            outbound: tx,
        }
    }

    fn message(room: &RoomPresence, n: usize) -> ChatMessage {
        ChatMessage {
            id: format!("m{n}"),
            room_id: room.room_id.clone(),
            user_id: "u1".to_string(),
            display_name: "U1".to_string(),
            message: format!("message {n}"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_excludes_self() {
        let mut room = RoomPresence::new("r1".to_string());
        room.participants
            .insert("c1".to_string(), participant("c1", "u1"));
        room.participants
            .insert("c2".to_string(), participant("c2", "u2"));

        let roster = room.snapshot("c1");
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.first().unwrap().user_id, "u2");
    }

    #[test]
    fn test_chat_history_bounded() {
        let mut room = RoomPresence::new("r1".to_string());
        for n in 0..MAX_CHAT_HISTORY + 10 {
            let msg = message(&room, n);
            room.push_message(msg);
        }

        assert_eq!(room.messages.len(), MAX_CHAT_HISTORY);
        // The 10 oldest were evicted.
        assert_eq!(room.messages.front().unwrap().id, "m10");
        assert_eq!(
            room.messages.back().unwrap().id,
            format!("m{}", MAX_CHAT_HISTORY + 9)
        );
    }

    #[test]
    fn test_senders_except_skips_connection() {
        let mut room = RoomPresence::new("r1".to_string());
        room.participants
            .insert("c1".to_string(), participant("c1", "u1"));
        room.participants
            .insert("c2".to_string(), participant("c2", "u2"));
        room.participants
            .insert("c3".to_string(), participant("c3", "u3"));

        assert_eq!(room.senders_except("c2").len(), 2);
        assert_eq!(room.senders().len(), 3);
    }

    #[test]
    fn test_chat_message_wire_shape() {
        let room = RoomPresence::new("r1".to_string());
        let msg = message(&room, 0);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["roomId"], "r1");
        assert_eq!(json["displayName"], "U1");
        assert!(json.get("createdAt").is_some());
    }
}
