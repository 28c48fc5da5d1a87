//! Signaling Orchestrator
//!
//! WebSocket signaling service for Greenroom sessions. Tracks per-room
//! presence (participants, roles, hand-raise flags, bounded chat
//! history, known producers), relays media-negotiation requests to the
//! media-engine control plane, and fans resulting events out to all
//! participants of a room. This service is the sole caller of the media
//! control API; clients never reach it directly.
//!
//! # Architecture
//!
//! ```text
//! ws.rs -> router.rs -> presence.rs
//!                    -> media/client.rs (HTTP -> media-service)
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error taxonomy mapped to ack error codes
//! - `events` - Wire protocol: inbound client events, outbound events
//! - `presence` - Per-room participant and chat state
//! - `router` - The signaling event router
//! - `media` - Media control API client (trait + HTTP implementation)
//! - `ws` - WebSocket connection handling
//! - `handlers` - HTTP handlers (health, stats, metrics)
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup

pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod media;
pub mod observability;
pub mod presence;
pub mod router;
pub mod routes;
pub mod ws;
