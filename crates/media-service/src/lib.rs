//! Media Engine Control Plane
//!
//! Control-plane service for the Greenroom selective-forwarding media
//! engine. It owns a fixed pool of media workers, assigns rooms to workers
//! round-robin, creates one router per room with a fixed codec profile,
//! and manages the transport/producer/consumer lifecycle. Packet
//! forwarding itself happens below this layer; this service only brokers
//! the negotiation state.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> engine/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `engine` - Worker pool, room registry and media lifecycle
//! - `handlers` - HTTP request handlers
//! - `models` - Request/response wire types
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup

pub mod config;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod routes;
