//! Common wire types shared between the Greenroom signaling orchestrator
//! and the media-engine control plane.
//!
//! Both services serialize these types with camelCase field names, so the
//! control API responses produced by `media-service` deserialize directly
//! into the same structs on the `signal-service` side.

#![warn(clippy::pedantic)]

/// Module for media kinds, transport directions and control API DTOs
pub mod types;

/// Module for the RTP capability model and the fixed router codec profile
pub mod rtp;
