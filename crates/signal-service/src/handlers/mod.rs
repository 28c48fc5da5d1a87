//! HTTP request handlers for the signaling orchestrator.

pub mod health;

pub use health::{health_check, metrics_handler, stats};
