//! Observability for the signaling orchestrator.

pub mod metrics;
