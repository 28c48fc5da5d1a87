//! Observability for the media control plane.

pub mod metrics;
