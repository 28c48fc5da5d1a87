//! HTTP request handlers for the media control plane.

pub mod health;
pub mod media;
pub mod rooms;

pub use health::{health_check, metrics_handler, stats};
pub use media::{connect_transport, create_consumer, create_producer, create_transport};
pub use rooms::{create_room, delete_room, get_room};
