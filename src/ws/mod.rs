//! WebSocket layer: the many-to-many topic delivery style.
//!
//! The WebSocket endpoint at `/ws` lets every client subscribe to topics
//! and publish to them; published payloads are re-broadcast verbatim to
//! all subscribers of the topic.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
