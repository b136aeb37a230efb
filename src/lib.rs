//! # fanout-gateway
//!
//! Real-time event fan-out over Server-Sent Events and WebSocket topics.
//!
//! Events consumed from a message queue are pushed to every live
//! subscriber. Subscribers whose delivery fails are evicted; they must
//! reconnect to resume. Missed events are not replayed.
//!
//! ## Architecture
//!
//! ```text
//! Producers (POST /messages)
//!     │
//!     ├── MessageQueue (queue/)
//!     ├── IngressAdapter (queue/)
//!     │
//!     ├── Broadcaster (domain/)
//!     │     ├── stream SubscriptionRegistry ──► SSE clients (sse/)
//!     │     └── TopicRegistry ────────────────► WS clients (ws/)
//!     │                                           │
//!     └───────────── topic publish ◄──────────────┘
//! ```

pub mod api;
pub mod app_state;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod queue;
pub mod server;
pub mod sse;
pub mod ws;
