//! Server-Sent Events layer: the one-way streaming delivery style.
//!
//! `GET /view-messages-sse` registers a [`crate::domain::ChannelSubscriber`]
//! in the broadcaster's stream registry and streams every fanned-out
//! event to the client until it disconnects, times out, or is evicted.

pub mod handler;
