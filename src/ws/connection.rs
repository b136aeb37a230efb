//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection:
//! dispatching topic commands from the client and forwarding events the
//! broadcaster delivered to the connection's handle.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{TopicEvent, WsCommand, WsMessage, WsMessageType};
use super::subscription::{TopicSubscriptions, is_valid_topic};
use crate::domain::{Broadcaster, ChannelSubscriber, Event};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events delivered to this connection's handle.
/// - Ends when the client leaves, the socket errors, or the handle is
///   evicted after a failed delivery.
pub async fn run_connection(
    socket: WebSocket,
    broadcaster: Broadcaster,
    buffer: usize,
    delivery_timeout: Duration,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut event_rx) = ChannelSubscriber::new(buffer, delivery_timeout);
    let mut subs = TopicSubscriptions::new(Arc::new(handle), Arc::clone(broadcaster.topics()));
    tracing::info!(subscriber = %subs.id(), "ws client connected");

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let handled = handle_while_forwarding(
                            &text,
                            &mut subs,
                            &broadcaster,
                            &mut event_rx,
                            &mut ws_tx,
                        )
                        .await;
                        let Ok(response) = handled else {
                            subs.error("failed to write event");
                            break;
                        };
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                subs.error("failed to write response");
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        subs.complete();
                        break;
                    }
                    Some(Err(err)) => {
                        subs.error(err.to_string());
                        break;
                    }
                    _ => {}
                }
            }
            // Event delivered by the broadcaster
            event = event_rx.recv() => {
                match event {
                    Some(event) => {
                        if ws_tx.send(Message::text(event_message(&event))).await.is_err() {
                            subs.error("failed to write event");
                            break;
                        }
                    }
                    None => {
                        subs.error("evicted after failed delivery");
                        break;
                    }
                }
            }
        }
    }

    let _ = ws_tx.close().await;
    tracing::debug!(subscriber = %subs.id(), "ws connection closed");
}

/// Serializes a delivered event as an `event` envelope.
fn event_message(event: &Event) -> String {
    let payload = TopicEvent {
        topic: event.topic().unwrap_or_default().to_string(),
        data: event.payload().clone(),
    };
    let msg = WsMessage::new(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        serde_json::to_value(&payload).unwrap_or_default(),
    );
    serde_json::to_string(&msg).unwrap_or_default()
}

/// Handles a client command while still forwarding this connection's
/// own events to `ws_tx`.
///
/// A publish to a topic the connection itself joined waits for room in
/// its own channel; draining here keeps it from timing out on itself.
async fn handle_while_forwarding<S>(
    text: &str,
    subs: &mut TopicSubscriptions,
    broadcaster: &Broadcaster,
    event_rx: &mut mpsc::Receiver<Event>,
    ws_tx: &mut S,
) -> Result<Option<String>, S::Error>
where
    S: Sink<Message> + Unpin,
{
    let reply = handle_text_message(text, subs, broadcaster);
    tokio::pin!(reply);

    loop {
        tokio::select! {
            response = &mut reply => return Ok(response),
            Some(event) = event_rx.recv() => {
                ws_tx.send(Message::text(event_message(&event))).await?;
            }
        }
    }
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut TopicSubscriptions,
    broadcaster: &Broadcaster,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON"))
            .ok();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { topics } => {
            let subscribed = subs.subscribe(&topics);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": subscribed,
                    "topics": subs.topics(),
                    "count": subs.count(),
                }),
            )
        }
        WsCommand::Unsubscribe { topics } => {
            let unsubscribed = subs.unsubscribe(&topics);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": unsubscribed,
                    "remaining_count": subs.count(),
                }),
            )
        }
        WsCommand::Publish { topic, data } => {
            if !is_valid_topic(&topic) {
                return serde_json::to_string(&WsMessage::error(msg.id, 400, "invalid topic"))
                    .ok();
            }
            let report = broadcaster.publish_to_topic(&topic, &Event::new(data)).await;
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "published": topic,
                    "delivered": report.delivered,
                    "evicted": report.evicted,
                }),
            )
        }
    };
    serde_json::to_string(&response).ok()
}
