//! Axum SSE handler and the per-subscriber event stream.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures_util::Stream;
use tokio::sync::mpsc;

use crate::app_state::AppState;
use crate::domain::{ChannelSubscriber, Event, SubscriptionGuard};

/// SSE event name used for every fanned-out payload.
pub const EVENT_NAME: &str = "message";

/// `GET /view-messages-sse` — Subscribe to the event stream.
pub async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let (handle, receiver) =
        ChannelSubscriber::new(state.config.subscriber_buffer, state.config.delivery_timeout);
    let guard = SubscriptionGuard::register(
        Arc::clone(state.broadcaster.stream()),
        Arc::new(handle),
    );
    tracing::info!(subscriber = %guard.id(), "sse subscriber connected");

    let stream = subscriber_stream(guard, receiver, state.config.sse_timeout);
    Sse::new(stream).keep_alive(KeepAlive::new().interval(state.config.sse_keep_alive))
}

/// Turns a registered subscription into an SSE event stream.
///
/// The stream ends when the handle is closed (eviction or shutdown),
/// firing the completion hook, or when `lifetime` elapses, firing the
/// timeout hook. If the client goes away first, dropping the stream
/// drops the guard, which completes the subscription.
pub fn subscriber_stream(
    mut guard: SubscriptionGuard,
    mut receiver: mpsc::Receiver<Event>,
    lifetime: Option<Duration>,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    async_stream::stream! {
        let expiry = async move {
            match lifetime {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiry);

        loop {
            let next = tokio::select! {
                received = receiver.recv() => Some(received),
                () = &mut expiry => None,
            };
            match next {
                Some(Some(event)) => yield Ok(render(&event)),
                Some(None) => {
                    guard.complete();
                    break;
                }
                None => {
                    guard.timeout();
                    break;
                }
            }
        }
    }
}

fn render(event: &Event) -> SseEvent {
    SseEvent::default()
        .event(EVENT_NAME)
        .data(event.payload_text())
}
