//! End-to-end tests of the WebSocket topic channel.

#![allow(clippy::panic)]

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr) -> Client {
    let Ok((ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("websocket handshake failed");
    };
    ws
}

async fn send_command(ws: &mut Client, id: &str, payload: serde_json::Value) {
    let msg = serde_json::json!({
        "id": id,
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": payload,
    });
    if ws.send(Message::text(msg.to_string())).await.is_err() {
        panic!("failed to send command");
    }
}

/// Reads frames until one with the given envelope `type` arrives.
async fn next_of_type(ws: &mut Client, msg_type: &str) -> serde_json::Value {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), ws.next()).await;
        let Ok(Some(Ok(frame))) = next else {
            panic!("no {msg_type} message received");
        };
        let Message::Text(text) = frame else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(text.as_str()) else {
            panic!("server sent invalid JSON");
        };
        if value["type"] == msg_type {
            return value;
        }
    }
}

async fn subscribe(ws: &mut Client, topics: &[&str]) -> serde_json::Value {
    send_command(ws, "sub", serde_json::json!({"command": "subscribe", "topics": topics})).await;
    next_of_type(ws, "response").await
}

#[tokio::test]
async fn topic_publish_is_rebroadcast_to_all_subscribers() {
    let (addr, _state) = common::spawn_gateway(common::test_config()).await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    subscribe(&mut alice, &["room"]).await;
    let ack = subscribe(&mut bob, &["room"]).await;
    assert_eq!(ack["payload"]["topics"], serde_json::json!(["room"]));

    let data = serde_json::json!({"text": "hi", "from": "alice"});
    send_command(
        &mut alice,
        "pub-1",
        serde_json::json!({"command": "publish", "topic": "room", "data": data}),
    )
    .await;

    let response = next_of_type(&mut alice, "response").await;
    assert_eq!(response["id"], "pub-1");
    assert_eq!(response["payload"]["delivered"], 2);

    for ws in [&mut alice, &mut bob] {
        let event = next_of_type(ws, "event").await;
        assert_eq!(event["payload"]["topic"], "room");
        assert_eq!(event["payload"]["data"], data);
    }
}

#[tokio::test]
async fn queue_events_reach_ingress_topic() {
    let (addr, _state) = common::spawn_gateway(common::test_config()).await;
    let mut ws = connect(addr).await;
    subscribe(&mut ws, &["chat"]).await;

    let client = reqwest::Client::new();
    let Ok(response) = client
        .post(format!("http://{addr}/messages"))
        .json(&serde_json::json!({"payload": "E1"}))
        .send()
        .await
    else {
        panic!("publish request failed");
    };
    assert!(response.status().is_success());

    let event = next_of_type(&mut ws, "event").await;
    assert_eq!(event["payload"]["topic"], "chat");
    assert_eq!(event["payload"]["data"], "E1");
}

#[tokio::test]
async fn closing_socket_leaves_topics() {
    let (addr, state) = common::spawn_gateway(common::test_config()).await;
    let mut ws = connect(addr).await;
    subscribe(&mut ws, &["chat", "news"]).await;
    assert_eq!(state.broadcaster.topics().len(), 2);

    if ws.close(None).await.is_err() {
        panic!("close failed");
    }

    assert!(common::eventually(|| state.broadcaster.topics().is_empty()).await);
}

#[tokio::test]
async fn malformed_frame_gets_error_reply() {
    let (addr, _state) = common::spawn_gateway(common::test_config()).await;
    let mut ws = connect(addr).await;

    if ws.send(Message::text("{not json")).await.is_err() {
        panic!("failed to send frame");
    }

    let error = next_of_type(&mut ws, "error").await;
    assert_eq!(error["payload"]["code"], 400);
}
