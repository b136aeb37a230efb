//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparseable values fall
//! back to the defaults listed on [`GatewayConfig`].

use std::net::SocketAddr;
use std::time::Duration;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Name of the queue topic the ingress adapter consumes.
    pub queue_topic: String,

    /// Maximum number of records buffered in the queue.
    pub queue_capacity: usize,

    /// Per-subscriber channel depth.
    pub subscriber_buffer: usize,

    /// Upper bound on a single delivery attempt.
    pub delivery_timeout: Duration,

    /// Lifetime of an SSE stream before the timeout hook fires.
    /// `None` keeps streams open until the client leaves.
    pub sse_timeout: Option<Duration>,

    /// Interval between SSE keep-alive comments.
    pub sse_keep_alive: Duration,

    /// Topic that also receives every queue event, if enabled.
    pub ingress_topic: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            queue_topic: "messages".to_string(),
            queue_capacity: 1024,
            subscriber_buffer: 64,
            delivery_timeout: Duration::from_millis(250),
            sse_timeout: None,
            sse_keep_alive: Duration::from_secs(15),
            ingress_topic: Some("chat".to_string()),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.listen_addr,
        };

        let queue_topic = std::env::var("QUEUE_TOPIC").unwrap_or(defaults.queue_topic);
        let queue_capacity = parse_env("QUEUE_CAPACITY", defaults.queue_capacity);
        let subscriber_buffer = parse_env("SUBSCRIBER_BUFFER", defaults.subscriber_buffer);
        let delivery_timeout = Duration::from_millis(parse_env("DELIVERY_TIMEOUT_MS", 250));

        let sse_timeout = match parse_env::<u64>("SSE_TIMEOUT_SECS", 0) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let sse_keep_alive = Duration::from_secs(parse_env("SSE_KEEP_ALIVE_SECS", 15));

        let ingress_topic = if parse_env_bool("INGRESS_TO_TOPIC_ENABLED", true) {
            Some(std::env::var("INGRESS_TOPIC").unwrap_or_else(|_| "chat".to_string()))
        } else {
            None
        };

        Ok(Self {
            listen_addr,
            queue_topic,
            queue_capacity,
            subscriber_buffer,
            delivery_timeout,
            sse_timeout,
            sse_keep_alive,
            ingress_topic,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
