use std::fmt;
use std::time::Duration;

use argo_core::SessionId;

/// Notification from the transport thread, in arrival order per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened { session: SessionId },
    Message { session: SessionId, text: String },
    Failed { session: SessionId, reason: String },
    Closed { session: SessionId },
}

impl TransportEvent {
    pub fn session(&self) -> SessionId {
        match self {
            TransportEvent::Opened { session }
            | TransportEvent::Message { session, .. }
            | TransportEvent::Failed { session, .. }
            | TransportEvent::Closed { session } => *session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Session-oriented websocket with streamed progress.
    #[default]
    WebSocket,
    /// Single `POST` returning the CSV body.
    Http,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::WebSocket => write!(f, "websocket"),
            TransportKind::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub kind: TransportKind,
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Fail a session that stays silent this long. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    pub max_payload_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            kind: TransportKind::WebSocket,
            endpoint: "ws://127.0.0.1:8000/ws/process".to_string(),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: None,
            max_payload_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid endpoint {endpoint}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    #[error("send failed: {0}")]
    Send(String),
    #[error("receive failed: {0}")]
    Receive(String),
    #[error("no message from the service for {0:?}")]
    IdleTimeout(Duration),
    #[error("payload too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("failed to decode payload with {encoding}")]
    Decode { encoding: String },
}
