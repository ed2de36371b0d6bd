use std::sync::mpsc;

use url::Url;

use crate::{TransportError, TransportEvent, TransportKind};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: TransportEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<TransportEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<TransportEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: TransportEvent) {
        let _ = self.tx.send(event);
    }
}

/// Opens one bidirectional text channel per session.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Channel>, TransportError>;
}

#[async_trait::async_trait]
pub trait Channel: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Next inbound text frame; `None` once the peer has closed.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    async fn close(&mut self);
}

/// Parses the endpoint and checks its scheme against the transport kind.
pub fn parse_endpoint(endpoint: &str, kind: TransportKind) -> Result<Url, TransportError> {
    let url = Url::parse(endpoint.trim()).map_err(|err| TransportError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    })?;
    let allowed: &[&str] = match kind {
        TransportKind::WebSocket => &["ws", "wss"],
        TransportKind::Http => &["http", "https"],
    };
    if !allowed.contains(&url.scheme()) {
        return Err(TransportError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: format!("scheme '{}' not usable for {kind} transport", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::parse_endpoint;
    use crate::TransportKind;

    #[test]
    fn scheme_must_match_transport() {
        assert!(parse_endpoint("ws://localhost:8000/ws", TransportKind::WebSocket).is_ok());
        assert!(parse_endpoint("http://localhost:8000/api/process", TransportKind::Http).is_ok());
        assert!(parse_endpoint("http://localhost:8000/ws", TransportKind::WebSocket).is_err());
        assert!(parse_endpoint("not a url", TransportKind::Http).is_err());
    }
}
