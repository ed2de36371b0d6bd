use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::decode::decode_payload;
use crate::transport::{Channel, Connector};
use crate::TransportError;

/// Connects to the service's websocket endpoint.
#[derive(Debug, Clone)]
pub struct WsConnector {
    max_payload_bytes: u64,
}

impl WsConnector {
    pub fn new(max_payload_bytes: u64) -> Self {
        Self { max_payload_bytes }
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Channel>, TransportError> {
        let (stream, _response) = tokio_tungstenite::connect_async(endpoint.as_str())
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        Ok(Box::new(WsChannel {
            stream,
            max_payload_bytes: self.max_payload_bytes,
        }))
    }
}

struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    max_payload_bytes: u64,
}

impl WsChannel {
    fn check_size(&self, len: usize) -> Result<(), TransportError> {
        let len = len as u64;
        if len > self.max_payload_bytes {
            return Err(TransportError::TooLarge {
                max_bytes: self.max_payload_bytes,
                actual: Some(len),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Channel for WsChannel {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return None,
                Err(err) => return Some(Err(TransportError::Receive(err.to_string()))),
            };
            match message {
                Message::Text(text) => {
                    if let Err(err) = self.check_size(text.len()) {
                        return Some(Err(err));
                    }
                    return Some(Ok(text.to_string()));
                }
                Message::Binary(data) => {
                    if let Err(err) = self.check_size(data.len()) {
                        return Some(Err(err));
                    }
                    return Some(decode_payload(&data, None));
                }
                Message::Close(_) => return None,
                // Ping/pong are answered by tungstenite itself.
                _ => continue,
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
