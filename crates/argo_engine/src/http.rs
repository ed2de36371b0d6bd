use std::collections::VecDeque;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use serde_json::json;
use url::Url;

use crate::decode::decode_payload;
use crate::transport::{Channel, Connector};
use crate::TransportError;

/// Talks to the service's plain `POST /api/process` endpoint and replays the
/// response as the same `log` / `complete` / `error` frames the websocket
/// endpoint streams.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    connect_timeout: Duration,
    max_payload_bytes: u64,
}

impl HttpConnector {
    pub fn new(connect_timeout: Duration, max_payload_bytes: u64) -> Self {
        Self {
            connect_timeout,
            max_payload_bytes,
        }
    }
}

#[async_trait::async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn Channel>, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        Ok(Box::new(HttpChannel {
            client,
            endpoint: endpoint.clone(),
            max_payload_bytes: self.max_payload_bytes,
            request: None,
            frames: VecDeque::new(),
            finished: false,
        }))
    }
}

struct HttpChannel {
    client: reqwest::Client,
    endpoint: Url,
    max_payload_bytes: u64,
    request: Option<String>,
    frames: VecDeque<String>,
    finished: bool,
}

impl HttpChannel {
    async fn post(&self, body: String) -> Result<Vec<String>, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/csv")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let mut frames = vec![log_frame(format!(
            "Service at {} answered {status}",
            self.endpoint
        ))];

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = service_detail(&text).unwrap_or_else(|| status.to_string());
            frames.push(json!({ "type": "error", "message": message }).to_string());
            return Ok(frames);
        }

        if let Some(len) = response.content_length() {
            if len > self.max_payload_bytes {
                return Err(TransportError::TooLarge {
                    max_bytes: self.max_payload_bytes,
                    actual: Some(len),
                });
            }
        }

        let content_type = header_string(&response, CONTENT_TYPE);
        let filename =
            header_string(&response, CONTENT_DISPOSITION).and_then(|v| attachment_filename(&v));

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_payload_bytes {
                return Err(TransportError::TooLarge {
                    max_bytes: self.max_payload_bytes,
                    actual: Some(next_len),
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let csv = decode_payload(&bytes, content_type.as_deref())?;
        frames.push(json!({ "type": "complete", "csv": csv, "filename": filename }).to_string());
        Ok(frames)
    }
}

#[async_trait::async_trait]
impl Channel for HttpChannel {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        if self.finished || self.request.is_some() {
            return Err(TransportError::Send(
                "request already sent on this channel".to_string(),
            ));
        }
        self.request = Some(text);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        if let Some(frame) = self.frames.pop_front() {
            return Some(Ok(frame));
        }
        if self.finished {
            return None;
        }
        let Some(body) = self.request.take() else {
            // Nothing to do until the request is sent.
            return std::future::pending().await;
        };
        self.finished = true;
        match self.post(body).await {
            Ok(frames) => {
                self.frames.extend(frames);
                self.frames.pop_front().map(Ok)
            }
            Err(err) => Some(Err(err)),
        }
    }

    async fn close(&mut self) {
        self.finished = true;
        self.request = None;
        self.frames.clear();
    }
}

fn log_frame(message: String) -> String {
    json!({ "type": "log", "message": message }).to_string()
}

fn header_string(
    response: &reqwest::Response,
    name: reqwest::header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

/// `{"detail": "..."}` bodies carry the service's own error text.
fn service_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

fn attachment_filename(disposition: &str) -> Option<String> {
    disposition.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = value.trim().trim_matches('"').trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_connect() || err.is_timeout() {
        return TransportError::Connect(err.to_string());
    }
    TransportError::Receive(err.to_string())
}
