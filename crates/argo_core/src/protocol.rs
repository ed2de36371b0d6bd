//! Wire format exchanged with the processing service.
use serde::{Deserialize, Serialize};

use crate::geometry::{Bound, Rect};
use crate::params::QueryParameters;

/// The single outbound message of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub bounds: Rect,
    pub params: QueryParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("select a region on the map or fill in all four bounds")]
    NoBound,
    #[error("bounds are incomplete: {missing} not set")]
    Incomplete { missing: String },
    #[error("invalid bounds: north must be greater than south and east greater than west")]
    Inverted,
}

impl SearchRequest {
    /// Builds a request, refusing anything but a complete, valid bound.
    pub fn new(bound: Bound, params: QueryParameters) -> Result<Self, ValidationError> {
        if bound.is_empty() {
            return Err(ValidationError::NoBound);
        }
        let Some(rect) = bound.as_rect() else {
            let missing = crate::geometry::BoundField::ALL
                .iter()
                .filter(|field| bound.get(**field).is_none())
                .map(|field| field.name())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ValidationError::Incomplete { missing });
        };
        if !rect.is_valid() {
            return Err(ValidationError::Inverted);
        }
        Ok(Self {
            bounds: rect,
            params,
        })
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|err| ProtocolError::Encode(err.to_string()))
    }
}

/// Inbound notification from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceEvent {
    Log {
        message: String,
    },
    Error {
        message: String,
    },
    Complete {
        csv: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
}

impl ServiceEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ServiceEvent::Log { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("unknown message type '{0}'")]
    UnknownType(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
}

/// Decodes one inbound text frame.
///
/// Frames that are valid JSON objects but carry an unrecognised `type` are
/// reported as [`ProtocolError::UnknownType`] so callers can skip them.
pub fn decode_event(text: &str) -> Result<ServiceEvent, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|err| ProtocolError::Malformed(err.to_string()))?;
    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ProtocolError::Malformed("missing 'type' field".to_string()))?
        .to_string();
    if !matches!(kind.as_str(), "log" | "error" | "complete") {
        return Err(ProtocolError::UnknownType(kind));
    }
    serde_json::from_value(value).map_err(|err| ProtocolError::Malformed(err.to_string()))
}
