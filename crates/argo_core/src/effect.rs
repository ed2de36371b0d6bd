use crate::{Artifact, Rect, SessionEffect, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Redraw the overlay to match the fields. The overlay reports back with
    /// a programmatic-origin change.
    RedrawOverlay(Rect),
    OpenChannel { session: SessionId },
    SendRequest { session: SessionId, payload: String },
    CloseChannel { session: SessionId },
    DeliverArtifact(Artifact),
}

impl From<SessionEffect> for Effect {
    fn from(effect: SessionEffect) -> Self {
        match effect {
            SessionEffect::Open { session } => Effect::OpenChannel { session },
            SessionEffect::Send { session, payload } => Effect::SendRequest { session, payload },
            SessionEffect::Close { session } => Effect::CloseChannel { session },
            SessionEffect::Deliver(artifact) => Effect::DeliverArtifact(artifact),
        }
    }
}
