//! Session protocol state machine.
//!
//! [`step`] is the pure transition function; [`SearchOrchestrator`] owns the
//! live [`JobState`] and hands out session ids. Transports are addressed only
//! through [`SessionEffect`]s, so the machine runs without a network peer.
use argo_logging::{argo_debug, argo_warn};

use crate::geometry::Bound;
use crate::params::{Category, QueryParameters};
use crate::protocol::{decode_event, ProtocolError, SearchRequest, ServiceEvent, ValidationError};

pub type SessionId = u64;

pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Could not reach the processing service. Check the connection and try again.";
pub const CONNECTION_LOST_MESSAGE: &str =
    "The connection to the processing service closed before the search finished.";
pub const PROTOCOL_FAILURE_MESSAGE: &str =
    "The processing service sent a message that could not be understood.";

/// Result payload of a successful session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub csv: String,
    /// Download name suggested by the service, if any.
    pub filename: Option<String>,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Connecting {
        session: SessionId,
        payload: String,
        category: Category,
    },
    Running {
        session: SessionId,
        category: Category,
        logs: Vec<String>,
    },
    Succeeded {
        artifact: Artifact,
        logs: Vec<String>,
    },
    Failed {
        message: String,
        logs: Vec<String>,
    },
}

impl JobState {
    /// The session whose channel is open or opening.
    pub fn live_session(&self) -> Option<SessionId> {
        match self {
            JobState::Connecting { session, .. } | JobState::Running { session, .. } => {
                Some(*session)
            }
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.live_session().is_some()
    }

    pub fn logs(&self) -> &[String] {
        match self {
            JobState::Running { logs, .. }
            | JobState::Succeeded { logs, .. }
            | JobState::Failed { logs, .. } => logs,
            JobState::Idle | JobState::Connecting { .. } => &[],
        }
    }

    fn into_logs(self) -> Vec<String> {
        match self {
            JobState::Running { logs, .. }
            | JobState::Succeeded { logs, .. }
            | JobState::Failed { logs, .. } => logs,
            JobState::Idle | JobState::Connecting { .. } => Vec::new(),
        }
    }
}

/// Input to the state machine: user intents and transport notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Submit {
        session: SessionId,
        request: SearchRequest,
    },
    Cancel,
    Dismiss,
    Opened {
        session: SessionId,
    },
    Received {
        session: SessionId,
        text: String,
    },
    TransportFailed {
        session: SessionId,
        reason: String,
    },
    Closed {
        session: SessionId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    Open { session: SessionId },
    Send { session: SessionId, payload: String },
    Close { session: SessionId },
    Deliver(Artifact),
}

/// Pure transition: applies one event and returns the next state with the
/// side effects the caller must perform, in order.
pub fn step(state: JobState, event: SessionEvent) -> (JobState, Vec<SessionEffect>) {
    match event {
        SessionEvent::Submit { session, request } => {
            let mut effects = Vec::with_capacity(2);
            if let Some(stale) = state.live_session() {
                argo_debug!("Tearing down session {} before starting {}", stale, session);
                effects.push(SessionEffect::Close { session: stale });
            }
            match request.to_json() {
                Ok(payload) => {
                    effects.push(SessionEffect::Open { session });
                    let next = JobState::Connecting {
                        session,
                        payload,
                        category: request.params.category,
                    };
                    (next, effects)
                }
                Err(err) => (
                    JobState::Failed {
                        message: err.to_string(),
                        logs: Vec::new(),
                    },
                    effects,
                ),
            }
        }
        SessionEvent::Cancel => match state.live_session() {
            Some(session) => (JobState::Idle, vec![SessionEffect::Close { session }]),
            None => (state, Vec::new()),
        },
        SessionEvent::Dismiss => match state {
            JobState::Succeeded { .. } | JobState::Failed { .. } => (JobState::Idle, Vec::new()),
            other => (other, Vec::new()),
        },
        SessionEvent::Opened { session } => match state {
            JobState::Connecting {
                session: live,
                payload,
                category,
            } if live == session => (
                JobState::Running {
                    session,
                    category,
                    logs: Vec::new(),
                },
                vec![SessionEffect::Send { session, payload }],
            ),
            other => {
                argo_debug!("Ignoring open notification for stale session {}", session);
                (other, Vec::new())
            }
        },
        SessionEvent::Received { session, text } => match state {
            JobState::Running {
                session: live,
                category,
                logs,
            } if live == session => receive(session, category, logs, &text),
            other => {
                argo_debug!("Ignoring message for stale session {}", session);
                (other, Vec::new())
            }
        },
        SessionEvent::TransportFailed { session, reason } => {
            if state.live_session() != Some(session) {
                argo_debug!("Ignoring transport failure for stale session {}", session);
                return (state, Vec::new());
            }
            argo_warn!("Session {} transport failure: {}", session, reason);
            let next = JobState::Failed {
                message: TRANSPORT_FAILURE_MESSAGE.to_string(),
                logs: state.into_logs(),
            };
            (next, vec![SessionEffect::Close { session }])
        }
        SessionEvent::Closed { session } => {
            if state.live_session() != Some(session) {
                return (state, Vec::new());
            }
            argo_warn!("Session {} closed without a result", session);
            let next = JobState::Failed {
                message: CONNECTION_LOST_MESSAGE.to_string(),
                logs: state.into_logs(),
            };
            (next, Vec::new())
        }
    }
}

fn receive(
    session: SessionId,
    category: Category,
    mut logs: Vec<String>,
    text: &str,
) -> (JobState, Vec<SessionEffect>) {
    match decode_event(text) {
        Ok(ServiceEvent::Log { message }) => {
            logs.push(message);
            let next = JobState::Running {
                session,
                category,
                logs,
            };
            (next, Vec::new())
        }
        Ok(ServiceEvent::Error { message }) => (
            JobState::Failed { message, logs },
            vec![SessionEffect::Close { session }],
        ),
        Ok(ServiceEvent::Complete { csv, filename }) => {
            let artifact = Artifact {
                csv,
                filename,
                category,
            };
            let effects = vec![
                SessionEffect::Close { session },
                SessionEffect::Deliver(artifact.clone()),
            ];
            (JobState::Succeeded { artifact, logs }, effects)
        }
        Err(ProtocolError::UnknownType(kind)) => {
            argo_warn!("Session {} skipping message of unknown type '{}'", session, kind);
            let next = JobState::Running {
                session,
                category,
                logs,
            };
            (next, Vec::new())
        }
        Err(err) => {
            argo_warn!("Session {} received undecodable message: {}", session, err);
            let next = JobState::Failed {
                message: PROTOCOL_FAILURE_MESSAGE.to_string(),
                logs,
            };
            (next, vec![SessionEffect::Close { session }])
        }
    }
}

/// Owns the live job state and allocates session ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchOrchestrator {
    state: JobState,
    last_session: SessionId,
}

impl SearchOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn logs(&self) -> &[String] {
        self.state.logs()
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match &self.state {
            JobState::Succeeded { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// Validates the bound and starts a new session. An invalid bound leaves
    /// the state untouched and produces no effects.
    pub fn submit(
        &mut self,
        bound: Bound,
        params: QueryParameters,
    ) -> Result<Vec<SessionEffect>, ValidationError> {
        let request = SearchRequest::new(bound, params)?;
        self.last_session += 1;
        let session = self.last_session;
        Ok(self.apply(SessionEvent::Submit { session, request }))
    }

    pub fn apply(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = step(state, event);
        self.state = next;
        effects
    }
}
