use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use argo_core::{Effect, Msg};
use argo_engine::{connector_for, deliver, SessionHandle, TransportEvent, TransportSettings};
use argo_logging::{argo_error, argo_info};
use chrono::Local;

use super::overlay::MapOverlay;

/// Carries out effects and hands back what the loop needs to know.
#[derive(Debug, Default, PartialEq)]
pub struct EffectOutcome {
    /// Messages to feed back into `update` right away.
    pub follow_up: Vec<Msg>,
    /// Lines for the console.
    pub notes: Vec<String>,
}

pub struct EffectRunner {
    session: SessionHandle,
    overlay: MapOverlay,
    output_dir: PathBuf,
}

impl EffectRunner {
    /// Starts the transport thread and forwards its events into `msg_tx`.
    pub fn new<T>(
        settings: TransportSettings,
        output_dir: PathBuf,
        msg_tx: mpsc::Sender<T>,
    ) -> io::Result<Self>
    where
        T: From<Msg> + Send + 'static,
    {
        let connector = connector_for(&settings);
        let (session, events) = SessionHandle::new(settings, connector)?;
        spawn_event_forwarder(events, msg_tx);
        Ok(Self {
            session,
            overlay: MapOverlay::default(),
            output_dir,
        })
    }

    pub fn overlay_mut(&mut self) -> &mut MapOverlay {
        &mut self.overlay
    }

    pub fn run(&mut self, effects: Vec<Effect>) -> EffectOutcome {
        let mut outcome = EffectOutcome::default();
        for effect in effects {
            match effect {
                Effect::RedrawOverlay(rect) => {
                    outcome.follow_up.extend(self.overlay.redraw(rect));
                }
                Effect::OpenChannel { session } => {
                    argo_info!("Opening session {session}");
                    self.session.open(session);
                }
                Effect::SendRequest { session, payload } => {
                    argo_info!("Sending request on session {session} ({} bytes)", payload.len());
                    self.session.send(session, payload);
                }
                Effect::CloseChannel { session } => self.session.close(session),
                Effect::DeliverArtifact(artifact) => {
                    match deliver(&artifact, &self.output_dir, Local::now().naive_local()) {
                        Ok(path) => outcome.notes.push(format!("Saved {}", path.display())),
                        Err(err) => {
                            argo_error!("Delivery failed: {err}");
                            outcome.notes.push(format!("Could not save the result: {err}"));
                        }
                    }
                }
            }
        }
        outcome
    }
}

fn spawn_event_forwarder<T>(events: mpsc::Receiver<TransportEvent>, msg_tx: mpsc::Sender<T>)
where
    T: From<Msg> + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            if msg_tx.send(transport_msg(event).into()).is_err() {
                break;
            }
        }
    });
}

pub fn transport_msg(event: TransportEvent) -> Msg {
    match event {
        TransportEvent::Opened { session } => Msg::ChannelOpened { session },
        TransportEvent::Message { session, text } => Msg::ChannelMessage { session, text },
        TransportEvent::Failed { session, reason } => Msg::ChannelFailed { session, reason },
        TransportEvent::Closed { session } => Msg::ChannelClosed { session },
    }
}
