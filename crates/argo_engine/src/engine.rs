use std::io;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use argo_core::SessionId;
use argo_logging::{argo_debug, argo_info, argo_warn};
use tokio::sync::mpsc as async_mpsc;
use tokio::task::JoinHandle as TaskHandle;
use tokio_util::sync::CancellationToken;

use crate::http::HttpConnector;
use crate::transport::{parse_endpoint, Channel, ChannelEventSink, Connector, EventSink};
use crate::ws::WsConnector;
use crate::{TransportError, TransportEvent, TransportKind, TransportSettings};

/// How long shutdown waits for the last channel to finish closing.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

enum SessionCommand {
    Open { session: SessionId },
    Send { session: SessionId, payload: String },
    Close { session: SessionId },
    Shutdown,
}

/// Front of the background transport thread. At most one session is live;
/// opening a new one tears down whatever was open before, and the new
/// channel is not connected until the old one has finished closing.
///
/// Dropping the handle closes the live channel and joins the thread.
pub struct SessionHandle {
    cmd_tx: mpsc::Sender<SessionCommand>,
    worker: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn new(
        settings: TransportSettings,
        connector: Arc<dyn Connector>,
    ) -> io::Result<(Self, mpsc::Receiver<TransportEvent>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
        let settings = Arc::new(settings);

        let worker = thread::Builder::new()
            .name("argo-transport".to_string())
            .spawn(move || {
                let mut live: Option<LiveSession> = None;
                // Most recently spawned session task, live or still closing.
                let mut last_task: Option<TaskHandle<()>> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        SessionCommand::Open { session } => {
                            if let Some(previous) = live.take() {
                                argo_debug!("Session {} superseded by {session}", previous.id);
                                previous.cancel.cancel();
                            }
                            let cancel = CancellationToken::new();
                            let (outbound_tx, outbound_rx) = async_mpsc::unbounded_channel();
                            last_task = Some(runtime.spawn(run_session(
                                session,
                                last_task.take(),
                                settings.clone(),
                                connector.clone(),
                                cancel.clone(),
                                outbound_rx,
                                sink.clone(),
                            )));
                            live = Some(LiveSession {
                                id: session,
                                cancel,
                                outbound: outbound_tx,
                            });
                        }
                        SessionCommand::Send { session, payload } => match &live {
                            Some(current) if current.id == session => {
                                let _ = current.outbound.send(payload);
                            }
                            _ => argo_warn!("Dropping payload for inactive session {session}"),
                        },
                        SessionCommand::Close { session } => {
                            if live.as_ref().is_some_and(|current| current.id == session) {
                                if let Some(current) = live.take() {
                                    current.cancel.cancel();
                                }
                            }
                        }
                        SessionCommand::Shutdown => break,
                    }
                }
                if let Some(current) = live.take() {
                    current.cancel.cancel();
                }
                if let Some(task) = last_task.take() {
                    runtime.block_on(async {
                        if tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err() {
                            argo_warn!("Transport shutdown timed out after {SHUTDOWN_GRACE:?}");
                        }
                    });
                }
            })?;

        Ok((
            Self {
                cmd_tx,
                worker: Some(worker),
            },
            event_rx,
        ))
    }

    pub fn open(&self, session: SessionId) {
        let _ = self.cmd_tx.send(SessionCommand::Open { session });
    }

    pub fn send(&self, session: SessionId, payload: impl Into<String>) {
        let _ = self.cmd_tx.send(SessionCommand::Send {
            session,
            payload: payload.into(),
        });
    }

    pub fn close(&self, session: SessionId) {
        let _ = self.cmd_tx.send(SessionCommand::Close { session });
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Connector matching the configured transport kind.
pub fn connector_for(settings: &TransportSettings) -> Arc<dyn Connector> {
    match settings.kind {
        TransportKind::WebSocket => Arc::new(WsConnector::new(settings.max_payload_bytes)),
        TransportKind::Http => Arc::new(HttpConnector::new(
            settings.connect_timeout,
            settings.max_payload_bytes,
        )),
    }
}

struct LiveSession {
    id: SessionId,
    cancel: CancellationToken,
    outbound: async_mpsc::UnboundedSender<String>,
}

enum Step {
    Cancelled,
    Outbound(String),
    Inbound(Option<Result<String, TransportError>>),
}

async fn run_session(
    session: SessionId,
    previous: Option<TaskHandle<()>>,
    settings: Arc<TransportSettings>,
    connector: Arc<dyn Connector>,
    cancel: CancellationToken,
    mut outbound: async_mpsc::UnboundedReceiver<String>,
    sink: Arc<dyn EventSink>,
) {
    let fail = |err: TransportError| {
        argo_warn!("Session {session} failed: {err}");
        sink.emit(TransportEvent::Failed {
            session,
            reason: err.to_string(),
        });
    };

    // One channel at a time: the superseded session finishes closing first.
    if let Some(previous) = previous {
        let _ = previous.await;
    }
    if cancel.is_cancelled() {
        return;
    }

    let url = match parse_endpoint(&settings.endpoint, settings.kind) {
        Ok(url) => url,
        Err(err) => return fail(err),
    };

    let connect = tokio::time::timeout(settings.connect_timeout, connector.connect(&url));
    let mut channel = tokio::select! {
        _ = cancel.cancelled() => return,
        result = connect => match result {
            Ok(Ok(channel)) => channel,
            Ok(Err(err)) => return fail(err),
            Err(_) => return fail(TransportError::ConnectTimeout(settings.connect_timeout)),
        },
    };
    argo_info!("Session {session} connected to {url} ({})", settings.kind);
    sink.emit(TransportEvent::Opened { session });

    loop {
        let step = tokio::select! {
            _ = cancel.cancelled() => Step::Cancelled,
            Some(payload) = outbound.recv() => Step::Outbound(payload),
            frame = next_frame(channel.as_mut(), settings.idle_timeout) => Step::Inbound(frame),
        };
        match step {
            Step::Cancelled => {
                argo_debug!("Session {session} closed locally");
                channel.close().await;
                return;
            }
            Step::Outbound(payload) => {
                if let Err(err) = channel.send(payload).await {
                    channel.close().await;
                    return fail(err);
                }
            }
            Step::Inbound(Some(Ok(text))) => {
                sink.emit(TransportEvent::Message { session, text });
            }
            Step::Inbound(Some(Err(err))) => {
                channel.close().await;
                return fail(err);
            }
            Step::Inbound(None) => {
                argo_debug!("Session {session} closed by peer");
                sink.emit(TransportEvent::Closed { session });
                return;
            }
        }
    }
}

async fn next_frame(
    channel: &mut dyn Channel,
    idle_timeout: Option<Duration>,
) -> Option<Result<String, TransportError>> {
    match idle_timeout {
        None => channel.recv().await,
        Some(limit) => match tokio::time::timeout(limit, channel.recv()).await {
            Ok(frame) => frame,
            Err(_) => Some(Err(TransportError::IdleTimeout(limit))),
        },
    }
}
