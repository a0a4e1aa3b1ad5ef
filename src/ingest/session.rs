use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use crate::chat::{ChatRequest, FrameSource};
use crate::error::WidgetError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub(crate) enum SessionEvent {
    Frame { session: SessionId, payload: String },
    Failed { session: SessionId, error: WidgetError },
    Closed { session: SessionId },
}

impl SessionEvent {
    pub(crate) fn session(&self) -> SessionId {
        match self {
            SessionEvent::Frame { session, .. }
            | SessionEvent::Failed { session, .. }
            | SessionEvent::Closed { session } => *session,
        }
    }
}

/// Handle on the task pumping one response stream.
///
/// Dropping the handle cancels the task and releases the connection.
#[derive(Debug)]
pub(crate) struct StreamSession {
    id: SessionId,
    _guard: DropGuard,
}

impl StreamSession {
    pub(crate) fn start(
        source: Arc<dyn FrameSource>,
        request: ChatRequest,
        sender: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let id = SessionId::new();
        let token = CancellationToken::new();
        tokio::spawn(run_session(id, source, request, sender, token.clone()));
        Self {
            id,
            _guard: token.drop_guard(),
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }
}

async fn run_session(
    id: SessionId,
    source: Arc<dyn FrameSource>,
    request: ChatRequest,
    sender: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
) {
    log::debug!("stream session {id} started");
    let start_time = Instant::now();

    if let Err(error) = pump_frames(id, source.as_ref(), &request, &sender, &cancel).await {
        log::warn!("stream session {id} failed: {error}");
        forward(&sender, &cancel, SessionEvent::Failed { session: id, error }).await;
    }

    forward(&sender, &cancel, SessionEvent::Closed { session: id }).await;
    log::debug!("stream session {id} finished in {:?}", start_time.elapsed());
}

async fn pump_frames(
    id: SessionId,
    source: &dyn FrameSource,
    request: &ChatRequest,
    sender: &mpsc::Sender<SessionEvent>,
    cancel: &CancellationToken,
) -> Result<(), WidgetError> {
    let mut frames = tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        opened = source.open(request) => opened?,
    };
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            next = frames.next() => next,
        };
        let Some(payload) = next else {
            return Ok(());
        };
        let payload = payload?;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("stream session {id} frame: {payload}");
        }
        let event = SessionEvent::Frame {
            session: id,
            payload,
        };
        if !forward(sender, cancel, event).await {
            return Ok(());
        }
    }
}

/// Sends unless the session was cancelled or the ingestor is gone.
async fn forward(
    sender: &mpsc::Sender<SessionEvent>,
    cancel: &CancellationToken,
    event: SessionEvent,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = sender.send(event) => sent.is_ok(),
    }
}
