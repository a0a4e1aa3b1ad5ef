use std::sync::Arc;

use tokio::sync::mpsc;

use super::session::{SessionEvent, SessionId, StreamSession};
use crate::chat::{parse_frame, ChatRequest, FrameSource};
use crate::error::WidgetError;

const SESSION_CHANNEL_CAPACITY: usize = 64;

/// Change reported by [`StreamIngestor::next_update`].
#[derive(Debug)]
pub enum IngestUpdate {
    /// An answer fragment was appended; `len` is the buffer length in bytes.
    Appended { len: usize },
    /// The active stream is over. `error` is set when the transport failed;
    /// whatever text arrived before the failure stays in the buffer.
    Finished { error: Option<WidgetError> },
}

/// Consumes a streamed chat reply and assembles its answer fragments.
///
/// Each widget owns its own ingestor. `send` does not refuse to start while a
/// stream is active; the caller is expected to gate submissions on
/// [`is_streaming`](Self::is_streaming). A new `send` supersedes the previous
/// session and late events from it are dropped.
pub struct StreamIngestor {
    source: Arc<dyn FrameSource>,
    user_id: String,
    buffer: String,
    streaming: bool,
    conversation_id: Option<String>,
    session: Option<StreamSession>,
    pending_error: Option<WidgetError>,
    skipped_frames: usize,
    sender: mpsc::Sender<SessionEvent>,
    receiver: mpsc::Receiver<SessionEvent>,
}

impl StreamIngestor {
    pub fn new(source: Arc<dyn FrameSource>, user_id: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            source,
            user_id: user_id.into(),
            buffer: String::new(),
            streaming: false,
            conversation_id: None,
            session: None,
            pending_error: None,
            skipped_frames: 0,
            sender,
            receiver,
        }
    }

    /// Starts streaming the reply to `text`. Must be called inside a tokio
    /// runtime.
    pub fn send(&mut self, text: &str) -> Result<SessionId, WidgetError> {
        if text.trim().is_empty() {
            return Err(WidgetError::InvalidRequest("empty message".to_string()));
        }
        let request = ChatRequest::new(text, self.user_id.clone())
            .with_conversation(self.conversation_id.clone());
        let session = StreamSession::start(self.source.clone(), request, self.sender.clone());
        let id = session.id();
        self.session = Some(session);
        self.pending_error = None;
        self.streaming = true;
        log::debug!("sent message, session {id}");
        Ok(id)
    }

    /// Waits for the next change from the active session.
    ///
    /// Cancel safe: state only changes after an event has been received.
    pub async fn next_update(&mut self) -> IngestUpdate {
        loop {
            let Some(event) = self.receiver.recv().await else {
                return std::future::pending().await;
            };
            if let Some(update) = self.apply(event) {
                return update;
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Option<IngestUpdate> {
        let active = self.session.as_ref().map(StreamSession::id);
        if active != Some(event.session()) {
            log::trace!("dropping event from stale session {}", event.session());
            return None;
        }
        match event {
            SessionEvent::Frame { payload, .. } => self
                .ingest_frame(&payload)
                .then(|| IngestUpdate::Appended {
                    len: self.buffer.len(),
                }),
            SessionEvent::Failed { error, .. } => {
                self.pending_error = Some(error);
                None
            }
            SessionEvent::Closed { .. } => {
                self.session = None;
                self.streaming = false;
                Some(IngestUpdate::Finished {
                    error: self.pending_error.take(),
                })
            }
        }
    }

    /// Parses one frame payload and appends its answer fragment, if any.
    ///
    /// Returns whether text was appended. Malformed frames are logged and
    /// skipped.
    pub fn ingest_frame(&mut self, payload: &str) -> bool {
        let frame = match parse_frame(payload) {
            Ok(frame) => frame,
            Err(err) => {
                self.skipped_frames += 1;
                log::warn!("skipping stream frame: {err}");
                return false;
            }
        };
        if frame.conversation_id.is_some() {
            self.conversation_id = frame.conversation_id.clone();
        }
        if frame.is_remote_error() {
            log::warn!(
                "chat endpoint reported an error: {}",
                frame.message.as_deref().unwrap_or("unknown")
            );
        }
        match frame.answer_fragment() {
            Some(answer) => {
                self.buffer.push_str(answer);
                true
            }
            None => false,
        }
    }

    /// Clears the accumulated text. Call after consuming a finished reply.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Abandons the active stream, if any, and releases its connection.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("cancelling stream session {}", session.id());
        }
        self.streaming = false;
        self.pending_error = None;
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn accumulated_text(&self) -> &str {
        &self.buffer
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn skipped_frames(&self) -> usize {
        self.skipped_frames
    }
}

#[cfg(test)]
#[path = "ingestor_tests.rs"]
mod tests;
