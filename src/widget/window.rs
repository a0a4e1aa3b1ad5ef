use std::sync::Arc;

use super::id::MessageId;
use super::message::ConversationMessage;
use super::scroll::ScrollSurface;
use crate::chat::{FrameSource, HttpFrameSource};
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::ingest::{IngestUpdate, SessionId, StreamIngestor};
use crate::present::{RevealSignal, TypingPresenter};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// The message went out in `session`. `interrupted` names the earlier
    /// reply whose reveal was cut short and is now shown in full.
    Sent {
        session: SessionId,
        interrupted: Option<MessageId>,
    },
    /// Blank input.
    Ignored,
    /// A reply is still streaming.
    Busy,
}

/// What changed after [`ChatWindow::next_event`].
#[derive(Debug)]
pub enum WidgetEvent {
    /// More answer text arrived; `len` is the buffered length in bytes.
    Streaming { len: usize },
    /// The placeholder was replaced by the bot reply `id`. `error` is set when
    /// the stream broke off and the reply is partial.
    Reply {
        id: MessageId,
        error: Option<WidgetError>,
    },
    /// The stream ended without answer text. `error` is the transport failure
    /// if there was one, [`WidgetError::EmptyCompletion`] otherwise.
    EmptyReply { error: WidgetError },
    /// The reveal of `id` advanced to `text`.
    Revealing { id: MessageId, text: String },
    /// The reveal of `id` finished.
    Settled { id: MessageId },
}

enum Step {
    Ingest(IngestUpdate),
    Reveal(RevealSignal),
}

/// Message list plus the ingestor/presenter pair behind one chat widget.
pub struct ChatWindow<S> {
    messages: Vec<ConversationMessage>,
    placeholder: Option<MessageId>,
    revealing: Option<MessageId>,
    placeholder_text: String,
    empty_reply_text: Option<String>,
    typing_enabled: bool,
    ingestor: StreamIngestor,
    presenter: TypingPresenter,
    scroll: S,
}

impl<S: ScrollSurface> ChatWindow<S> {
    pub fn new(config: &WidgetConfig, source: Arc<dyn FrameSource>, scroll: S) -> Self {
        let messages = config
            .greeting
            .as_ref()
            .map(|greeting| vec![ConversationMessage::bot(greeting.clone())])
            .unwrap_or_default();
        Self {
            messages,
            placeholder: None,
            revealing: None,
            placeholder_text: config.placeholder_text.clone(),
            empty_reply_text: config.empty_reply_text.clone(),
            typing_enabled: config.typing.enabled,
            ingestor: StreamIngestor::new(source, config.user_id.clone()),
            presenter: TypingPresenter::new(config.typing.interval()),
            scroll,
        }
    }

    /// Builds a window talking to the configured HTTP endpoint.
    pub fn connect(config: &WidgetConfig, scroll: S) -> Result<Self, WidgetError> {
        let source = HttpFrameSource::from_config(config)?;
        Ok(Self::new(config, Arc::new(source), scroll))
    }

    pub fn can_send(&self, input: &str) -> bool {
        !self.ingestor.is_streaming() && !input.trim().is_empty()
    }

    /// Sends `text` unless it is blank or a reply is still streaming.
    ///
    /// A reply still being revealed is shown in full first.
    pub fn submit(&mut self, text: &str) -> Result<SubmitOutcome, WidgetError> {
        if text.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        if self.ingestor.is_streaming() {
            return Ok(SubmitOutcome::Busy);
        }
        let interrupted = self.finish_reveal();
        self.push(ConversationMessage::user(text));

        let session = self.ingestor.send(text)?;
        let placeholder = ConversationMessage::bot(self.placeholder_text.clone());
        self.placeholder = Some(placeholder.id);
        self.push(placeholder);
        Ok(SubmitOutcome::Sent {
            session,
            interrupted,
        })
    }

    /// Waits for the next stream or reveal step and applies it.
    pub async fn next_event(&mut self) -> WidgetEvent {
        loop {
            let step = tokio::select! {
                update = self.ingestor.next_update() => Step::Ingest(update),
                signal = self.presenter.next_tick() => Step::Reveal(signal),
            };
            let event = match step {
                Step::Ingest(update) => self.on_ingest(update),
                Step::Reveal(signal) => self.on_reveal(signal),
            };
            if let Some(event) = event {
                return event;
            }
        }
    }

    fn on_ingest(&mut self, update: IngestUpdate) -> Option<WidgetEvent> {
        match update {
            IngestUpdate::Appended { len } => Some(WidgetEvent::Streaming { len }),
            IngestUpdate::Finished { error } => {
                if let Some(err) = &error {
                    log::warn!("reply stream ended early: {err}");
                }
                if self.ingestor.accumulated_text().is_empty() {
                    return Some(self.on_empty_reply(error));
                }
                let id = self.on_reply();
                Some(WidgetEvent::Reply { id, error })
            }
        }
    }

    fn on_reply(&mut self) -> MessageId {
        let text = self.ingestor.accumulated_text().to_string();
        self.ingestor.reset();
        self.remove_placeholder();

        let reply = ConversationMessage::bot(text.clone()).revealing(self.typing_enabled);
        let id = reply.id;
        if self.typing_enabled {
            self.presenter.present(text);
            self.revealing = Some(id);
        } else {
            self.presenter.bypass(text);
        }
        self.push(reply);
        id
    }

    fn on_empty_reply(&mut self, error: Option<WidgetError>) -> WidgetEvent {
        let error = error.unwrap_or(WidgetError::EmptyCompletion);
        log::debug!("no reply text: {error}");
        match self.empty_reply_text.clone() {
            Some(fallback) => {
                self.remove_placeholder();
                self.push(ConversationMessage::bot(fallback));
            }
            // The placeholder stays on screen but is no longer replaceable.
            None => self.placeholder = None,
        }
        WidgetEvent::EmptyReply { error }
    }

    fn on_reveal(&mut self, signal: RevealSignal) -> Option<WidgetEvent> {
        let Some(id) = self.revealing else {
            log::trace!("reveal step without a revealing message");
            return None;
        };
        match signal {
            RevealSignal::Progress(text) => {
                self.scroll.scroll_to_bottom();
                Some(WidgetEvent::Revealing { id, text })
            }
            RevealSignal::Settled => {
                self.revealing = None;
                if let Some(message) = self.message_mut(id) {
                    message.is_revealing = false;
                }
                Some(WidgetEvent::Settled { id })
            }
        }
    }

    /// Unmount: stops the reveal and abandons any stream.
    pub fn close(&mut self) {
        self.presenter.stop();
        self.ingestor.cancel();
        self.revealing = None;
        for message in &mut self.messages {
            message.is_revealing = false;
        }
    }

    fn finish_reveal(&mut self) -> Option<MessageId> {
        let interrupted = self.revealing.take();
        if let Some(id) = interrupted {
            let text = self.presenter.message().to_string();
            self.presenter.bypass(text);
            log::debug!("interrupted reveal of {id}");
        }
        for message in &mut self.messages {
            message.is_revealing = false;
        }
        interrupted
    }

    fn remove_placeholder(&mut self) {
        if let Some(id) = self.placeholder.take() {
            self.messages.retain(|message| message.id != id);
        }
    }

    fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
        self.scroll.scroll_to_bottom();
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut ConversationMessage> {
        self.messages.iter_mut().find(|message| message.id == id)
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Text to render for `message`: the revealed prefix while it is typing.
    pub fn display_text<'a>(&'a self, message: &'a ConversationMessage) -> &'a str {
        if self.revealing == Some(message.id) {
            self.presenter.revealed_text()
        } else {
            &message.text
        }
    }

    pub fn placeholder_id(&self) -> Option<MessageId> {
        self.placeholder
    }

    pub fn revealing_id(&self) -> Option<MessageId> {
        self.revealing
    }

    pub fn is_streaming(&self) -> bool {
        self.ingestor.is_streaming()
    }

    pub fn scroll(&self) -> &S {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut S {
        &mut self.scroll
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
