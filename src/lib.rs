//! Core of an embeddable streaming chat widget.
//!
//! A [`StreamIngestor`](ingest::StreamIngestor) posts the user's text to a
//! chat endpoint and assembles the `agent_message` fragments of the
//! server-sent event reply. A [`TypingPresenter`](present::TypingPresenter)
//! then reveals the finished reply one character per tick, and a
//! [`ChatWindow`](widget::ChatWindow) ties both to the message list and the
//! scroll surface of the host UI.

pub mod chat;
pub mod config;
pub mod error;
pub mod ingest;
pub mod present;
pub mod widget;

pub use chat::{ChatRequest, FrameSource, FrameStream, HttpFrameSource, StreamFrame};
pub use config::WidgetConfig;
pub use error::WidgetError;
pub use ingest::{IngestUpdate, StreamIngestor};
pub use present::{RevealSignal, TypingPresenter};
pub use widget::{ChatWindow, ConversationMessage, ScrollSurface, WidgetEvent};
