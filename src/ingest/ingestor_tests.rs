use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use proptest::prelude::*;

use super::{IngestUpdate, StreamIngestor};
use crate::chat::{ChatRequest, FrameSource, FrameStream};
use crate::error::WidgetError;

/// Replays a fixed list of frame payloads (or a transport failure) for every
/// request and records what was asked.
struct ScriptedSource {
    frames: Vec<Result<String, String>>,
    open_error: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedSource {
    fn new(frames: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            frames,
            open_error: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing_open(message: &str) -> Arc<Self> {
        Arc::new(Self {
            frames: Vec::new(),
            open_error: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn open(&self, request: &ChatRequest) -> Result<FrameStream, WidgetError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.open_error {
            return Err(WidgetError::HttpError(message.clone()));
        }
        let items: Vec<Result<String, WidgetError>> = self
            .frames
            .iter()
            .cloned()
            .map(|frame| frame.map_err(WidgetError::Transport))
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

fn agent_message(answer: &str) -> String {
    serde_json::json!({ "event": "agent_message", "answer": answer }).to_string()
}

fn ingestor_with(source: Arc<ScriptedSource>) -> StreamIngestor {
    StreamIngestor::new(source, "tester")
}

async fn drain(ingestor: &mut StreamIngestor) -> Option<WidgetError> {
    loop {
        match ingestor.next_update().await {
            IngestUpdate::Appended { .. } => continue,
            IngestUpdate::Finished { error } => return error,
        }
    }
}

#[test]
fn appends_only_agent_message_answers() {
    let mut ingestor = ingestor_with(ScriptedSource::new(Vec::new()));
    assert!(ingestor.ingest_frame(&agent_message("Hi")));
    assert!(!ingestor.ingest_frame(r#"{"event":"agent_thought","answer":"hmm"}"#));
    assert!(!ingestor.ingest_frame(r#"{"event":"agent_message","answer":""}"#));
    assert!(ingestor.ingest_frame(&agent_message(" there")));
    assert_eq!(ingestor.accumulated_text(), "Hi there");
}

#[test]
fn malformed_frame_is_skipped_and_later_frames_continue() {
    let mut ingestor = ingestor_with(ScriptedSource::new(Vec::new()));
    ingestor.ingest_frame(&agent_message("one"));
    assert!(!ingestor.ingest_frame("{not json"));
    ingestor.ingest_frame(&agent_message(" two"));
    assert_eq!(ingestor.accumulated_text(), "one two");
    assert_eq!(ingestor.skipped_frames(), 1);
}

#[test]
fn reset_clears_buffer() {
    let mut ingestor = ingestor_with(ScriptedSource::new(Vec::new()));
    ingestor.ingest_frame(&agent_message("stale"));
    ingestor.reset();
    assert_eq!(ingestor.accumulated_text(), "");
    ingestor.reset();
    assert_eq!(ingestor.accumulated_text(), "");
}

#[test]
fn remembers_latest_conversation_id() {
    let mut ingestor = ingestor_with(ScriptedSource::new(Vec::new()));
    assert_eq!(ingestor.conversation_id(), None);
    ingestor.ingest_frame(r#"{"event":"message","conversation_id":"c1"}"#);
    ingestor.ingest_frame(r#"{"event":"error","message":"overloaded"}"#);
    assert_eq!(ingestor.conversation_id(), Some("c1"));
    assert_eq!(ingestor.accumulated_text(), "");
}

proptest! {
    #[test]
    fn buffer_is_concatenation_of_answers(
        answers in prop::collection::vec(".{1,12}", 0..16),
        noise in prop::collection::vec(0usize..4, 0..16),
    ) {
        let mut ingestor = ingestor_with(ScriptedSource::new(Vec::new()));
        for (index, answer) in answers.iter().enumerate() {
            let noise_kind = noise.get(index).copied().unwrap_or(0);
            match noise_kind {
                1 => { ingestor.ingest_frame(r#"{"event":"message_end"}"#); }
                2 => { ingestor.ingest_frame("garbage"); }
                3 => { ingestor.ingest_frame(r#"{"event":"agent_message"}"#); }
                _ => {}
            }
            ingestor.ingest_frame(&agent_message(answer));
        }
        prop_assert_eq!(ingestor.accumulated_text(), answers.concat());
    }
}

#[tokio::test]
async fn streams_reply_and_finishes_once() {
    let source = ScriptedSource::new(vec![
        Ok(r#"{"event":"workflow_started"}"#.to_string()),
        Ok(agent_message("Hi")),
        Ok(agent_message(" there")),
        Ok(r#"{"event":"message_end","conversation_id":"conv-7"}"#.to_string()),
    ]);
    let mut ingestor = ingestor_with(source.clone());

    ingestor.send("Hello").unwrap();
    assert!(ingestor.is_streaming());

    let mut appended = Vec::new();
    let error = loop {
        match ingestor.next_update().await {
            IngestUpdate::Appended { len } => appended.push(len),
            IngestUpdate::Finished { error } => break error,
        }
    };

    assert!(error.is_none());
    assert_eq!(appended, vec![2, 8]);
    assert!(!ingestor.is_streaming());
    assert_eq!(ingestor.accumulated_text(), "Hi there");
    assert_eq!(source.requests()[0].query, "Hello");
    assert_eq!(source.requests()[0].user, "tester");
}

#[tokio::test]
async fn transport_failure_keeps_partial_text() {
    let source = ScriptedSource::new(vec![
        Ok(agent_message("partial")),
        Err("connection reset".to_string()),
        Ok(agent_message(" never")),
    ]);
    let mut ingestor = ingestor_with(source);

    ingestor.send("Hello").unwrap();
    let error = drain(&mut ingestor).await;

    assert!(matches!(error, Some(WidgetError::Transport(_))));
    assert!(!ingestor.is_streaming());
    assert_eq!(ingestor.accumulated_text(), "partial");
}

#[tokio::test]
async fn open_failure_finishes_with_empty_buffer() {
    let mut ingestor = ingestor_with(ScriptedSource::failing_open("refused"));

    ingestor.send("Hello").unwrap();
    let error = drain(&mut ingestor).await;

    assert!(matches!(error, Some(WidgetError::HttpError(_))));
    assert!(!ingestor.is_streaming());
    assert!(ingestor.accumulated_text().is_empty());
}

#[tokio::test]
async fn next_request_continues_conversation() {
    let source = ScriptedSource::new(vec![Ok(
        r#"{"event":"agent_message","answer":"ok","conversation_id":"conv-1"}"#.to_string(),
    )]);
    let mut ingestor = ingestor_with(source.clone());

    ingestor.send("first").unwrap();
    drain(&mut ingestor).await;
    ingestor.reset();
    ingestor.send("second").unwrap();
    drain(&mut ingestor).await;

    let requests = source.requests();
    assert_eq!(requests[0].conversation_id, None);
    assert_eq!(requests[1].conversation_id.as_deref(), Some("conv-1"));
}

#[tokio::test]
async fn superseded_session_events_are_dropped() {
    let source = ScriptedSource::new(vec![Ok(agent_message("reply"))]);
    let mut ingestor = ingestor_with(source);

    ingestor.send("first").unwrap();
    ingestor.send("second").unwrap();
    drain(&mut ingestor).await;

    assert_eq!(ingestor.accumulated_text(), "reply");
}

#[tokio::test]
async fn cancel_stops_streaming() {
    let mut ingestor = ingestor_with(ScriptedSource::new(vec![Ok(agent_message("late"))]));

    ingestor.send("Hello").unwrap();
    ingestor.cancel();
    assert!(!ingestor.is_streaming());

    let update =
        tokio::time::timeout(std::time::Duration::from_millis(50), ingestor.next_update()).await;
    assert!(update.is_err());
    assert!(ingestor.accumulated_text().is_empty());
}

#[test]
fn rejects_blank_message() {
    let mut ingestor = ingestor_with(ScriptedSource::new(Vec::new()));
    assert!(matches!(
        ingestor.send("   "),
        Err(WidgetError::InvalidRequest(_))
    ));
    assert!(!ingestor.is_streaming());
}
