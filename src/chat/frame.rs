use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Event name of frames that carry a piece of the answer.
pub const AGENT_MESSAGE_EVENT: &str = "agent_message";
/// Event name the remote uses to report a failure inside the stream.
pub const ERROR_EVENT: &str = "error";

/// One JSON payload received from the chat stream.
///
/// Only `event` is required; every other field is optional and unknown
/// fields are ignored so new event kinds never break parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamFrame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StreamFrame {
    /// Returns the answer text when this frame is an answer fragment.
    pub fn answer_fragment(&self) -> Option<&str> {
        if self.event != AGENT_MESSAGE_EVENT {
            return None;
        }
        self.answer.as_deref().filter(|answer| !answer.is_empty())
    }

    pub fn is_remote_error(&self) -> bool {
        self.event == ERROR_EVENT
    }
}

pub fn parse_frame(payload: &str) -> Result<StreamFrame, WidgetError> {
    serde_json::from_str(payload).map_err(|err| WidgetError::FrameParse {
        message: err.to_string(),
        raw_frame: payload.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"event":"agent_message","answer":"Hi"}"#, Some("Hi"))]
    #[case(r#"{"event":"agent_message","answer":""}"#, None)]
    #[case(r#"{"event":"agent_message"}"#, None)]
    #[case(r#"{"event":"agent_thought","answer":"thinking"}"#, None)]
    #[case(r#"{"event":"message_end","conversation_id":"c1"}"#, None)]
    #[case(r#"{"event":"workflow_started","data":{"id":"w"}}"#, None)]
    fn classifies_answer_fragments(#[case] payload: &str, #[case] expected: Option<&str>) {
        let frame = parse_frame(payload).unwrap();
        assert_eq!(frame.answer_fragment(), expected);
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"answer":"missing event"}"#)]
    #[case(r#"{"event":"agent_message","answer":"trunc"#)]
    fn rejects_malformed_frames(#[case] payload: &str) {
        match parse_frame(payload) {
            Err(WidgetError::FrameParse { raw_frame, .. }) => assert_eq!(raw_frame, payload),
            other => panic!("expected frame parse error, got {other:?}"),
        }
    }

    #[test]
    fn keeps_conversation_id_and_error_message() {
        let frame =
            parse_frame(r#"{"event":"error","message":"quota exceeded","conversation_id":"c9"}"#)
                .unwrap();
        assert!(frame.is_remote_error());
        assert_eq!(frame.message.as_deref(), Some("quota exceeded"));
        assert_eq!(frame.conversation_id.as_deref(), Some("c9"));
    }
}
