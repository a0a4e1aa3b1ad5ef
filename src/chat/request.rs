use std::collections::BTreeMap;

use serde::Serialize;

const STREAMING_RESPONSE_MODE: &str = "streaming";

/// Body posted to the chat endpoint for one user turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub inputs: BTreeMap<String, String>,
    pub query: String,
    pub response_mode: &'static str,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            inputs: BTreeMap::new(),
            query: query.into(),
            response_mode: STREAMING_RESPONSE_MODE,
            user: user.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: Option<String>) -> Self {
        self.conversation_id = conversation_id;
        self
    }
}
