use thiserror::Error;

/// Error types that can occur while streaming and presenting a chat reply.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// The endpoint rejected the configured credential
    #[error("Auth error: {0}")]
    AuthError(String),
    /// Invalid request parameters or format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// A single stream frame could not be parsed
    #[error("Frame parse error: {message}. Raw frame: {raw_frame}")]
    FrameParse { message: String, raw_frame: String },
    /// The connection failed or was aborted mid-stream
    #[error("Stream transport error: {0}")]
    Transport(String),
    /// The stream ended without a single answer fragment
    #[error("Stream completed without any answer text")]
    EmptyCompletion,
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
}

/// Converts reqwest HTTP errors into WidgetErrors
impl From<reqwest::Error> for WidgetError {
    fn from(err: reqwest::Error) -> Self {
        WidgetError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        WidgetError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}
