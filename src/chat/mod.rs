mod frame;
mod request;
mod source;
mod sse;

pub use frame::{parse_frame, StreamFrame, AGENT_MESSAGE_EVENT, ERROR_EVENT};
pub use request::ChatRequest;
pub use source::{FrameSource, HttpFrameSource};
pub use sse::{sse_payloads, FrameStream};
