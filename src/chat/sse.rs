use std::fmt::Display;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use crate::error::WidgetError;

const DATA_FIELD: &str = "data:";

/// Stream of raw frame payloads, one item per server-sent event carrying data.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, WidgetError>> + Send>>;

pub(crate) fn create_sse_stream(response: reqwest::Response) -> FrameStream {
    sse_payloads(response.bytes_stream())
}

/// Splits a byte stream into SSE events and yields the data payload of each.
///
/// Events without any `data:` line (keep-alive pings, comments) produce
/// nothing. A failing chunk is surfaced as [`WidgetError::Transport`].
pub fn sse_payloads<S, E>(bytes: S) -> FrameStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + 'static,
{
    let stream = bytes
        .scan(SseState::default(), |state, chunk| {
            let results = handle_chunk(state, chunk);
            async move { Some(results) }
        })
        .flat_map(futures::stream::iter);

    Box::pin(stream)
}

#[derive(Default)]
struct SseState {
    buffer: String,
    utf8_buffer: Vec<u8>,
    event_lines: Vec<String>,
}

fn handle_chunk<E: Display>(
    state: &mut SseState,
    chunk: Result<Bytes, E>,
) -> Vec<Result<String, WidgetError>> {
    let bytes = match chunk {
        Ok(bytes) => bytes,
        Err(err) => return vec![Err(WidgetError::Transport(err.to_string()))],
    };

    state.push_bytes(&bytes);
    state.drain_events()
}

impl SseState {
    fn push_bytes(&mut self, bytes: &[u8]) {
        self.utf8_buffer.extend_from_slice(bytes);
        match std::str::from_utf8(&self.utf8_buffer) {
            Ok(text) => {
                self.buffer.push_str(text);
                self.utf8_buffer.clear();
            }
            Err(err) => self.consume_valid_prefix(err.valid_up_to()),
        }
    }

    fn consume_valid_prefix(&mut self, valid_up_to: usize) {
        if valid_up_to == 0 {
            return;
        }

        let valid = String::from_utf8_lossy(&self.utf8_buffer[..valid_up_to]);
        self.buffer.push_str(&valid);
        self.utf8_buffer.drain(..valid_up_to);
    }

    /// Dispatches an event on every blank line.
    fn drain_events(&mut self) -> Vec<Result<String, WidgetError>> {
        let mut results = Vec::new();
        while let Some(line) = self.next_line() {
            if !line.is_empty() {
                self.event_lines.push(line);
                continue;
            }
            let lines = std::mem::take(&mut self.event_lines);
            if let Some(payload) = event_data(&lines) {
                results.push(Ok(payload));
            }
        }
        results
    }

    /// Takes one line ended by `\r\n`, `\n` or `\r`. A trailing `\r` waits for
    /// the next chunk since it may be the first half of `\r\n`.
    fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.find(|c: char| c == '\r' || c == '\n')?;
        let terminator = match &self.buffer.as_bytes()[pos..] {
            [b'\r', b'\n', ..] => 2,
            [b'\r'] => return None,
            _ => 1,
        };
        let line = self.buffer[..pos].to_string();
        self.buffer.drain(..pos + terminator);
        Some(line)
    }
}

/// Joins the `data:` lines of one event, dropping a single leading space.
fn event_data(lines: &[String]) -> Option<String> {
    let mut lines = lines
        .iter()
        .filter_map(|line| line.strip_prefix(DATA_FIELD))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .peekable();
    lines.peek()?;
    let payload = lines.collect::<Vec<_>>().join("\n");
    if payload.trim().is_empty() {
        return None;
    }
    Some(payload)
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
