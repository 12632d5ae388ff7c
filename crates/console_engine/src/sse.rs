//! Incremental `text/event-stream` decoding.
//!
//! Only the `data` field matters to the console: `event`, `id` and `retry`
//! lines are skipped, comments (`:` prefix) too. Multi-line data is joined
//! with `\n` and dispatched on the blank line that ends the event.
//!
//! One event (its data lines plus the unterminated tail) may not exceed the
//! decoder's byte limit; a sender that never ends a line or an event gets
//! cut off with `FailureKind::TooLarge`.

use std::mem;

use console_core::Frame;
use serde::Deserialize;

use crate::{ApiError, ApiSettings, FailureKind};

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
    data_bytes: usize,
    max_event_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(ApiSettings::default().max_event_bytes)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_event_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            data: Vec::new(),
            data_bytes: 0,
            max_event_bytes,
        }
    }

    /// Feed raw bytes and append the payloads of every event they complete
    /// to `payloads`. Chunks may split lines or UTF-8 sequences anywhere.
    /// Events completed before a size error are still appended.
    pub fn feed(&mut self, chunk: &[u8], payloads: &mut Vec<String>) -> Result<(), ApiError> {
        self.buffer.extend_from_slice(chunk);
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(payload) = self.process_line(&line) {
                payloads.push(payload);
            }
            self.check_limit(self.data_bytes)?;
        }
        self.check_limit(self.data_bytes + self.buffer.len())
    }

    fn check_limit(&mut self, pending: usize) -> Result<(), ApiError> {
        if pending <= self.max_event_bytes {
            return Ok(());
        }
        self.buffer.clear();
        self.data.clear();
        self.data_bytes = 0;
        Err(ApiError::new(
            FailureKind::TooLarge {
                max_bytes: self.max_event_bytes as u64,
                actual: pending as u64,
            },
            "analysis event exceeds the size limit".to_string(),
        ))
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            self.data_bytes = 0;
            let payload = mem::take(&mut self.data).join("\n");
            return (!payload.is_empty()).then_some(payload);
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data_bytes += value.len() + 1;
            self.data.push(value.to_string());
        }
        None
    }
}

#[derive(Deserialize)]
struct TypedPayload {
    #[serde(rename = "type")]
    kind: String,
}

/// Turn one event payload into a frame. Only a payload that is exactly the
/// sentinel (ignoring surrounding whitespace) or a JSON object with
/// `"type": "done"` ends the session.
pub fn classify_payload(payload: String) -> Frame {
    let trimmed = payload.trim();
    if trimmed == DONE_SENTINEL {
        return Frame::Done;
    }
    if trimmed.starts_with('{') {
        if let Ok(typed) = serde_json::from_str::<TypedPayload>(trimmed) {
            if typed.kind.eq_ignore_ascii_case("done") {
                return Frame::Done;
            }
        }
    }
    Frame::Data(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_without_type_is_data() {
        let payload = r#"{"label":"person"}"#.to_string();
        assert_eq!(classify_payload(payload.clone()), Frame::Data(payload));
    }

    #[test]
    fn comment_only_input_yields_nothing() {
        let mut decoder = SseDecoder::new();
        let mut payloads = Vec::new();
        decoder.feed(b": keep-alive\n\n", &mut payloads).unwrap();
        assert!(payloads.is_empty());
    }
}
