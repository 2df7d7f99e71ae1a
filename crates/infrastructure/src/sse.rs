//! Incremental `text/event-stream` decoding.

use keel_core::{AppError, AppResult};
use keel_domain::{ServerStatus, StatusEvent, StatusPatch};

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// `event:` field; `None` means the default `message` type.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
    /// `id:` field.
    pub id: Option<String>,
}

/// Splits a byte stream into [`SseFrame`]s.
///
/// Chunks may end anywhere, including inside a UTF-8 sequence or between
/// `\r` and `\n`; incomplete lines are kept until the next chunk.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    frame: SseFrame,
    has_data: bool,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the frames it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(end) = self.pending.iter().position(|byte| *byte == b'\n' || *byte == b'\r') {
            // A trailing `\r` may be the first half of `\r\n`.
            if self.pending[end] == b'\r' && end + 1 == self.pending.len() {
                break;
            }

            let line: Vec<u8> = self.pending.drain(..end).collect();
            let terminator = self.pending.remove(0);
            if terminator == b'\r' && self.pending.first() == Some(&b'\n') {
                self.pending.remove(0);
            }

            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.frame.event = Some(value.to_owned()),
            "data" => {
                if self.has_data {
                    self.frame.data.push('\n');
                }
                self.frame.data.push_str(value);
                self.has_data = true;
            }
            "id" => self.frame.id = Some(value.to_owned()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let frame = std::mem::take(&mut self.frame);
        let has_data = std::mem::replace(&mut self.has_data, false);
        has_data.then_some(frame)
    }
}

/// Decodes a status frame. Frames of other types, such as keep-alive
/// pings, yield `None`.
pub fn status_event(frame: &SseFrame) -> AppResult<Option<StatusEvent>> {
    match frame.event.as_deref() {
        Some("snapshot") => serde_json::from_str::<ServerStatus>(&frame.data)
            .map(|status| Some(StatusEvent::Snapshot(status)))
            .map_err(|error| AppError::Internal(format!("invalid status snapshot: {error}"))),
        Some("patch") => serde_json::from_str::<StatusPatch>(&frame.data)
            .map(|patch| Some(StatusEvent::Patch(patch)))
            .map_err(|error| AppError::Internal(format!("invalid status patch: {error}"))),
        Some("error") => Err(AppError::Internal(frame.data.clone())),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use keel_domain::StatusEvent;

    use super::{SseDecoder, SseFrame, status_event};

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: Some(event.to_owned()),
            data: data.to_owned(),
            id: None,
        }
    }

    #[test]
    fn frames_survive_arbitrary_chunk_boundaries() {
        let stream = "event: snapshot\r\ndata: {\"hostName\":\"h\u{e9}\"}\r\n\r\n: ping\n\nevent: patch\ndata: {}\n\n";
        let bytes = stream.as_bytes();

        for split in 0..bytes.len() {
            let mut decoder = SseDecoder::new();
            let mut frames = decoder.push(&bytes[..split]);
            frames.extend(decoder.push(&bytes[split..]));
            assert_eq!(
                frames,
                vec![
                    frame("snapshot", "{\"hostName\":\"h\u{e9}\"}"),
                    frame("patch", "{}"),
                ],
                "split at byte {split}"
            );
        }
    }

    #[test]
    fn data_lines_are_joined() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"id: 7\ndata: first\ndata:second\n\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: None,
                data: "first\nsecond".to_owned(),
                id: Some("7".to_owned()),
            }]
        );
    }

    #[test]
    fn status_frames_decode_into_events() {
        let snapshot = status_event(&frame("snapshot", r#"{"hostName":"app-01","uptimeSeconds":5}"#));
        assert!(matches!(
            snapshot,
            Ok(Some(StatusEvent::Snapshot(ref status))) if status.host_name == "app-01"
        ));

        let patch = status_event(&frame("patch", r#"{"uptimeSeconds":6}"#));
        assert!(matches!(
            patch,
            Ok(Some(StatusEvent::Patch(ref patch))) if patch.uptime_seconds == Some(6)
        ));

        assert!(matches!(status_event(&frame("ping", "")), Ok(None)));
        assert!(status_event(&frame("error", "sampler crashed")).is_err());
        assert!(status_event(&frame("snapshot", "not json")).is_err());
    }
}
