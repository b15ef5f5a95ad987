//! Reconnecting event stream transport
//!
//! Consumes the server's clip stream (server-sent events over HTTP) and
//! forwards each event payload as one message on an unbounded channel. The
//! connection is re-established forever with doubling backoff; messages are
//! order-preserving within a connection, and nothing else is assumed of the
//! server.

use crate::error::Result;
use futures::StreamExt;
use spkr_common::events::{EventBus, SpkrEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// First reconnect delay after a drop
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Reconnect delay ceiling
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Incremental server-sent-events parser
///
/// Feed raw body chunks in; complete event payloads come out. `data:` lines
/// accumulate until a blank line dispatches the event (multiple data lines
/// joined with newlines, per the SSE framing rules); comments and other
/// fields are ignored.
#[derive(Debug, Default)]
pub struct SseParser {
    buf: String,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk, returning payloads of events it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.push_str(&String::from_utf8_lossy(chunk));

        let mut completed = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            self.process_line(line.trim_end_matches(['\n', '\r']), &mut completed);
        }
        completed
    }

    fn process_line(&mut self, line: &str, completed: &mut Vec<String>) {
        if line.is_empty() {
            // Blank line dispatches the accumulated event
            if !self.data.is_empty() {
                completed.push(self.data.join("\n"));
                self.data.clear();
            }
        } else if let Some(comment) = line.strip_prefix(':') {
            debug!("SSE comment: {}", comment.trim_start());
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        // event:/id:/retry: and unknown fields carry nothing we use
    }
}

/// Reconnecting consumer of the server clip stream
pub struct StreamTransport {
    url: String,
    client: reqwest::Client,
}

impl StreamTransport {
    /// Create a transport for the given stream URL
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { url, client })
    }

    /// Run until the message receiver is dropped
    ///
    /// Every received event payload is sent on `msg_tx` in arrival order.
    /// Connection lifecycle is announced on the bus.
    pub async fn run(self, msg_tx: mpsc::UnboundedSender<String>, bus: EventBus) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match self.consume_stream(&msg_tx, &bus, &mut backoff).await {
                Ok(()) => info!("Server closed the event stream"),
                Err(e) => warn!("Event stream error: {}", e),
            }

            if msg_tx.is_closed() {
                debug!("Message receiver dropped, transport stopping");
                return;
            }

            bus.emit_lossy(SpkrEvent::TransportDisconnected {
                url: self.url.clone(),
                retry_in_ms: backoff.as_millis() as u64,
                timestamp: spkr_common::time::now(),
            });
            info!("Reconnecting in {:?}", backoff);
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    /// One connection: consume the stream until it ends or errors
    async fn consume_stream(
        &self,
        msg_tx: &mpsc::UnboundedSender<String>,
        bus: &EventBus,
        backoff: &mut Duration,
    ) -> Result<()> {
        debug!("Connecting to {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        info!("Connected to event stream at {}", self.url);
        *backoff = INITIAL_BACKOFF;
        bus.emit_lossy(SpkrEvent::TransportConnected {
            url: self.url.clone(),
            timestamp: spkr_common::time::now(),
        });

        let mut parser = SseParser::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for payload in parser.feed(&chunk) {
                debug!("Received message ({} bytes)", payload.len());
                if msg_tx.send(payload).is_err() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: aGVsbG8=\n\n");
        assert_eq!(events, vec!["aGVsbG8="]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: aGVs").is_empty());
        assert!(parser.feed(b"bG8=\n").is_empty());
        let events = parser.feed(b"\n");
        assert_eq!(events, vec!["aGVsbG8="]);
    }

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: one\n\ndata: two\n\n");
        assert_eq!(events, vec!["one", "two"]);
    }

    #[test]
    fn test_multi_line_data_joined_with_newline() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: first\ndata: second\n\n");
        assert_eq!(events, vec!["first\nsecond"]);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut parser = SseParser::new();
        let events = parser.feed(b": keep-alive\nevent: clip\nid: 7\ndata: payload\n\n");
        assert_eq!(events, vec!["payload"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: payload\r\n\r\n");
        assert_eq!(events, vec!["payload"]);
    }

    #[test]
    fn test_blank_line_without_data_is_noop() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"\n\n: ping\n\n").is_empty());
    }

    #[test]
    fn test_data_without_space_after_colon() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data:payload\n\n");
        assert_eq!(events, vec!["payload"]);
    }
}
