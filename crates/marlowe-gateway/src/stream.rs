//! Event-stream plumbing
//!
//! Bridges orchestrator `EventSink`s onto SSE responses. Each request gets
//! an unbounded channel; the orchestrator writes typed events into it and
//! the response side serializes them as `{event-name, JSON payload}` frames.
//! When the consumer disconnects the receiver drops, sends start failing,
//! and the orchestrator stops further work best-effort.

use axum::response::sse::{Event, KeepAlive, Sse};
use marlowe_domain::{EventSink, StreamEvent};
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};

/// EventSink backed by an mpsc channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelSink {
    /// Create a sink/receiver pair for one stream
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: StreamEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Serialize one event as an SSE frame
pub fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.payload().to_string())
}

/// Turn an event receiver into an SSE response
pub fn sse_response(
    rx: mpsc::UnboundedReceiver<StreamEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = UnboundedReceiverStream::new(rx).map(|event| Ok(to_sse_event(&event)));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        assert!(sink.emit(StreamEvent::Narration { text: "a".into() }));
        assert!(sink.emit(StreamEvent::ThreatScore { score: 10 }));

        assert!(matches!(
            rx.recv().await.unwrap(),
            StreamEvent::Narration { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            StreamEvent::ThreatScore { score: 10 }
        ));
    }

    #[tokio::test]
    async fn test_emit_reports_detached_consumer() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        assert!(!sink.emit(StreamEvent::Narration { text: "a".into() }));
    }
}
