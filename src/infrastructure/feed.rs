// Telemetry feed - In-process broadcast behind the push channel
use crate::application::transport::{TelemetryTransport, TransportEvent};
use async_trait::async_trait;
use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 64;

/// Fan-out of serialized samples to WebSocket clients and the dashboard engine.
#[derive(Clone)]
pub struct TelemetryFeed {
    tx: broadcast::Sender<String>,
}

impl TelemetryFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Returns how many subscribers received the record.
    pub fn publish(&self, record: String) -> usize {
        self.tx.send(record).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn transport(&self) -> BroadcastTransport {
        BroadcastTransport::new(self.subscribe())
    }
}

impl Default for TelemetryFeed {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BroadcastTransport {
    rx: broadcast::Receiver<String>,
    announced: bool,
    closed: bool,
}

impl BroadcastTransport {
    pub fn new(rx: broadcast::Receiver<String>) -> Self {
        Self {
            rx,
            announced: false,
            closed: false,
        }
    }
}

#[async_trait]
impl TelemetryTransport for BroadcastTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        if self.closed {
            return None;
        }
        if !self.announced {
            self.announced = true;
            return Some(TransportEvent::Connected);
        }

        loop {
            match self.rx.recv().await {
                Ok(record) => return Some(TransportEvent::Message(record)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "dashboard engine fell behind the telemetry feed");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.closed = true;
                    return Some(TransportEvent::Disconnected);
                }
            }
        }
    }
}
