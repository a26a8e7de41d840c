// Transport port - Inbound push channel as seen by the dashboard engine
use crate::application::engine::EngineHandle;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,
    /// One raw record, not yet validated.
    Message(String),
    Disconnected,
}

#[async_trait]
pub trait TelemetryTransport: Send {
    /// Next event, or `None` once the transport is finished.
    async fn next_event(&mut self) -> Option<TransportEvent>;
}

/// Forward transport events into the engine until either side goes away.
pub async fn pump_transport<T>(mut transport: T, engine: EngineHandle)
where
    T: TelemetryTransport,
{
    while let Some(event) = transport.next_event().await {
        if engine.deliver(event).await.is_err() {
            tracing::info!("dashboard engine stopped; closing transport pump");
            return;
        }
    }
    tracing::info!("telemetry transport finished");
}
