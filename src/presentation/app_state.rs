// Application state for HTTP handlers
use crate::application::engine::EngineHandle;
use crate::infrastructure::feed::TelemetryFeed;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub feed: TelemetryFeed,
}
