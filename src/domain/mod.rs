// Domain layer - Telemetry values, metric metadata, windowing and chart geometry
pub mod error;
pub mod metric;
pub mod readings;
pub mod sample;
pub mod scale;
pub mod scene;
pub mod window;
