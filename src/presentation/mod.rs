// Presentation layer - HTTP and WebSocket surface
pub mod app_state;
pub mod handlers;
