// Application layer - Chart engine, coordination and ports
pub mod chart_view;
pub mod coordinator;
pub mod diagnostics;
pub mod engine;
pub mod layout;
pub mod transport;
