// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{sync::Arc, time::Duration};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::coordinator::ChartCoordinator;
use crate::application::diagnostics::TracingDiagnostics;
use crate::application::engine::spawn_engine;
use crate::application::layout::ChartLayout;
use crate::application::transport::pump_transport;
use crate::domain::readings::RecentReadings;
use crate::domain::window::SlidingWindow;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::feed::TelemetryFeed;
use crate::infrastructure::generator::spawn_generator;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_chart, get_chart_svg, get_dashboard, health_check, leave_pointer, move_pointer, pan_chart,
    reorder_layout, resize_all, resize_chart, telemetry_socket, toggle_metric, zoom_chart,
    zoom_chart_at,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_dashboard_config()?;

    // Dashboard engine (application layer)
    let coordinator = ChartCoordinator::new(
        SlidingWindow::new(config.window.capacity),
        config.metric_registry()?,
        config.chart_views()?,
        Box::new(ChartLayout::new(config.chart_order())),
        Box::new(TracingDiagnostics),
        RecentReadings::new(config.window.recent_capacity),
    );
    let (engine, _engine_task) = spawn_engine(coordinator);

    // Live feed (infrastructure layer)
    let feed = TelemetryFeed::new();
    tokio::spawn(pump_transport(feed.transport(), engine.clone()));
    if config.generator.enabled {
        spawn_generator(
            feed.clone(),
            Duration::from_millis(config.generator.interval_ms.max(1)),
        );
    }

    let state = Arc::new(AppState { engine, feed });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/ws", get(telemetry_socket))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/layout", put(reorder_layout))
        .route("/api/resize", post(resize_all))
        .route("/api/metrics/:id", put(toggle_metric))
        .route("/api/charts/:id", get(get_chart))
        .route("/api/charts/:id/svg", get(get_chart_svg))
        .route("/api/charts/:id/zoom", post(zoom_chart))
        .route("/api/charts/:id/zoom-at", post(zoom_chart_at))
        .route("/api/charts/:id/pan", post(pan_chart))
        .route("/api/charts/:id/pointer", post(move_pointer).delete(leave_pointer))
        .route("/api/charts/:id/size", put(resize_chart))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state);

    let addr = config.listen_addr()?;
    tracing::info!(%addr, "starting telemetry dashboard");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
