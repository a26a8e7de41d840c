// HTTP request handlers
use crate::application::coordinator::DashboardSnapshot;
use crate::domain::error::DashboardError;
use crate::domain::scale::ZoomTransform;
use crate::domain::scene::ChartScene;
use crate::infrastructure::svg_renderer::render_svg;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

#[derive(Deserialize)]
pub struct MetricToggle {
    pub enabled: bool,
}

#[derive(Deserialize)]
pub struct LayoutOrder {
    pub order: Vec<String>,
}

#[derive(Deserialize)]
pub struct ZoomRequest {
    pub k: f64,
    pub x: f64,
}

#[derive(Deserialize)]
pub struct ZoomAtRequest {
    pub x: f64,
    pub factor: f64,
}

#[derive(Deserialize)]
pub struct PanRequest {
    pub dx: f64,
}

#[derive(Deserialize)]
pub struct PointerPosition {
    pub x: f64,
}

#[derive(Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match self {
            DashboardError::UnknownMetric(_) | DashboardError::UnknownChart(_) => {
                StatusCode::NOT_FOUND
            }
            DashboardError::EngineStopped => StatusCode::SERVICE_UNAVAILABLE,
            DashboardError::RenderFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, self.to_string()).into_response()
    }
}

fn no_content(result: Result<(), DashboardError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "dashboard command rejected");
            e.into_response()
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard state: connection, layout, chart scenes and recent readings
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardSnapshot>, DashboardError> {
    Ok(Json(state.engine.snapshot().await?))
}

async fn scene_for(state: &AppState, chart_id: &str) -> Result<ChartScene, DashboardError> {
    state
        .engine
        .scene(chart_id)
        .await?
        .ok_or_else(|| DashboardError::UnknownChart(chart_id.to_string()))
}

pub async fn get_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartScene>, DashboardError> {
    Ok(Json(scene_for(&state, &id).await?))
}

pub async fn get_chart_svg(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, DashboardError> {
    let scene = scene_for(&state, &id).await?;
    let svg = render_svg(&scene).map_err(|e| DashboardError::RenderFailed {
        chart: id.clone(),
        reason: e.to_string(),
    })?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

pub async fn toggle_metric(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<MetricToggle>,
) -> Response {
    no_content(state.engine.toggle_metric(&id, body.enabled).await)
}

pub async fn reorder_layout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LayoutOrder>,
) -> Response {
    no_content(state.engine.reorder(body.order).await)
}

pub async fn zoom_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ZoomRequest>,
) -> Response {
    no_content(state.engine.zoom(&id, ZoomTransform::new(body.k, body.x)).await)
}

pub async fn zoom_chart_at(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ZoomAtRequest>,
) -> Response {
    no_content(state.engine.zoom_at(&id, body.x, body.factor).await)
}

pub async fn pan_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PanRequest>,
) -> Response {
    no_content(state.engine.pan(&id, body.dx).await)
}

pub async fn move_pointer(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PointerPosition>,
) -> Response {
    no_content(state.engine.pointer_move(&id, body.x).await)
}

pub async fn leave_pointer(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    no_content(state.engine.pointer_leave(&id).await)
}

pub async fn resize_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContainerSize>,
) -> Response {
    no_content(state.engine.resize_chart(&id, body.width, body.height).await)
}

pub async fn resize_all(State(state): State<Arc<AppState>>) -> Response {
    no_content(state.engine.resize_all().await)
}

/// Live sample stream, one JSON record per text frame
pub async fn telemetry_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let records = state.feed.subscribe();
    ws.on_upgrade(move |socket| forward_records(socket, records))
}

async fn forward_records(socket: WebSocket, records: broadcast::Receiver<String>) {
    let (mut sender, mut receiver) = socket.split();
    let mut records = BroadcastStream::new(records);
    tracing::info!("telemetry client connected");

    loop {
        tokio::select! {
            record = records.next() => match record {
                Some(Ok(text)) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "telemetry client lagging; records dropped");
                }
                None => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!("telemetry client disconnected");
}
