// Dashboard engine - Serialized event loop that owns the chart coordinator
use crate::application::coordinator::{ChartCoordinator, DashboardSnapshot};
use crate::application::transport::{ConnectionState, TransportEvent};
use crate::domain::error::DashboardError;
use crate::domain::scale::ZoomTransform;
use crate::domain::scene::ChartScene;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const COMMAND_QUEUE_DEPTH: usize = 256;

type Reply<T> = oneshot::Sender<T>;

/// Everything that can touch dashboard state. Commands are applied one at a
/// time, in arrival order, each to completion.
#[derive(Debug)]
pub enum DashboardCommand {
    Transport(TransportEvent),
    ToggleMetric {
        metric_id: String,
        enabled: bool,
        reply: Reply<Result<(), DashboardError>>,
    },
    Reorder(Vec<String>),
    ResizeChart {
        chart_id: String,
        width: f64,
        height: f64,
        reply: Reply<Result<(), DashboardError>>,
    },
    ResizeAll,
    Zoom {
        chart_id: String,
        transform: ZoomTransform,
        reply: Reply<Result<(), DashboardError>>,
    },
    ZoomAt {
        chart_id: String,
        pixel_x: f64,
        factor: f64,
        reply: Reply<Result<(), DashboardError>>,
    },
    Pan {
        chart_id: String,
        dx: f64,
        reply: Reply<Result<(), DashboardError>>,
    },
    PointerMove {
        chart_id: String,
        pixel_x: f64,
        reply: Reply<Result<(), DashboardError>>,
    },
    PointerLeave {
        chart_id: String,
        reply: Reply<Result<(), DashboardError>>,
    },
    Snapshot(Reply<DashboardSnapshot>),
    Scene {
        chart_id: String,
        reply: Reply<Option<ChartScene>>,
    },
}

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<DashboardCommand>,
}

/// Move the coordinator onto its own task and hand back a handle to it.
pub fn spawn_engine(coordinator: ChartCoordinator) -> (EngineHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let task = tokio::spawn(run(coordinator, rx));
    (EngineHandle { tx }, task)
}

async fn run(mut coordinator: ChartCoordinator, mut rx: mpsc::Receiver<DashboardCommand>) {
    tracing::info!("dashboard engine started");
    while let Some(command) = rx.recv().await {
        apply(&mut coordinator, command);
    }
    tracing::info!("dashboard engine stopped");
}

fn apply(coordinator: &mut ChartCoordinator, command: DashboardCommand) {
    match command {
        DashboardCommand::Transport(TransportEvent::Connected) => {
            coordinator.on_connection_changed(ConnectionState::Connected);
        }
        DashboardCommand::Transport(TransportEvent::Disconnected) => {
            coordinator.on_connection_changed(ConnectionState::Disconnected);
        }
        DashboardCommand::Transport(TransportEvent::Message(raw)) => {
            // Rejections are already reported by the coordinator.
            let _ = coordinator.on_message(&raw);
        }
        DashboardCommand::ToggleMetric {
            metric_id,
            enabled,
            reply,
        } => {
            let _ = reply.send(coordinator.on_metric_toggled(&metric_id, enabled));
        }
        DashboardCommand::Reorder(order) => coordinator.on_layout_reordered(order),
        DashboardCommand::ResizeChart {
            chart_id,
            width,
            height,
            reply,
        } => {
            let _ = reply.send(coordinator.on_container_resized(&chart_id, width, height));
        }
        DashboardCommand::ResizeAll => coordinator.on_window_resize_all(),
        DashboardCommand::Zoom {
            chart_id,
            transform,
            reply,
        } => {
            let _ = reply.send(coordinator.on_zoom(&chart_id, transform));
        }
        DashboardCommand::ZoomAt {
            chart_id,
            pixel_x,
            factor,
            reply,
        } => {
            let _ = reply.send(coordinator.on_zoom_at(&chart_id, pixel_x, factor));
        }
        DashboardCommand::Pan {
            chart_id,
            dx,
            reply,
        } => {
            let _ = reply.send(coordinator.on_pan(&chart_id, dx));
        }
        DashboardCommand::PointerMove {
            chart_id,
            pixel_x,
            reply,
        } => {
            let _ = reply.send(coordinator.on_pointer_move(&chart_id, pixel_x));
        }
        DashboardCommand::PointerLeave { chart_id, reply } => {
            let _ = reply.send(coordinator.on_pointer_leave(&chart_id));
        }
        DashboardCommand::Snapshot(reply) => {
            let _ = reply.send(coordinator.snapshot());
        }
        DashboardCommand::Scene { chart_id, reply } => {
            let scene = coordinator.chart(&chart_id).map(|c| c.scene().clone());
            let _ = reply.send(scene);
        }
    }
}

impl EngineHandle {
    async fn send(&self, command: DashboardCommand) -> Result<(), DashboardError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| DashboardError::EngineStopped)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> DashboardCommand,
    ) -> Result<T, DashboardError> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        response.await.map_err(|_| DashboardError::EngineStopped)
    }

    pub async fn deliver(&self, event: TransportEvent) -> Result<(), DashboardError> {
        self.send(DashboardCommand::Transport(event)).await
    }

    pub async fn toggle_metric(
        &self,
        metric_id: &str,
        enabled: bool,
    ) -> Result<(), DashboardError> {
        let metric_id = metric_id.to_string();
        self.request(|reply| DashboardCommand::ToggleMetric {
            metric_id,
            enabled,
            reply,
        })
        .await?
    }

    pub async fn reorder(&self, order: Vec<String>) -> Result<(), DashboardError> {
        self.send(DashboardCommand::Reorder(order)).await
    }

    pub async fn resize_chart(
        &self,
        chart_id: &str,
        width: f64,
        height: f64,
    ) -> Result<(), DashboardError> {
        let chart_id = chart_id.to_string();
        self.request(|reply| DashboardCommand::ResizeChart {
            chart_id,
            width,
            height,
            reply,
        })
        .await?
    }

    pub async fn resize_all(&self) -> Result<(), DashboardError> {
        self.send(DashboardCommand::ResizeAll).await
    }

    pub async fn zoom(
        &self,
        chart_id: &str,
        transform: ZoomTransform,
    ) -> Result<(), DashboardError> {
        let chart_id = chart_id.to_string();
        self.request(|reply| DashboardCommand::Zoom {
            chart_id,
            transform,
            reply,
        })
        .await?
    }

    pub async fn zoom_at(
        &self,
        chart_id: &str,
        pixel_x: f64,
        factor: f64,
    ) -> Result<(), DashboardError> {
        let chart_id = chart_id.to_string();
        self.request(|reply| DashboardCommand::ZoomAt {
            chart_id,
            pixel_x,
            factor,
            reply,
        })
        .await?
    }

    pub async fn pan(&self, chart_id: &str, dx: f64) -> Result<(), DashboardError> {
        let chart_id = chart_id.to_string();
        self.request(|reply| DashboardCommand::Pan { chart_id, dx, reply })
            .await?
    }

    pub async fn pointer_move(&self, chart_id: &str, pixel_x: f64) -> Result<(), DashboardError> {
        let chart_id = chart_id.to_string();
        self.request(|reply| DashboardCommand::PointerMove {
            chart_id,
            pixel_x,
            reply,
        })
        .await?
    }

    pub async fn pointer_leave(&self, chart_id: &str) -> Result<(), DashboardError> {
        let chart_id = chart_id.to_string();
        self.request(|reply| DashboardCommand::PointerLeave { chart_id, reply })
            .await?
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        self.request(DashboardCommand::Snapshot).await
    }

    pub async fn scene(&self, chart_id: &str) -> Result<Option<ChartScene>, DashboardError> {
        let chart_id = chart_id.to_string();
        self.request(|reply| DashboardCommand::Scene { chart_id, reply })
            .await
    }
}
