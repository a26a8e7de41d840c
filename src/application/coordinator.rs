// Chart coordinator - Fans samples, toggles and viewport changes out to every chart
use crate::application::chart_view::ChartView;
use crate::application::diagnostics::DiagnosticSink;
use crate::application::layout::LayoutController;
use crate::application::transport::ConnectionState;
use crate::domain::error::{DashboardError, IngestError};
use crate::domain::metric::{MetricRegistry, MetricStatus};
use crate::domain::readings::{Reading, RecentReadings};
use crate::domain::sample::Sample;
use crate::domain::scale::ZoomTransform;
use crate::domain::scene::ChartScene;
use crate::domain::window::SlidingWindow;
use serde::Serialize;

/// Point-in-time view of the whole dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub connection: ConnectionState,
    pub layout: Vec<String>,
    pub charts: Vec<ChartScene>,
    pub metrics: Vec<MetricStatus>,
    pub recent: Vec<Reading>,
    pub window_len: usize,
    pub rejected_samples: u64,
}

pub struct ChartCoordinator {
    window: SlidingWindow,
    registry: MetricRegistry,
    charts: Vec<ChartView>,
    layout: Box<dyn LayoutController>,
    diagnostics: Box<dyn DiagnosticSink>,
    recent: RecentReadings,
    connection: ConnectionState,
    rejected: u64,
}

impl ChartCoordinator {
    pub fn new(
        window: SlidingWindow,
        registry: MetricRegistry,
        charts: Vec<ChartView>,
        layout: Box<dyn LayoutController>,
        diagnostics: Box<dyn DiagnosticSink>,
        recent: RecentReadings,
    ) -> Self {
        let mut coordinator = Self {
            window,
            registry,
            charts,
            layout,
            diagnostics,
            recent,
            connection: ConnectionState::Disconnected,
            rejected: 0,
        };
        for chart in &mut coordinator.charts {
            chart.redraw(&coordinator.window, &coordinator.registry);
        }
        coordinator.update_visibility();
        coordinator
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn chart(&self, chart_id: &str) -> Option<&ChartView> {
        self.charts.iter().find(|c| c.id() == chart_id)
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn rejected_samples(&self) -> u64 {
        self.rejected
    }

    /// Parse and ingest one raw push-channel record.
    ///
    /// Rejections are reported to the diagnostics sink and never stop the stream.
    pub fn on_message(&mut self, raw: &str) -> Result<(), IngestError> {
        match Sample::from_json(raw) {
            Ok(sample) => self.on_sample_appended(sample),
            Err(e) => Err(self.reject(e.into())),
        }
    }

    pub fn on_sample_appended(&mut self, sample: Sample) -> Result<(), IngestError> {
        if let Some(latest) = self.window.latest() {
            if sample.timestamp < latest.timestamp {
                let error = IngestError::OutOfOrder {
                    received: sample.timestamp,
                    latest: latest.timestamp,
                };
                return Err(self.reject(error));
            }
        }

        self.recent.push(Reading::format(&sample, &self.registry));
        self.window.append(sample);
        for chart in &mut self.charts {
            chart.redraw(&self.window, &self.registry);
        }
        self.update_visibility();
        Ok(())
    }

    fn reject(&mut self, error: IngestError) -> IngestError {
        self.rejected += 1;
        self.diagnostics.report(&error);
        error
    }

    pub fn on_metric_toggled(
        &mut self,
        metric_id: &str,
        enabled: bool,
    ) -> Result<(), DashboardError> {
        let chart_id = self.registry.set_enabled(metric_id, enabled)?.to_string();
        tracing::info!(metric = metric_id, enabled, chart = %chart_id, "metric toggled");

        let visible = self.registry.has_enabled(&chart_id);
        if let Some(chart) = self.charts.iter_mut().find(|c| c.id() == chart_id) {
            chart.set_visible(visible);
            chart.redraw(&self.window, &self.registry);
        }
        Ok(())
    }

    /// A chart is shown iff at least one of its metrics is enabled. Hidden
    /// charts keep their zoom state.
    fn update_visibility(&mut self) {
        for chart in &mut self.charts {
            let visible = self.registry.has_enabled(chart.id());
            if chart.is_visible() != visible {
                tracing::debug!(chart = chart.id(), visible, "chart visibility changed");
                chart.set_visible(visible);
            }
        }
    }

    /// Pass a drag-and-drop order on to the layout controller. Unknown and
    /// repeated ids are dropped; omitted charts are left to the controller.
    pub fn on_layout_reordered(&mut self, new_order: Vec<String>) {
        let mut order: Vec<String> = Vec::with_capacity(new_order.len());
        for id in new_order {
            if self.chart(&id).is_none() {
                tracing::debug!(chart = %id, "ignoring unknown chart in layout order");
            } else if !order.contains(&id) {
                order.push(id);
            }
        }
        self.layout.commit_order(order);
        tracing::debug!(order = ?self.layout.order(), "layout committed");
    }

    pub fn layout_order(&self) -> Vec<String> {
        self.layout.order()
    }

    pub fn on_window_resize_all(&mut self) {
        for chart in &mut self.charts {
            let (width, height) = chart.container_size();
            chart.on_resize(width, height, &self.window, &self.registry);
        }
    }

    pub fn on_container_resized(
        &mut self,
        chart_id: &str,
        width: f64,
        height: f64,
    ) -> Result<(), DashboardError> {
        let (chart, window, registry) = self.parts(chart_id)?;
        chart.on_resize(width, height, window, registry);
        Ok(())
    }

    pub fn on_zoom(
        &mut self,
        chart_id: &str,
        transform: ZoomTransform,
    ) -> Result<(), DashboardError> {
        let (chart, window, registry) = self.parts(chart_id)?;
        chart.on_zoom(transform, window, registry);
        Ok(())
    }

    pub fn on_zoom_at(
        &mut self,
        chart_id: &str,
        pixel_x: f64,
        factor: f64,
    ) -> Result<(), DashboardError> {
        let (chart, window, registry) = self.parts(chart_id)?;
        chart.zoom_at(pixel_x, factor, window, registry);
        Ok(())
    }

    pub fn on_pan(&mut self, chart_id: &str, dx: f64) -> Result<(), DashboardError> {
        let (chart, window, registry) = self.parts(chart_id)?;
        chart.pan_by(dx, window, registry);
        Ok(())
    }

    pub fn on_pointer_move(&mut self, chart_id: &str, pixel_x: f64) -> Result<(), DashboardError> {
        let (chart, window, registry) = self.parts(chart_id)?;
        chart.on_pointer_move(pixel_x, window, registry);
        Ok(())
    }

    pub fn on_pointer_leave(&mut self, chart_id: &str) -> Result<(), DashboardError> {
        let (chart, _, _) = self.parts(chart_id)?;
        chart.on_pointer_leave();
        Ok(())
    }

    pub fn on_connection_changed(&mut self, state: ConnectionState) {
        if self.connection != state {
            tracing::info!(?state, "telemetry connection changed");
        }
        self.connection = state;
    }

    fn parts(
        &mut self,
        chart_id: &str,
    ) -> Result<(&mut ChartView, &SlidingWindow, &MetricRegistry), DashboardError> {
        let chart = self
            .charts
            .iter_mut()
            .find(|c| c.id() == chart_id)
            .ok_or_else(|| DashboardError::UnknownChart(chart_id.to_string()))?;
        Ok((chart, &self.window, &self.registry))
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let layout = self.layout.order();
        let charts = layout
            .iter()
            .filter_map(|id| self.chart(id))
            .map(|c| c.scene().clone())
            .collect();

        DashboardSnapshot {
            connection: self.connection,
            layout,
            charts,
            metrics: self.registry.statuses(),
            recent: self.recent.to_vec(),
            window_len: self.window.len(),
            rejected_samples: self.rejected,
        }
    }
}
