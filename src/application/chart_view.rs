// Chart view - One zoomable chart surface drawn from the shared window
use crate::domain::metric::MetricRegistry;
use crate::domain::scale::{LinearScale, Projection, TimeScale, ZoomTransform, format_time_label};
use crate::domain::scene::{
    ChartScene, ChartState, FocusMarker, Point, SeriesLayer, Tick, Tooltip, TooltipEntry,
};
use crate::domain::window::SlidingWindow;
use chrono::DateTime;

/// Space reserved around the plot for axes, in pixels.
pub const MARGIN_TOP: f64 = 20.0;
pub const MARGIN_RIGHT: f64 = 30.0;
pub const MARGIN_BOTTOM: f64 = 30.0;
pub const MARGIN_LEFT: f64 = 40.0;

const Y_TICK_COUNT: usize = 10;

#[derive(Debug, Clone)]
pub struct ChartView {
    id: String,
    container: (f64, f64),
    x: TimeScale,
    y: LinearScale,
    transform: ZoomTransform,
    /// Set once the time scale has seen a non-empty window.
    has_domain: bool,
    /// Pointer position while the pointer is over the plot.
    hover: Option<f64>,
    scene: ChartScene,
}

impl ChartView {
    pub fn new(
        id: String,
        title: String,
        y_domain: (f64, f64),
        container_width: f64,
        container_height: f64,
    ) -> Self {
        let (width, height) = inner_size(container_width, container_height);
        let scene = ChartScene::new(id.clone(), title, width, height);
        Self {
            id,
            container: (container_width, container_height),
            x: TimeScale::new(width),
            y: LinearScale::new(y_domain.0, y_domain.1, height),
            transform: ZoomTransform::IDENTITY,
            has_domain: false,
            hover: None,
            scene,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scene(&self) -> &ChartScene {
        &self.scene
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn container_size(&self) -> (f64, f64) {
        self.container
    }

    pub fn is_visible(&self) -> bool {
        self.scene.visible
    }

    /// Container visibility is owned by the coordinator. Hiding drops any hover.
    pub fn set_visible(&mut self, visible: bool) {
        if !visible {
            self.on_pointer_leave();
        }
        self.scene.visible = visible;
    }

    fn is_degenerate(&self) -> bool {
        let (width, height) = inner_size(self.container.0, self.container.1);
        !(width > 0.0 && height > 0.0)
    }

    fn projection(&self) -> Projection {
        Projection::new(self.x, self.transform)
    }

    /// Rebuild the scene from the window, the registry and the zoom state.
    ///
    /// An empty window keeps the previous time domain, so the axes stay put.
    pub fn redraw(&mut self, window: &SlidingWindow, registry: &MetricRegistry) {
        if self.is_degenerate() {
            tracing::debug!(chart = %self.id, "skipping redraw of zero-sized chart");
            return;
        }

        if let Some((start, end)) = window.extent() {
            self.x.set_domain(start, end);
            self.has_domain = true;
        }
        let projection = self.projection();

        self.scene.state = if window.is_empty() {
            ChartState::Empty
        } else {
            ChartState::Populated
        };
        self.scene.transform = self.transform;

        self.scene.series = registry
            .for_chart(&self.id)
            .map(|metric| {
                let points = if metric.enabled() {
                    window
                        .snapshot()
                        .iter()
                        .map(|s| {
                            Point::new(projection.apply(s.time_ms()), self.y.apply(metric.value(s)))
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                SeriesLayer {
                    metric_id: metric.id.clone(),
                    color: metric.color.clone(),
                    visible: metric.enabled(),
                    points,
                }
            })
            .collect();

        self.scene.x_ticks = if self.has_domain {
            projection
                .ticks()
                .into_iter()
                .map(|t| Tick {
                    position: projection.apply(t),
                    label: projection.tick_label(t),
                })
                .collect()
        } else {
            Vec::new()
        };
        self.scene.y_ticks = self
            .y
            .ticks(Y_TICK_COUNT)
            .into_iter()
            .map(|v| Tick {
                position: self.y.apply(v),
                label: format_tick_value(v),
            })
            .collect();

        match self.hover {
            Some(px) => self.resolve_hover(px, window, registry),
            None => self.scene.clear_hover(),
        }
    }

    pub fn on_zoom(
        &mut self,
        transform: ZoomTransform,
        window: &SlidingWindow,
        registry: &MetricRegistry,
    ) {
        self.transform = transform.constrain(self.x.width());
        tracing::debug!(chart = %self.id, k = self.transform.k, x = self.transform.x, "zoom");
        self.redraw(window, registry);
    }

    /// Wheel-style zoom by `factor` about the pointer position.
    pub fn zoom_at(
        &mut self,
        pixel_x: f64,
        factor: f64,
        window: &SlidingWindow,
        registry: &MetricRegistry,
    ) {
        let transform = self.transform.zoomed_at(pixel_x, factor);
        self.on_zoom(transform, window, registry);
    }

    pub fn pan_by(&mut self, dx: f64, window: &SlidingWindow, registry: &MetricRegistry) {
        let transform = self.transform.panned(dx);
        self.on_zoom(transform, window, registry);
    }

    /// New container size. A zero-sized container (hidden chart) drops any
    /// hover and is remembered, but nothing is recomputed until it has room again.
    pub fn on_resize(
        &mut self,
        container_width: f64,
        container_height: f64,
        window: &SlidingWindow,
        registry: &MetricRegistry,
    ) {
        self.container = (container_width, container_height);
        let (width, height) = inner_size(container_width, container_height);
        if !(width > 0.0 && height > 0.0) {
            tracing::debug!(
                chart = %self.id,
                container_width,
                container_height,
                "deferring resize of zero-sized chart"
            );
            self.on_pointer_leave();
            return;
        }

        self.x.set_width(width);
        self.y.set_height(height);
        self.scene.width = width;
        self.scene.height = height;
        self.transform = self.transform.constrain(width);
        self.redraw(window, registry);
    }

    pub fn on_pointer_move(
        &mut self,
        pixel_x: f64,
        window: &SlidingWindow,
        registry: &MetricRegistry,
    ) {
        if window.is_empty() || self.is_degenerate() || !self.scene.visible {
            return;
        }
        self.hover = Some(pixel_x);
        self.resolve_hover(pixel_x, window, registry);
    }

    pub fn on_pointer_leave(&mut self) {
        self.hover = None;
        self.scene.clear_hover();
    }

    fn resolve_hover(&mut self, pixel_x: f64, window: &SlidingWindow, registry: &MetricRegistry) {
        self.scene.clear_hover();

        let projection = self.projection();
        let target_ms = projection.invert(pixel_x).round() as i64;
        let Some(target) = DateTime::from_timestamp_millis(target_ms) else {
            return;
        };
        let Some(sample) = window.nearest(target) else {
            return;
        };

        let mut entries = Vec::new();
        for metric in registry.enabled_for_chart(&self.id) {
            let point = Point::new(
                projection.apply(sample.time_ms()),
                self.y.apply(metric.value(sample)),
            );
            self.scene.focus.push(FocusMarker {
                metric_id: metric.id.clone(),
                color: metric.color.clone(),
                point,
            });
            entries.push(TooltipEntry {
                metric_id: metric.id.clone(),
                label: metric.label.clone(),
                color: metric.color.clone(),
                value: metric.format_value(sample),
            });
        }

        if entries.is_empty() {
            return;
        }
        self.scene.tooltip = Some(Tooltip {
            time_label: format_time_label(sample.time_ms()),
            anchor: Point::new(pixel_x, 0.0),
            entries,
        });
    }
}

fn inner_size(container_width: f64, container_height: f64) -> (f64, f64) {
    (
        container_width - MARGIN_LEFT - MARGIN_RIGHT,
        container_height - MARGIN_TOP - MARGIN_BOTTOM,
    )
}

fn format_tick_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::tests::stock_registry;
    use crate::domain::sample::Sample;
    use crate::domain::window::tests::sample_at;

    // 500x250 container -> 430x200 plot.
    fn percent_chart() -> ChartView {
        ChartView::new(
            "chart-percent".to_string(),
            "Usage".to_string(),
            (0.0, 100.0),
            500.0,
            250.0,
        )
    }

    fn window_with(seconds: &[i64]) -> SlidingWindow {
        let mut window = SlidingWindow::new(50);
        for &t in seconds {
            window.append(sample_at(t));
        }
        window
    }

    #[test]
    fn test_empty_chart_draws_axes_only() {
        let registry = stock_registry();
        let window = SlidingWindow::new(50);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);

        let scene = chart.scene();
        assert_eq!(scene.state, ChartState::Empty);
        assert_eq!(scene.y_ticks.len(), 11);
        assert!(scene.x_ticks.is_empty());
        assert!(scene.series.iter().all(|l| l.points.is_empty()));
        assert!(scene.focus.is_empty());
        assert!(scene.tooltip.is_none());
    }

    #[test]
    fn test_populated_chart_projects_every_sample() {
        let registry = stock_registry();
        let window = window_with(&[0, 10, 20]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);

        let scene = chart.scene();
        assert_eq!(scene.state, ChartState::Populated);
        let ids: Vec<_> = scene.series.iter().map(|l| l.metric_id.as_str()).collect();
        assert_eq!(ids, vec!["cpu", "ram"]);

        let cpu = scene.layer("cpu").unwrap();
        assert_eq!(
            cpu.points,
            vec![
                Point::new(0.0, 100.0),
                Point::new(215.0, 100.0),
                Point::new(430.0, 100.0)
            ]
        );
        assert_eq!(scene.layer("ram").unwrap().points[0], Point::new(0.0, 150.0));
        assert!(!scene.x_ticks.is_empty());
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let registry = stock_registry();
        let window = window_with(&[0, 5, 9, 14]);
        let mut chart = percent_chart();
        chart.on_zoom(ZoomTransform::new(3.0, -200.0), &window, &registry);
        chart.on_pointer_move(120.0, &window, &registry);

        let first = chart.scene().clone();
        chart.redraw(&window, &registry);
        assert_eq!(chart.scene(), &first);
    }

    #[test]
    fn test_disabled_metric_is_hidden_without_touching_others() {
        let mut registry = stock_registry();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        chart.on_pointer_move(0.0, &window, &registry);
        let ticks = chart.scene().x_ticks.clone();
        let ram = chart.scene().layer("ram").unwrap().clone();

        registry.set_enabled("cpu", false).unwrap();
        chart.redraw(&window, &registry);

        let scene = chart.scene();
        let cpu = scene.layer("cpu").unwrap();
        assert!(!cpu.visible);
        assert!(cpu.points.is_empty());
        assert_eq!(scene.layer("ram").unwrap(), &ram);
        assert_eq!(scene.x_ticks, ticks);
        let focused: Vec<_> = scene.focus.iter().map(|f| f.metric_id.as_str()).collect();
        assert_eq!(focused, vec!["ram"]);
    }

    #[test]
    fn test_toggle_round_trip_restores_output() {
        let mut registry = stock_registry();
        let window = window_with(&[0, 10, 20]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        let before = chart.scene().clone();

        registry.set_enabled("ram", false).unwrap();
        chart.redraw(&window, &registry);
        registry.set_enabled("ram", true).unwrap();
        chart.redraw(&window, &registry);

        assert_eq!(chart.scene(), &before);
    }

    #[test]
    fn test_pointer_on_empty_window_is_noop() {
        let registry = stock_registry();
        let window = SlidingWindow::new(50);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        chart.on_pointer_move(100.0, &window, &registry);

        assert!(chart.scene().tooltip.is_none());
        assert!(chart.scene().focus.is_empty());
    }

    #[test]
    fn test_pointer_snaps_to_nearest_sample() {
        let registry = stock_registry();
        let mut window = SlidingWindow::new(50);
        window.append(sample_at(0));
        let ts = DateTime::from_timestamp(10, 0).unwrap();
        window.append(Sample::new(ts, 80.0, 20.0, 100.0, 30.0));
        window.append(sample_at(20));
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);

        // 6 s into a 20 s domain spread over 430 px.
        chart.on_pointer_move(129.0, &window, &registry);

        let scene = chart.scene();
        let tooltip = scene.tooltip.as_ref().unwrap();
        assert_eq!(tooltip.time_label, "00:00:10");
        let values: Vec<_> = tooltip.entries.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["80.0%", "20.0%"]);
        assert_eq!(scene.focus[0].point, Point::new(215.0, 40.0));
        assert_eq!(scene.focus[1].point, Point::new(215.0, 160.0));
    }

    #[test]
    fn test_no_enabled_metric_suppresses_tooltip() {
        let mut registry = stock_registry();
        registry.set_enabled("cpu", false).unwrap();
        registry.set_enabled("ram", false).unwrap();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        chart.on_pointer_move(50.0, &window, &registry);

        assert!(chart.scene().tooltip.is_none());
        assert!(chart.scene().focus.is_empty());
    }

    #[test]
    fn test_pointer_leave_clears_hover() {
        let registry = stock_registry();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        chart.on_pointer_move(10.0, &window, &registry);
        assert!(chart.scene().tooltip.is_some());

        chart.on_pointer_leave();
        assert!(chart.scene().tooltip.is_none());
        assert!(chart.scene().focus.is_empty());

        // Later redraws do not bring it back.
        chart.redraw(&window, &registry);
        assert!(chart.scene().tooltip.is_none());
    }

    #[test]
    fn test_zoom_is_clamped_and_applied() {
        let registry = stock_registry();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.on_zoom(ZoomTransform::new(50.0, 100.0), &window, &registry);

        assert_eq!(chart.transform(), ZoomTransform::new(10.0, 0.0));
        let cpu = chart.scene().layer("cpu").unwrap();
        assert_eq!(cpu.points[1].x, 4300.0);

        chart.pan_by(-10_000.0, &window, &registry);
        assert_eq!(chart.transform(), ZoomTransform::new(10.0, -3870.0));

        chart.zoom_at(0.0, 0.01, &window, &registry);
        assert_eq!(chart.transform(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn test_resize_rescales_and_reclamps() {
        let registry = stock_registry();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.on_zoom(ZoomTransform::new(2.0, -430.0), &window, &registry);

        chart.on_resize(170.0, 150.0, &window, &registry);
        assert_eq!(chart.transform(), ZoomTransform::new(2.0, -100.0));
        assert_eq!(chart.scene().width, 100.0);
        assert_eq!(chart.scene().height, 100.0);
        assert_eq!(chart.scene().layer("cpu").unwrap().points[0], Point::new(-100.0, 50.0));
    }

    #[test]
    fn test_zero_sized_container_is_deferred() {
        let registry = stock_registry();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        let before = chart.scene().clone();

        chart.on_resize(0.0, 0.0, &window, &registry);
        assert_eq!(chart.container_size(), (0.0, 0.0));
        assert_eq!(chart.scene(), &before);

        chart.on_pointer_move(10.0, &window, &registry);
        chart.redraw(&window, &registry);
        assert_eq!(chart.scene(), &before);
    }

    #[test]
    fn test_collapsing_container_clears_hover() {
        let registry = stock_registry();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        chart.on_pointer_move(10.0, &window, &registry);
        assert!(chart.scene().tooltip.is_some());

        chart.on_resize(0.0, 0.0, &window, &registry);
        assert!(chart.scene().tooltip.is_none());
        assert!(chart.scene().focus.is_empty());

        // Hover stays gone once the chart has room again.
        chart.on_resize(500.0, 250.0, &window, &registry);
        assert!(chart.scene().tooltip.is_none());
        assert!(chart.scene().focus.is_empty());
    }

    #[test]
    fn test_cleared_window_keeps_previous_domain() {
        let registry = stock_registry();
        let window = window_with(&[0, 10]);
        let mut chart = percent_chart();
        chart.redraw(&window, &registry);
        let ticks = chart.scene().x_ticks.clone();

        chart.redraw(&SlidingWindow::new(50), &registry);
        assert_eq!(chart.scene().state, ChartState::Empty);
        assert_eq!(chart.scene().x_ticks, ticks);
        assert!(chart.scene().series.iter().all(|l| l.points.is_empty()));
    }
}
