// Rendered chart artifacts - Retained output of a chart redraw
use crate::domain::scale::ZoomTransform;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartState {
    Empty,
    Populated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Line plus per-sample markers for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesLayer {
    pub metric_id: String,
    pub color: String,
    pub visible: bool,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusMarker {
    pub metric_id: String,
    pub color: String,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipEntry {
    pub metric_id: String,
    pub label: String,
    pub color: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub time_label: String,
    pub anchor: Point,
    pub entries: Vec<TooltipEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartScene {
    pub chart_id: String,
    pub title: String,
    pub visible: bool,
    pub state: ChartState,
    pub width: f64,
    pub height: f64,
    pub transform: ZoomTransform,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub series: Vec<SeriesLayer>,
    pub focus: Vec<FocusMarker>,
    pub tooltip: Option<Tooltip>,
}

impl ChartScene {
    pub fn new(chart_id: String, title: String, width: f64, height: f64) -> Self {
        Self {
            chart_id,
            title,
            visible: true,
            state: ChartState::Empty,
            width,
            height,
            transform: ZoomTransform::IDENTITY,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            series: Vec::new(),
            focus: Vec::new(),
            tooltip: None,
        }
    }

    pub fn layer(&self, metric_id: &str) -> Option<&SeriesLayer> {
        self.series.iter().find(|l| l.metric_id == metric_id)
    }

    pub fn clear_hover(&mut self) {
        self.focus.clear();
        self.tooltip = None;
    }
}
