use crate::application::chart_view::ChartView;
use crate::domain::error::DashboardError;
use crate::domain::metric::{MetricAccessor, MetricDescriptor, MetricRegistry};
use crate::domain::readings::DEFAULT_RECENT_CAPACITY;
use crate::domain::window::DEFAULT_WINDOW_CAPACITY;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartConfig>,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowSettings {
    #[serde(default = "default_window_capacity")]
    pub capacity: usize,
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub y_min: f64,
    pub y_max: f64,
    #[serde(default = "default_chart_width")]
    pub width: f64,
    #[serde(default = "default_chart_height")]
    pub height: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricConfig {
    pub id: String,
    pub label: String,
    pub color: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Sample field the metric is read from, e.g. `cpu_usage`.
    pub source: String,
    pub chart: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            capacity: default_window_capacity(),
            recent_capacity: default_recent_capacity(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_window_capacity() -> usize {
    DEFAULT_WINDOW_CAPACITY
}

fn default_recent_capacity() -> usize {
    DEFAULT_RECENT_CAPACITY
}

fn default_chart_width() -> f64 {
    600.0
}

fn default_chart_height() -> f64 {
    300.0
}

fn default_precision() -> usize {
    1
}

fn default_charts() -> Vec<ChartConfig> {
    let chart = |id: &str, title: &str, y_max: f64| ChartConfig {
        id: id.to_string(),
        title: title.to_string(),
        y_min: 0.0,
        y_max,
        width: default_chart_width(),
        height: default_chart_height(),
    };
    vec![
        chart("chart-percent", "CPU & RAM", 100.0),
        chart("chart-power", "Power", 500.0),
        chart("chart-temp", "Temperature", 100.0),
    ]
}

fn default_metrics() -> Vec<MetricConfig> {
    let metric = |id: &str,
                  label: &str,
                  color: &str,
                  unit: &str,
                  precision,
                  source: &str,
                  chart: &str| MetricConfig {
        id: id.to_string(),
        label: label.to_string(),
        color: color.to_string(),
        unit: unit.to_string(),
        precision,
        source: source.to_string(),
        chart: chart.to_string(),
    };
    vec![
        metric("cpu", "CPU", "#4e9af1", "%", 1, "cpu_usage", "chart-percent"),
        metric("ram", "RAM", "#a66cf0", "%", 1, "ram_usage", "chart-percent"),
        metric("power", "Power", "#f5b83d", "W", 0, "power_usage", "chart-power"),
        metric("temp", "Temp", "#ef5b5b", "°C", 1, "temperature", "chart-temp"),
    ]
}

/// Layered load: `config/dashboard.*` (optional), `DASHBOARD__*` variables, then `PORT`.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .set_override_option("server.port", std::env::var("PORT").ok())?
        .build()?;

    Ok(settings.try_deserialize()?)
}

impl DashboardConfig {
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }

    /// Resolve metric sources to accessors and check every chart reference.
    pub fn metric_registry(&self) -> Result<MetricRegistry, DashboardError> {
        let metrics = self
            .metrics
            .iter()
            .map(|m| {
                if !self.charts.iter().any(|c| c.id == m.chart) {
                    return Err(DashboardError::UnknownChart(m.chart.clone()));
                }
                Ok(MetricDescriptor::new(
                    m.id.clone(),
                    m.label.clone(),
                    m.color.clone(),
                    m.unit.clone(),
                    m.precision,
                    MetricAccessor::from_source(&m.source)?,
                    m.chart.clone(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        MetricRegistry::new(metrics)
    }

    pub fn chart_views(&self) -> Result<Vec<ChartView>, DashboardError> {
        let mut views: Vec<ChartView> = Vec::with_capacity(self.charts.len());
        for chart in &self.charts {
            if views.iter().any(|v| v.id() == chart.id) {
                return Err(DashboardError::DuplicateChart(chart.id.clone()));
            }
            if !(chart.y_max > chart.y_min) {
                return Err(DashboardError::EmptyValueDomain {
                    chart: chart.id.clone(),
                    min: chart.y_min,
                    max: chart.y_max,
                });
            }
            views.push(ChartView::new(
                chart.id.clone(),
                chart.title.clone(),
                (chart.y_min, chart.y_max),
                chart.width,
                chart.height,
            ));
        }
        Ok(views)
    }

    pub fn chart_order(&self) -> Vec<String> {
        self.charts.iter().map(|c| c.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(text: &str) -> DashboardConfig {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_match_stock_dashboard() {
        let config = from_toml("");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.generator.interval_ms, 5000);
        assert_eq!(config.window.capacity, 50);
        assert_eq!(config.window.recent_capacity, 10);
        assert_eq!(config.chart_order(), vec!["chart-percent", "chart-power", "chart-temp"]);

        let registry = config.metric_registry().unwrap();
        let percent: Vec<_> = registry.for_chart("chart-percent").map(|m| m.id.as_str()).collect();
        assert_eq!(percent, vec!["cpu", "ram"]);
        assert_eq!(registry.get("power").unwrap().precision, 0);
        assert_eq!(config.chart_views().unwrap().len(), 3);
        assert_eq!(config.listen_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_custom_layout_from_toml() {
        let config = from_toml(
            r#"
            [server]
            port = 8080

            [window]
            capacity = 120

            [[charts]]
            id = "load"
            title = "Load"
            y_min = 0
            y_max = 100
            width = 800

            [[metrics]]
            id = "cpu"
            label = "CPU"
            color = "red"
            unit = "%"
            source = "cpu_usage"
            chart = "load"
            "#,
        );

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.window.capacity, 120);
        let views = config.chart_views().unwrap();
        assert_eq!(views[0].container_size(), (800.0, 300.0));
        assert_eq!(config.metric_registry().unwrap().get("cpu").unwrap().precision, 1);
    }

    #[test]
    fn test_invalid_references_are_rejected() {
        let mut config = from_toml("");
        config.metrics[0].source = "disk_usage".to_string();
        assert_eq!(
            config.metric_registry().err(),
            Some(DashboardError::UnknownMetricSource("disk_usage".to_string()))
        );

        let mut config = from_toml("");
        config.metrics[1].chart = "chart-missing".to_string();
        assert_eq!(
            config.metric_registry().err(),
            Some(DashboardError::UnknownChart("chart-missing".to_string()))
        );

        let mut config = from_toml("");
        config.charts[2].y_max = 0.0;
        assert!(matches!(
            config.chart_views().err(),
            Some(DashboardError::EmptyValueDomain { .. })
        ));

        let mut config = from_toml("");
        config.charts[1].id = "chart-percent".to_string();
        assert_eq!(
            config.chart_views().err(),
            Some(DashboardError::DuplicateChart("chart-percent".to_string()))
        );
    }
}
