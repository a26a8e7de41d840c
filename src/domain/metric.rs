// Metric registry - Which series exist, how to read them and where they are drawn
use crate::domain::error::DashboardError;
use crate::domain::sample::Sample;
use serde::Serialize;

/// Field of a Sample a metric reads from, resolved once when the registry is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricAccessor {
    CpuUsage,
    RamUsage,
    PowerUsage,
    Temperature,
}

impl MetricAccessor {
    pub fn from_source(source: &str) -> Result<Self, DashboardError> {
        match source {
            "cpu_usage" => Ok(Self::CpuUsage),
            "ram_usage" => Ok(Self::RamUsage),
            "power_usage" => Ok(Self::PowerUsage),
            "temperature" => Ok(Self::Temperature),
            other => Err(DashboardError::UnknownMetricSource(other.to_string())),
        }
    }

    pub fn value(self, sample: &Sample) -> f64 {
        match self {
            Self::CpuUsage => sample.cpu_usage,
            Self::RamUsage => sample.ram_usage,
            Self::PowerUsage => sample.power_usage,
            Self::Temperature => sample.temperature,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricDescriptor {
    pub id: String,
    pub label: String,
    pub color: String,
    pub unit: String,
    /// Fraction digits used when the value is displayed.
    pub precision: usize,
    pub accessor: MetricAccessor,
    pub chart_id: String,
    enabled: bool,
}

impl MetricDescriptor {
    pub fn new(
        id: String,
        label: String,
        color: String,
        unit: String,
        precision: usize,
        accessor: MetricAccessor,
        chart_id: String,
    ) -> Self {
        Self {
            id,
            label,
            color,
            unit,
            precision,
            accessor,
            chart_id,
            enabled: true,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn value(&self, sample: &Sample) -> f64 {
        self.accessor.value(sample)
    }

    /// Value with the metric's precision and unit, e.g. `42.5%` or `250W`.
    pub fn format_value(&self, sample: &Sample) -> String {
        format!("{:.*}{}", self.precision, self.value(sample), self.unit)
    }
}

/// Display-side status of one metric, as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricStatus {
    pub id: String,
    pub label: String,
    pub color: String,
    pub unit: String,
    pub chart_id: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    metrics: Vec<MetricDescriptor>,
}

impl MetricRegistry {
    pub fn new(metrics: Vec<MetricDescriptor>) -> Result<Self, DashboardError> {
        for (i, metric) in metrics.iter().enumerate() {
            if metrics[..i].iter().any(|m| m.id == metric.id) {
                return Err(DashboardError::DuplicateMetric(metric.id.clone()));
            }
        }
        Ok(Self { metrics })
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.metrics.iter()
    }

    pub fn get(&self, metric_id: &str) -> Option<&MetricDescriptor> {
        self.metrics.iter().find(|m| m.id == metric_id)
    }

    pub fn for_chart<'a>(
        &'a self,
        chart_id: &'a str,
    ) -> impl Iterator<Item = &'a MetricDescriptor> {
        self.metrics.iter().filter(move |m| m.chart_id == chart_id)
    }

    pub fn enabled_for_chart<'a>(
        &'a self,
        chart_id: &'a str,
    ) -> impl Iterator<Item = &'a MetricDescriptor> {
        self.for_chart(chart_id).filter(|m| m.enabled)
    }

    pub fn has_enabled(&self, chart_id: &str) -> bool {
        self.enabled_for_chart(chart_id).next().is_some()
    }

    /// Flip a metric's enabled flag and return the chart it belongs to.
    ///
    /// Only the flag changes; accessor, color and unit are left alone.
    pub fn set_enabled(&mut self, metric_id: &str, enabled: bool) -> Result<&str, DashboardError> {
        let metric = self
            .metrics
            .iter_mut()
            .find(|m| m.id == metric_id)
            .ok_or_else(|| DashboardError::UnknownMetric(metric_id.to_string()))?;
        metric.enabled = enabled;
        Ok(&metric.chart_id)
    }

    pub fn statuses(&self) -> Vec<MetricStatus> {
        self.metrics
            .iter()
            .map(|m| MetricStatus {
                id: m.id.clone(),
                label: m.label.clone(),
                color: m.color.clone(),
                unit: m.unit.clone(),
                chart_id: m.chart_id.clone(),
                enabled: m.enabled,
            })
            .collect()
    }
}
