// Recent readings - Newest-first list of formatted samples for the live data panel
use crate::domain::metric::MetricRegistry;
use crate::domain::sample::Sample;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_RECENT_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingValue {
    pub metric_id: String,
    pub label: String,
    pub color: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub time_label: String,
    pub values: Vec<ReadingValue>,
}

impl Reading {
    /// Every registered metric is listed, enabled or not.
    pub fn format(sample: &Sample, registry: &MetricRegistry) -> Self {
        Self {
            time_label: sample.timestamp.format("%H:%M:%S").to_string(),
            values: registry
                .iter()
                .map(|m| ReadingValue {
                    metric_id: m.id.clone(),
                    label: m.label.clone(),
                    color: m.color.clone(),
                    value: m.format_value(sample),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecentReadings {
    entries: VecDeque<Reading>,
    capacity: usize,
}

impl RecentReadings {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, reading: Reading) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(reading);
        self.entries.truncate(self.capacity);
    }

    pub fn to_vec(&self) -> Vec<Reading> {
        self.entries.iter().cloned().collect()
    }
}
