// Sliding window - Bounded, time-ordered history shared by every chart
use crate::domain::sample::Sample;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append at the back, evicting the oldest sample once over capacity.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn snapshot(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// First and last timestamps; `None` while the window is empty.
    pub fn extent(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.samples.front()?.timestamp, self.samples.back()?.timestamp))
    }

    /// Sample closest in time to `target`.
    ///
    /// Only the two samples straddling `target` are compared. When both are
    /// exactly as far away, the earlier one wins.
    pub fn nearest(&self, target: DateTime<Utc>) -> Option<&Sample> {
        let index = self.samples.partition_point(|s| s.timestamp < target);
        let before = index.checked_sub(1).and_then(|i| self.samples.get(i));
        let after = self.samples.get(index);

        match (before, after) {
            (Some(before), Some(after)) => {
                if target - before.timestamp > after.timestamp - target {
                    Some(after)
                } else {
                    Some(before)
                }
            }
            (before, after) => before.or(after),
        }
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_at(seconds: i64) -> Sample {
        let timestamp = DateTime::from_timestamp(seconds, 0).unwrap();
        Sample::new(timestamp, 50.0, 25.0, 250.0, 40.0)
    }

    fn seconds(sample: &Sample) -> i64 {
        sample.timestamp.timestamp()
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let mut window = SlidingWindow::new(50);
        for t in 0..=55 {
            window.append(sample_at(t));
            assert!(window.len() <= 50);
        }

        let kept: Vec<i64> = window.snapshot().iter().map(seconds).collect();
        assert_eq!(kept, (6..=55).collect::<Vec<_>>());
        assert_eq!(
            window.extent(),
            Some((sample_at(6).timestamp, sample_at(55).timestamp))
        );
    }

    #[test]
    fn test_empty_window_queries() {
        let window = SlidingWindow::default();
        assert_eq!(window.len(), 0);
        assert!(window.extent().is_none());
        assert!(window.nearest(sample_at(3).timestamp).is_none());
        assert!(window.latest().is_none());
    }

    #[test]
    fn test_nearest_picks_closest_neighbor() {
        let mut window = SlidingWindow::new(10);
        for t in [0, 10, 20] {
            window.append(sample_at(t));
        }

        let at = |t: i64| seconds(window.nearest(sample_at(t).timestamp).unwrap());
        assert_eq!(at(6), 10);
        assert_eq!(at(4), 0);
        assert_eq!(at(-30), 0);
        assert_eq!(at(99), 20);
        assert_eq!(at(20), 20);
        // Equidistant: the earlier sample wins.
        assert_eq!(at(5), 0);
        assert_eq!(at(15), 10);
    }

    #[test]
    fn test_default_window_holds_default_capacity() {
        let mut window = SlidingWindow::default();
        for t in 0..(DEFAULT_WINDOW_CAPACITY as i64 + 5) {
            window.append(sample_at(t));
        }
        assert_eq!(window.len(), DEFAULT_WINDOW_CAPACITY);
        assert_eq!(window.latest().map(|s| s.timestamp), Some(sample_at(54).timestamp));
    }
}
