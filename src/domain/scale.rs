// Chart scales - Time/value projections, zoom transform and axis ticks
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 10.0;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;
const YEAR_MS: f64 = 365.0 * DAY_MS;

const TIME_TICK_STEPS: [f64; 16] = [
    SECOND_MS,
    5.0 * SECOND_MS,
    15.0 * SECOND_MS,
    30.0 * SECOND_MS,
    MINUTE_MS,
    5.0 * MINUTE_MS,
    15.0 * MINUTE_MS,
    30.0 * MINUTE_MS,
    HOUR_MS,
    3.0 * HOUR_MS,
    6.0 * HOUR_MS,
    12.0 * HOUR_MS,
    DAY_MS,
    7.0 * DAY_MS,
    30.0 * DAY_MS,
    YEAR_MS,
];

/// Linear map from epoch milliseconds to horizontal pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (f64, f64),
    width: f64,
}

impl TimeScale {
    pub fn new(width: f64) -> Self {
        Self {
            domain: (0.0, 0.0),
            width,
        }
    }

    pub fn set_domain(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.domain = (
            start.timestamp_millis() as f64,
            end.timestamp_millis() as f64,
        );
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// A zero-span domain puts every instant in the middle of the range.
    pub fn apply(&self, time_ms: f64) -> f64 {
        let (d0, d1) = self.domain;
        let span = d1 - d0;
        if span == 0.0 {
            return self.width / 2.0;
        }
        (time_ms - d0) / span * self.width
    }

    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        if self.width == 0.0 {
            return d0;
        }
        d0 + px / self.width * (d1 - d0)
    }
}

/// Fixed value domain mapped onto `[height, 0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    height: f64,
}

impl LinearScale {
    pub fn new(min: f64, max: f64, height: f64) -> Self {
        Self {
            domain: (min, max),
            height,
        }
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        if d1 == d0 {
            return self.height / 2.0;
        }
        self.height - (value - d0) / (d1 - d0) * self.height
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Horizontal zoom/pan state: `px' = px * k + x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self { k: 1.0, x: 0.0 };

    pub fn new(k: f64, x: f64) -> Self {
        Self { k, x }
    }

    pub fn apply(&self, px: f64) -> f64 {
        px * self.k + self.x
    }

    pub fn invert(&self, px: f64) -> f64 {
        (px - self.x) / self.k
    }

    /// Clamp the scale to `[MIN_ZOOM, MAX_ZOOM]` and the translation so the
    /// zoomed content still covers `[0, width]`.
    pub fn constrain(self, width: f64) -> Self {
        let k = if self.k.is_finite() {
            self.k.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            MIN_ZOOM
        };
        let x = if self.x.is_finite() { self.x } else { 0.0 };
        let lower = (width * (1.0 - k)).min(0.0);
        Self {
            k,
            x: x.clamp(lower, 0.0),
        }
    }

    /// Scale by `factor` around `px`, keeping the content under `px` in place.
    pub fn zoomed_at(self, px: f64, factor: f64) -> Self {
        let k = self.k * factor;
        let anchor = self.invert(px);
        Self { k, x: px - anchor * k }
    }

    pub fn panned(self, dx: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + dx,
        }
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Effective time projection: the zoom transform composed with the base scale.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    base: TimeScale,
    transform: ZoomTransform,
}

impl Projection {
    pub fn new(base: TimeScale, transform: ZoomTransform) -> Self {
        Self { base, transform }
    }

    pub fn apply(&self, time_ms: f64) -> f64 {
        self.transform.apply(self.base.apply(time_ms))
    }

    pub fn invert(&self, px: f64) -> f64 {
        self.base.invert(self.transform.invert(px))
    }

    /// Time range currently visible across the plot width.
    pub fn visible_domain(&self) -> (f64, f64) {
        (self.invert(0.0), self.invert(self.base.width()))
    }

    /// Tick instants for the visible range, never more than one per 80 pixels
    /// (and at least two slots on narrow charts).
    pub fn ticks(&self) -> Vec<f64> {
        let (start, end) = self.visible_domain();
        let Some(step) = self.tick_step() else {
            return Vec::new();
        };

        let mut ticks = Vec::new();
        let mut tick = (start / step).ceil() * step;
        while tick <= end {
            ticks.push(tick);
            tick += step;
        }
        ticks
    }

    /// Clock time for sub-day ticks, calendar date once ticks are days apart.
    pub fn tick_label(&self, time_ms: f64) -> String {
        match self.tick_step() {
            Some(step) if step >= DAY_MS => format_time(time_ms, "%Y-%m-%d"),
            _ => format_time_label(time_ms),
        }
    }

    /// Smallest step that keeps the tick count under the width budget. Spans
    /// longer than a year use 1/2/5 multiples of a year.
    fn tick_step(&self) -> Option<f64> {
        let (start, end) = self.visible_domain();
        let span = end - start;
        if !(span > 0.0) || !span.is_finite() {
            return None;
        }
        let budget = (self.base.width() / 80.0).floor().max(2.0);
        let fits = |step: f64| span / step < budget;

        if let Some(step) = TIME_TICK_STEPS.iter().copied().find(|&step| fits(step)) {
            return Some(step);
        }
        let mut magnitude = 1.0;
        loop {
            for factor in [1.0, 2.0, 5.0] {
                let step = factor * magnitude * YEAR_MS;
                if fits(step) {
                    return Some(step);
                }
            }
            magnitude *= 10.0;
        }
    }
}

/// `HH:MM:SS` label for an epoch-millisecond instant, in UTC.
pub fn format_time_label(time_ms: f64) -> String {
    format_time(time_ms, "%H:%M:%S")
}

fn format_time(time_ms: f64, pattern: &str) -> String {
    DateTime::from_timestamp_millis(time_ms.round() as i64)
        .map(|t| t.format(pattern).to_string())
        .unwrap_or_default()
}

/// Round 1/2/5 x 10^n ticks covering `[start, stop]`.
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    let (lo, hi) = if start <= stop { (start, stop) } else { (stop, start) };
    if count == 0 || !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
        return if lo == hi && lo.is_finite() { vec![lo] } else { Vec::new() };
    }

    let raw_step = (hi - lo) / count as f64;
    let power = raw_step.log10().floor();
    let error = raw_step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    let step = factor * 10f64.powf(power);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}
