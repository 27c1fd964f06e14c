use std::time::Instant;
use crate::drivers::{DashboardError, RollingBuffer};
/// Truncates seconds to millisecond precision. The value is snapped to whole
/// nanoseconds first so `0.57` (stored as `0.5699999...`) keeps its last
/// millisecond while `1.999999999` still truncates to `1.999`.
pub fn truncate_millis(seconds: f64) -> f64 {
    ((seconds * 1e9).round() / 1e6).floor() / 1000.0
}
/// Time axis rebuilt from message arrival instants.
///
/// The device does not timestamp samples, so the first arrival is pinned to
/// `0.0` and every later arrival adds the wall-clock gap since the previous
/// one. When a message carries several samples they are spread evenly over
/// that gap so the axis stays index-aligned with the sample series.
#[derive(Clone, Debug)]
pub struct TimeAxis {
    stamps: RollingBuffer<f64>,
    anchor: Option<Instant>,
}
impl TimeAxis {
    pub fn with_capacity(capacity: usize) -> Result<Self, DashboardError> {
        Ok(Self {
            stamps: RollingBuffer::with_capacity(capacity)?,
            anchor: None,
        })
    }
    pub fn stamps(&self) -> &RollingBuffer<f64> {
        &self.stamps
    }
    /// Appends `count` timestamps for a message that arrived at `now` and
    /// returns the newest one.
    pub fn record(&mut self, now: Instant, count: usize) -> f64 {
        let count = count.max(1);
        let newest = match (self.anchor, self.stamps.last()) {
            (Some(anchor), Some(previous)) => {
                let gap = now.saturating_duration_since(anchor).as_secs_f64();
                let newest = truncate_millis(previous + gap);
                for step in 1..count {
                    let fraction = step as f64 / count as f64;
                    self.stamps
                        .push(truncate_millis(previous + (newest - previous) * fraction));
                }
                newest
            }
            _ => {
                for _ in 1..count {
                    self.stamps.push(0.0);
                }
                0.0
            }
        };
        self.stamps.push(newest);
        self.anchor = Some(now);
        newest
    }
}
