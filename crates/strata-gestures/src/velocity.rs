//! Velocity estimation for pan gestures
//!
//! A pan keeps a short ring buffer of timestamped deltas - the last 150 ms
//! of movement - and derives a terminal velocity from it when the point is
//! released. Timestamps come from the events themselves, so the estimate is
//! independent of dispatch latency.

use std::collections::VecDeque;

use strata_types::Offset;

/// How much movement history feeds the velocity estimate, in milliseconds
/// of event time.
pub const HISTORY_HORIZON_MS: u64 = 150;

/// A velocity in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// The velocity vector in pixels per second.
    pub pixels_per_second: Offset,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self {
        pixels_per_second: Offset::ZERO,
    };

    /// Creates a velocity from a pixels-per-second vector.
    #[inline]
    pub const fn new(pixels_per_second: Offset) -> Self {
        Self { pixels_per_second }
    }

    /// The speed in pixels per second.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.pixels_per_second.distance()
    }
}

#[derive(Debug, Clone, Copy)]
struct DeltaSample {
    time_ms: u64,
    delta: Offset,
}

/// Ring buffer of recent movement deltas.
#[derive(Debug, Clone, Default)]
pub struct DeltaHistory {
    samples: VecDeque<DeltaSample>,
}

impl DeltaHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a delta at `time_ms` and drops samples older than
    /// [`HISTORY_HORIZON_MS`].
    pub fn push(&mut self, time_ms: u64, delta: Offset) {
        self.samples.push_back(DeltaSample { time_ms, delta });
        while let Some(front) = self.samples.front() {
            if front.time_ms + HISTORY_HORIZON_MS < time_ms {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of buffered samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drops all samples.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// The velocity over the buffered window.
    ///
    /// The oldest sample only anchors the window start; its delta describes
    /// movement before the window and is excluded from the sum.
    pub fn velocity(&self) -> Velocity {
        if self.samples.len() < 2 {
            return Velocity::ZERO;
        }
        let (Some(oldest), Some(newest)) = (self.samples.front(), self.samples.back()) else {
            return Velocity::ZERO;
        };
        let span_ms = newest.time_ms.saturating_sub(oldest.time_ms);
        if span_ms == 0 {
            return Velocity::ZERO;
        }

        let total: Offset = self
            .samples
            .iter()
            .skip(1)
            .fold(Offset::ZERO, |acc, s| acc + s.delta);
        let span_secs = span_ms as f32 / 1000.0;
        Velocity::new(Offset::new(total.dx / span_secs, total.dy / span_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_samples_is_zero() {
        let mut history = DeltaHistory::new();
        assert_eq!(history.velocity(), Velocity::ZERO);
        history.push(0, Offset::new(10.0, 0.0));
        assert_eq!(history.velocity(), Velocity::ZERO);
    }

    #[test]
    fn test_steady_motion() {
        let mut history = DeltaHistory::new();
        // 20 px every 10 ms => 2000 px/s
        for i in 0..5 {
            history.push(i * 10, Offset::new(20.0, 0.0));
        }
        let velocity = history.velocity();
        assert!((velocity.pixels_per_second.dx - 2000.0).abs() < 1.0);
        assert_eq!(velocity.pixels_per_second.dy, 0.0);
    }

    #[test]
    fn test_old_samples_pruned() {
        let mut history = DeltaHistory::new();
        history.push(0, Offset::new(1000.0, 0.0));
        history.push(10, Offset::new(1.0, 0.0));
        // far beyond the horizon; only this and later samples survive
        history.push(1000, Offset::new(1.0, 0.0));
        assert_eq!(history.len(), 1);
        history.push(1010, Offset::new(1.0, 0.0));
        assert_eq!(history.len(), 2);

        let velocity = history.velocity();
        // 1 px over 10 ms => 100 px/s; the ancient fast movement is gone
        assert!((velocity.pixels_per_second.dx - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_reset() {
        let mut history = DeltaHistory::new();
        history.push(0, Offset::new(5.0, 5.0));
        history.reset();
        assert!(history.is_empty());
    }

    #[test]
    fn test_magnitude() {
        let velocity = Velocity::new(Offset::new(3.0, 4.0));
        assert_eq!(velocity.magnitude(), 5.0);
    }
}
