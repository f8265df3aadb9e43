use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Sim steps discarded by the per-frame tick cap during the interval.
    pub dropped_ticks: u32,
}

/// Rolling counters for one metrics interval. A snapshot resets them.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    dropped_ticks: u32,
    frame_time_sum: Duration,
    latest: LoopMetricsSnapshot,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            ticks: 0,
            dropped_ticks: 0,
            frame_time_sum: Duration::ZERO,
            latest: LoopMetricsSnapshot::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn record_ticks(&mut self, executed: u32, dropped: u32) {
        self.ticks = self.ticks.saturating_add(executed);
        self.dropped_ticks = self.dropped_ticks.saturating_add(dropped);
    }

    /// Last published snapshot; zeroed until the first interval completes.
    pub(crate) fn latest(&self) -> LoopMetricsSnapshot {
        self.latest
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            self.frame_time_sum.as_secs_f32() * 1000.0 / self.frames as f32
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
            dropped_ticks: self.dropped_ticks,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.dropped_ticks = 0;
        self.frame_time_sum = Duration::ZERO;
        self.latest = snapshot;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_over_the_interval() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);

        accumulator.record_frame(Duration::from_millis(20));
        accumulator.record_frame(Duration::from_millis(10));
        accumulator.record_ticks(4, 0);
        accumulator.record_ticks(2, 3);

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("snapshot should be emitted");

        assert!((snapshot.fps - 1.0).abs() < 0.01);
        assert!((snapshot.tps - 3.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 15.0).abs() < 0.01);
        assert_eq!(snapshot.dropped_ticks, 3);
        assert_eq!(accumulator.latest(), snapshot);
    }

    #[test]
    fn snapshot_waits_for_full_interval() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);
        accumulator.record_frame(Duration::from_millis(16));

        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
        assert_eq!(accumulator.latest(), LoopMetricsSnapshot::default());
    }

    #[test]
    fn counters_reset_after_snapshot() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);
        accumulator.record_frame(Duration::from_millis(16));
        accumulator.record_ticks(1, 1);
        accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("first snapshot");

        let second = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second snapshot");
        assert_eq!(second.fps, 0.0);
        assert_eq!(second.tps, 0.0);
        assert_eq!(second.frame_time_ms, 0.0);
        assert_eq!(second.dropped_ticks, 0);
    }
}
