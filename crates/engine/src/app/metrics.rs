use std::time::{Duration, Instant};

/// Frame timing over one logging interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct IntervalSummary {
    pub(crate) fps: f32,
    pub(crate) avg_frame_ms: f32,
    pub(crate) worst_frame_ms: f32,
    pub(crate) stalls: u32,
}

/// Frame counts since the loop started, reported on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunTotals {
    pub(crate) frames: u64,
    pub(crate) stalls: u64,
}

#[derive(Debug)]
pub(crate) struct FrameMetrics {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    stalls: u32,
    frame_time_sum: Duration,
    worst_frame: Duration,
    totals: RunTotals,
}

impl FrameMetrics {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            stalls: 0,
            frame_time_sum: Duration::ZERO,
            worst_frame: Duration::ZERO,
            totals: RunTotals::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, stalled: bool) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.worst_frame = self.worst_frame.max(frame_dt);
        self.totals.frames = self.totals.frames.saturating_add(1);
        if stalled {
            self.stalls = self.stalls.saturating_add(1);
            self.totals.stalls = self.totals.stalls.saturating_add(1);
        }
    }

    pub(crate) fn totals(&self) -> RunTotals {
        self.totals
    }

    /// Closes the interval once it has elapsed and starts the next one.
    pub(crate) fn take_interval(&mut self, now: Instant) -> Option<IntervalSummary> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let avg_frame_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_sum.as_secs_f32() * 1000.0 / frames as f32,
        };
        let summary = IntervalSummary {
            fps: self.frames as f32 / elapsed.as_secs_f32().max(f32::EPSILON),
            avg_frame_ms,
            worst_frame_ms: self.worst_frame.as_secs_f32() * 1000.0,
            stalls: self.stalls,
        };

        self.interval_start = now;
        self.frames = 0;
        self.stalls = 0;
        self.frame_time_sum = Duration::ZERO;
        self.worst_frame = Duration::ZERO;
        Some(summary)
    }
}
