//! Wall-clock frame timing.

use std::time::{Duration, Instant};
use tracing::warn;

/// Longest frame delta handed to the simulation, in seconds. Longer stalls
/// (window drags, breakpoints) are clamped so bodies do not jump.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Measures the time between consecutive frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    previous: Instant,
    frame_count: u64,
    report_start: Instant,
    frames_since_report: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            previous: now,
            frame_count: 0,
            report_start: now,
            frames_since_report: 0,
        }
    }

    /// Starts a new frame and returns the seconds since the previous one.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit timestamp. Timestamps earlier
    /// than the previous frame yield zero.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let mut dt = now.saturating_duration_since(self.previous).as_secs_f32();
        self.previous = now;
        if dt > MAX_FRAME_DELTA {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_DELTA * 1000.0
            );
            dt = MAX_FRAME_DELTA;
        }
        self.frame_count += 1;
        self.frames_since_report += 1;
        dt
    }

    /// Every `interval` frames, returns the average frame rate since the last
    /// report. `interval == 0` disables reporting.
    pub fn fps_report(&mut self, interval: u32) -> Option<f64> {
        self.fps_report_at(interval, Instant::now())
    }

    pub fn fps_report_at(&mut self, interval: u32, now: Instant) -> Option<f64> {
        if interval == 0 || self.frames_since_report < interval {
            return None;
        }
        let span = now.saturating_duration_since(self.report_start);
        let frames = self.frames_since_report;
        self.report_start = now;
        self.frames_since_report = 0;
        (span > Duration::ZERO).then(|| f64::from(frames) / span.as_secs_f64())
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_returns_wall_clock_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
        let dt = clock.tick_at(start + Duration::from_millis(50));
        assert!((dt - 0.034).abs() < 1e-6);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), MAX_FRAME_DELTA);
    }

    #[test]
    fn test_backwards_timestamp_yields_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start - Duration::from_millis(10)), 0.0);
    }

    #[test]
    fn test_fps_report_every_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        for i in 1..=9 {
            clock.tick_at(start + Duration::from_millis(100 * i));
        }
        assert_eq!(clock.fps_report_at(10, start + Duration::from_millis(900)), None);
        clock.tick_at(start + Duration::from_secs(1));
        let fps = clock.fps_report_at(10, start + Duration::from_secs(1)).unwrap();
        assert!((fps - 10.0).abs() < 1e-9);
        assert_eq!(clock.fps_report_at(0, start + Duration::from_secs(2)), None);
    }
}
