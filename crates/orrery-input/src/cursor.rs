//! Cursor sampling for the free-look camera.
//!
//! [`CursorTracker`] turns absolute cursor positions into per-event look
//! offsets. The first sample after construction (or after
//! [`recalibrate`](CursorTracker::recalibrate)) only records the position and
//! yields a zero offset, so the camera does not jump when the cursor first
//! enters the window. The y offset is reversed because window coordinates
//! grow downward.

use glam::Vec2;
use winit::window::{CursorGrabMode, Window};

/// Converts cursor samples into look offsets and owns cursor capture state.
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    last: Option<Vec2>,
    locked: bool,
}

impl CursorTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds an absolute cursor position and returns the look offset
    /// `(x - last_x, last_y - y)`.
    ///
    /// Returns `None` while the cursor is locked, in which case raw device
    /// motion drives the camera instead.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) -> Option<Vec2> {
        if self.locked {
            return None;
        }
        let pos = Vec2::new(x as f32, y as f32);
        let offset = match self.last {
            Some(last) => Vec2::new(pos.x - last.x, last.y - pos.y),
            None => Vec2::ZERO,
        };
        self.last = Some(pos);
        Some(offset)
    }

    /// Feeds a raw `DeviceEvent::MouseMotion` delta. Only used while locked.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) -> Option<Vec2> {
        if !self.locked {
            return None;
        }
        Some(Vec2::new(dx as f32, -(dy as f32)))
    }

    /// Forgets the last sample so the next one calibrates again.
    pub fn recalibrate(&mut self) {
        self.last = None;
    }

    /// Grabs (or releases) the cursor on `window`.
    ///
    /// Locked mode is tried first and falls back to confined mode. Either way
    /// the cursor is hidden and the next sample recalibrates.
    pub fn set_captured(&mut self, window: &Window, captured: bool) {
        self.locked = false;
        if captured {
            if window.set_cursor_grab(CursorGrabMode::Locked).is_ok() {
                self.locked = true;
            } else if let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined) {
                tracing::warn!("Cursor grab unavailable: {e}");
            }
            window.set_cursor_visible(false);
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        self.recalibrate();
    }

    #[cfg(test)]
    pub(crate) fn set_locked_flag(&mut self, locked: bool) {
        self.locked = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_zero_offset() {
        let mut tracker = CursorTracker::new();
        assert_eq!(tracker.on_cursor_moved(600.0, 450.0), Some(Vec2::ZERO));
        assert_eq!(tracker.on_cursor_moved(610.0, 450.0), Some(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_offsets_follow_first_sample() {
        let mut tracker = CursorTracker::new();
        tracker.on_cursor_moved(100.0, 100.0);
        let offset = tracker.on_cursor_moved(110.0, 90.0).unwrap();
        assert_eq!(offset, Vec2::new(10.0, 10.0));
        let offset = tracker.on_cursor_moved(105.0, 95.0).unwrap();
        assert_eq!(offset, Vec2::new(-5.0, -5.0));
    }

    #[test]
    fn test_recalibrate_resets_first_sample() {
        let mut tracker = CursorTracker::new();
        tracker.on_cursor_moved(0.0, 0.0);
        tracker.recalibrate();
        assert_eq!(tracker.on_cursor_moved(500.0, 500.0), Some(Vec2::ZERO));
    }

    #[test]
    fn test_locked_uses_raw_motion_only() {
        let mut tracker = CursorTracker::new();
        assert_eq!(tracker.on_raw_motion(3.0, 4.0), None);
        tracker.set_locked_flag(true);
        assert_eq!(tracker.on_cursor_moved(10.0, 10.0), None);
        assert_eq!(tracker.on_raw_motion(3.0, 4.0), Some(Vec2::new(3.0, -4.0)));
    }
}
