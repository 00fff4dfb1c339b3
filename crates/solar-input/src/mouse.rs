//! Pointer motion for camera look.
//!
//! While the cursor is captured, raw device motion drives the delta and
//! cursor positions are ignored; otherwise position differences do.

use glam::Vec2;

#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Option<Vec2>,
    delta: Vec2,
    captured: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `WindowEvent::CursorMoved`.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        // The first sample only establishes the reference point.
        if let Some(prev) = self.position
            && !self.captured
        {
            self.delta += new_pos - prev;
        }
        self.position = Some(new_pos);
    }

    /// `DeviceEvent::MouseMotion`.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Grab and hide the cursor, or release it.
    pub fn set_captured(&mut self, window: &winit::window::Window, captured: bool) {
        use winit::window::CursorGrabMode;
        self.set_captured_flag(captured);
        if captured {
            if window.set_cursor_grab(CursorGrabMode::Locked).is_err()
                && let Err(e) = window.set_cursor_grab(CursorGrabMode::Confined)
            {
                tracing::warn!("Cursor grab unavailable: {e}");
            }
            window.set_cursor_visible(false);
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
    }

    /// Capture flag without touching a window.
    pub fn set_captured_flag(&mut self, captured: bool) {
        self.captured = captured;
        self.position = None;
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Motion since the last [`clear_transients`](Self::clear_transients), in
    /// pixels, +x right and +y down.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cursor_sample_has_no_delta() {
        let mut mouse = MouseState::new();
        mouse.on_cursor_moved(400.0, 300.0);
        assert_eq!(mouse.delta(), Vec2::ZERO);
        mouse.on_cursor_moved(410.0, 295.0);
        assert_eq!(mouse.delta(), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_raw_motion_only_when_captured() {
        let mut mouse = MouseState::new();
        mouse.on_raw_motion(3.0, 4.0);
        assert_eq!(mouse.delta(), Vec2::ZERO);

        mouse.set_captured_flag(true);
        mouse.on_raw_motion(3.0, 4.0);
        mouse.on_raw_motion(1.0, 1.0);
        mouse.on_cursor_moved(0.0, 0.0);
        mouse.on_cursor_moved(500.0, 500.0);
        assert_eq!(mouse.delta(), Vec2::new(4.0, 5.0));
    }

    #[test]
    fn test_clear_resets_delta() {
        let mut mouse = MouseState::new();
        mouse.set_captured_flag(true);
        mouse.on_raw_motion(7.0, -2.0);
        mouse.clear_transients();
        assert_eq!(mouse.delta(), Vec2::ZERO);
        assert!(mouse.is_captured());
    }
}
