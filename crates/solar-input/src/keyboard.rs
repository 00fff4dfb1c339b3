//! Held and edge-triggered key state, keyed by physical key so bindings
//! stay in place on any keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::PhysicalKey;

/// Platform-independent key event, handy for tests.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    /// OS auto-repeat; ignored.
    pub repeat: bool,
}

/// Keys held right now plus the ones that changed since the last
/// [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<PhysicalKey>,
    pressed_this_frame: HashSet<PhysicalKey>,
    released_this_frame: HashSet<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                if self.held.insert(event.key) {
                    self.pressed_this_frame.insert(event.key);
                }
            }
            ElementState::Released => {
                if self.held.remove(&event.key) {
                    self.released_this_frame.insert(event.key);
                }
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.held.contains(&key)
    }

    #[must_use]
    pub fn just_pressed(&self, key: PhysicalKey) -> bool {
        self.pressed_this_frame.contains(&key)
    }

    #[must_use]
    pub fn just_released(&self, key: PhysicalKey) -> bool {
        self.released_this_frame.contains(&key)
    }

    /// Release everything, e.g. when the window loses focus and the release
    /// events will never arrive.
    pub fn release_all(&mut self) {
        self.released_this_frame.extend(self.held.drain());
    }

    /// Forget this frame's edges. Call once per frame after input is consumed.
    pub fn clear_transients(&mut self) {
        self.pressed_this_frame.clear();
        self.released_this_frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    fn raw(code: KeyCode, state: ElementState) -> RawKeyEvent {
        RawKeyEvent {
            key: PhysicalKey::Code(code),
            state,
            repeat: false,
        }
    }

    fn key(code: KeyCode) -> PhysicalKey {
        PhysicalKey::Code(code)
    }

    #[test]
    fn test_press_then_release() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyP, ElementState::Pressed));
        assert!(kb.is_pressed(key(KeyCode::KeyP)));
        assert!(kb.just_pressed(key(KeyCode::KeyP)));

        kb.clear_transients();
        assert!(kb.is_pressed(key(KeyCode::KeyP)));
        assert!(!kb.just_pressed(key(KeyCode::KeyP)));

        kb.process_raw(raw(KeyCode::KeyP, ElementState::Released));
        assert!(!kb.is_pressed(key(KeyCode::KeyP)));
        assert!(kb.just_released(key(KeyCode::KeyP)));
    }

    #[test]
    fn test_repeats_do_not_retrigger() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::F11, ElementState::Pressed));
        kb.clear_transients();
        kb.process_raw(RawKeyEvent {
            repeat: true,
            ..raw(KeyCode::F11, ElementState::Pressed)
        });
        assert!(!kb.just_pressed(key(KeyCode::F11)));
        kb.process_raw(raw(KeyCode::F11, ElementState::Pressed));
        assert!(!kb.just_pressed(key(KeyCode::F11)), "already held");
    }

    #[test]
    fn test_keys_are_independent() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Pressed));
        kb.process_raw(raw(KeyCode::ShiftLeft, ElementState::Pressed));
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Released));
        assert!(!kb.is_pressed(key(KeyCode::KeyW)));
        assert!(kb.is_pressed(key(KeyCode::ShiftLeft)));
    }

    #[test]
    fn test_release_all_on_focus_loss() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Pressed));
        kb.process_raw(raw(KeyCode::Equal, ElementState::Pressed));
        kb.clear_transients();
        kb.release_all();
        assert!(!kb.is_pressed(key(KeyCode::KeyW)));
        assert!(kb.just_released(key(KeyCode::Equal)));
    }

    #[test]
    fn test_stray_release_is_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyG, ElementState::Released));
        assert!(!kb.just_released(key(KeyCode::KeyG)));
    }
}
