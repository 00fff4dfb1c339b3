//! Viewer actions and the keys bound to them.
//!
//! [`InputMap`] maps each [`Action`] to one or more keys and round-trips
//! through RON so users can rebind. [`ActionResolver`] turns the current
//! [`KeyboardState`] into an [`ActionState`] once per frame.

use crate::keyboard::KeyboardState;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Serde for [`KeyCode`], by variant name (`"KeyW"`, `"F11"`).
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    pub fn serialize<S: Serializer>(codes: &[KeyCode], s: S) -> Result<S::Ok, S::Error> {
        codes
            .iter()
            .map(|c| format!("{c:?}"))
            .collect::<Vec<_>>()
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<KeyCode>, D::Error> {
        Vec::<String>::deserialize(d)?
            .into_iter()
            .map(|name| {
                parse(&name).ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
            })
            .collect()
    }

    fn parse(s: &str) -> Option<KeyCode> {
        Some(match s {
            "KeyA" => KeyCode::KeyA,
            "KeyB" => KeyCode::KeyB,
            "KeyC" => KeyCode::KeyC,
            "KeyD" => KeyCode::KeyD,
            "KeyE" => KeyCode::KeyE,
            "KeyF" => KeyCode::KeyF,
            "KeyG" => KeyCode::KeyG,
            "KeyH" => KeyCode::KeyH,
            "KeyI" => KeyCode::KeyI,
            "KeyJ" => KeyCode::KeyJ,
            "KeyK" => KeyCode::KeyK,
            "KeyL" => KeyCode::KeyL,
            "KeyM" => KeyCode::KeyM,
            "KeyN" => KeyCode::KeyN,
            "KeyO" => KeyCode::KeyO,
            "KeyP" => KeyCode::KeyP,
            "KeyQ" => KeyCode::KeyQ,
            "KeyR" => KeyCode::KeyR,
            "KeyS" => KeyCode::KeyS,
            "KeyT" => KeyCode::KeyT,
            "KeyU" => KeyCode::KeyU,
            "KeyV" => KeyCode::KeyV,
            "KeyW" => KeyCode::KeyW,
            "KeyX" => KeyCode::KeyX,
            "KeyY" => KeyCode::KeyY,
            "KeyZ" => KeyCode::KeyZ,
            "Digit0" => KeyCode::Digit0,
            "Digit1" => KeyCode::Digit1,
            "Digit2" => KeyCode::Digit2,
            "Digit3" => KeyCode::Digit3,
            "Digit4" => KeyCode::Digit4,
            "Digit5" => KeyCode::Digit5,
            "Digit6" => KeyCode::Digit6,
            "Digit7" => KeyCode::Digit7,
            "Digit8" => KeyCode::Digit8,
            "Digit9" => KeyCode::Digit9,
            "Minus" => KeyCode::Minus,
            "Equal" => KeyCode::Equal,
            "NumpadAdd" => KeyCode::NumpadAdd,
            "NumpadSubtract" => KeyCode::NumpadSubtract,
            "Space" => KeyCode::Space,
            "Enter" => KeyCode::Enter,
            "Escape" => KeyCode::Escape,
            "Tab" => KeyCode::Tab,
            "ShiftLeft" => KeyCode::ShiftLeft,
            "ShiftRight" => KeyCode::ShiftRight,
            "ControlLeft" => KeyCode::ControlLeft,
            "ControlRight" => KeyCode::ControlRight,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "F11" => KeyCode::F11,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Quit,
    /// Freeze orbits and spin.
    Pause,
    Resume,
    /// Held: lower the orbit speed multiplier.
    SpeedDown,
    /// Held: raise the orbit speed multiplier.
    SpeedUp,
    FollowOn,
    FollowOff,
    /// Follow planet 0..7.
    Target1,
    Target2,
    Target3,
    Target4,
    Target5,
    Target6,
    Target7,
    Target8,
    ToggleFullscreen,
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Boost,
}

impl Action {
    pub const TARGETS: [Action; 8] = [
        Action::Target1,
        Action::Target2,
        Action::Target3,
        Action::Target4,
        Action::Target5,
        Action::Target6,
        Action::Target7,
        Action::Target8,
    ];

    /// Zero-based planet index for the target actions.
    #[must_use]
    pub fn target_index(self) -> Option<usize> {
        Self::TARGETS.iter().position(|a| *a == self)
    }
}

/// Action to key bindings. Several keys per action combine with OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMap {
    #[serde(default)]
    pub bindings: HashMap<Action, KeyList>,
}

/// Keys bound to one action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyList(#[serde(with = "keycode_serde")] pub Vec<KeyCode>);

impl Default for InputMap {
    fn default() -> Self {
        let mut map = Self::new();
        map.set_bindings(Action::Quit, &[KeyCode::Escape]);
        map.set_bindings(Action::Pause, &[KeyCode::KeyP]);
        map.set_bindings(Action::Resume, &[KeyCode::KeyO]);
        map.set_bindings(Action::SpeedDown, &[KeyCode::Minus, KeyCode::NumpadSubtract]);
        map.set_bindings(Action::SpeedUp, &[KeyCode::Equal, KeyCode::NumpadAdd]);
        map.set_bindings(Action::FollowOn, &[KeyCode::KeyF]);
        map.set_bindings(Action::FollowOff, &[KeyCode::KeyG]);
        let digits = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
            KeyCode::Digit6,
            KeyCode::Digit7,
            KeyCode::Digit8,
        ];
        for (action, digit) in Action::TARGETS.into_iter().zip(digits) {
            map.set_bindings(action, &[digit]);
        }
        map.set_bindings(Action::ToggleFullscreen, &[KeyCode::F11]);
        map.set_bindings(Action::MoveForward, &[KeyCode::KeyW]);
        map.set_bindings(Action::MoveBack, &[KeyCode::KeyS]);
        map.set_bindings(Action::MoveLeft, &[KeyCode::KeyA]);
        map.set_bindings(Action::MoveRight, &[KeyCode::KeyD]);
        map.set_bindings(Action::MoveUp, &[KeyCode::KeyQ]);
        map.set_bindings(Action::MoveDown, &[KeyCode::KeyE]);
        map.set_bindings(Action::Boost, &[KeyCode::ShiftLeft, KeyCode::ShiftRight]);
        map
    }
}

impl InputMap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Replace the keys bound to `action`.
    pub fn set_bindings(&mut self, action: Action, keys: &[KeyCode]) {
        self.bindings.insert(action, KeyList(keys.to_vec()));
    }

    #[must_use]
    pub fn get_bindings(&self, action: Action) -> &[KeyCode] {
        self.bindings.get(&action).map_or(&[], |k| k.0.as_slice())
    }

    /// Keys bound to more than one action.
    #[must_use]
    pub fn conflicts(&self) -> Vec<(KeyCode, Vec<Action>)> {
        let mut seen: HashMap<KeyCode, Vec<Action>> = HashMap::new();
        for (action, keys) in &self.bindings {
            for key in &keys.0 {
                seen.entry(*key).or_default().push(*action);
            }
        }
        seen.into_iter().filter(|(_, actions)| actions.len() > 1).collect()
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load bindings, falling back to the defaults (with a warning) when the
    /// file is missing or malformed. Actions absent from the file keep their
    /// default keys.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Could not read key bindings {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_ron(&contents) {
            Ok(loaded) => {
                let mut map = Self::default();
                map.bindings.extend(loaded.bindings);
                map
            }
            Err(e) => {
                warn!("Malformed key bindings {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn default_config_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|d| d.join("solar-system").join("input.ron"))
    }
}

/// Which actions are held this frame and which started this frame.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    active: HashSet<Action>,
    triggered: HashSet<Action>,
}

impl ActionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self, action: Action) -> bool {
        self.active.contains(&action)
    }

    /// True on the frame one of the action's keys went down.
    #[must_use]
    pub fn just_activated(&self, action: Action) -> bool {
        self.triggered.contains(&action)
    }

    /// `+1` when only `positive` is held, `-1` when only `negative` is.
    #[must_use]
    pub fn axis(&self, positive: Action, negative: Action) -> f32 {
        let mut value = 0.0;
        if self.is_active(positive) {
            value += 1.0;
        }
        if self.is_active(negative) {
            value -= 1.0;
        }
        value
    }
}

pub struct ActionResolver;

impl ActionResolver {
    /// Recompute `state` from the keyboard. Call once per frame, before the
    /// keyboard's transients are cleared.
    pub fn resolve(map: &InputMap, keyboard: &KeyboardState, state: &mut ActionState) {
        state.active.clear();
        state.triggered.clear();
        for (action, keys) in &map.bindings {
            for key in keys.0.iter().map(|k| PhysicalKey::Code(*k)) {
                // A tap shorter than a frame still counts as active once.
                if keyboard.is_pressed(key) || keyboard.just_pressed(key) {
                    state.active.insert(*action);
                }
                if keyboard.just_pressed(key) {
                    state.triggered.insert(*action);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::RawKeyEvent;
    use winit::event::ElementState;

    fn press(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    fn release(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Released,
            repeat: false,
        });
    }

    #[test]
    fn test_default_map_has_no_conflicts() {
        assert!(InputMap::default().conflicts().is_empty());
    }

    #[test]
    fn test_target_indices() {
        assert_eq!(Action::Target1.target_index(), Some(0));
        assert_eq!(Action::Target8.target_index(), Some(7));
        assert_eq!(Action::Pause.target_index(), None);
    }

    #[test]
    fn test_held_and_triggered() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();

        press(&mut kb, KeyCode::F11);
        ActionResolver::resolve(&map, &kb, &mut state);
        assert!(state.just_activated(Action::ToggleFullscreen));

        kb.clear_transients();
        ActionResolver::resolve(&map, &kb, &mut state);
        assert!(state.is_active(Action::ToggleFullscreen));
        assert!(!state.just_activated(Action::ToggleFullscreen));
    }

    #[test]
    fn test_tap_within_one_frame_counts() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();
        press(&mut kb, KeyCode::KeyP);
        release(&mut kb, KeyCode::KeyP);
        ActionResolver::resolve(&map, &kb, &mut state);
        assert!(state.is_active(Action::Pause));
    }

    #[test]
    fn test_axis_cancels_out() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();
        press(&mut kb, KeyCode::KeyW);
        ActionResolver::resolve(&map, &kb, &mut state);
        assert_eq!(state.axis(Action::MoveForward, Action::MoveBack), 1.0);
        press(&mut kb, KeyCode::KeyS);
        ActionResolver::resolve(&map, &kb, &mut state);
        assert_eq!(state.axis(Action::MoveForward, Action::MoveBack), 0.0);
    }

    #[test]
    fn test_either_shift_boosts() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        let mut state = ActionState::new();
        press(&mut kb, KeyCode::ShiftRight);
        ActionResolver::resolve(&map, &kb, &mut state);
        assert!(state.is_active(Action::Boost));
    }

    #[test]
    fn test_ron_round_trip_keeps_custom_binding() {
        let mut map = InputMap::default();
        map.set_bindings(Action::Pause, &[KeyCode::Space]);
        let restored = InputMap::from_ron(&map.to_ron().expect("serialize")).expect("parse");
        assert_eq!(restored.get_bindings(Action::Pause), &[KeyCode::Space]);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("input.ron");
        let mut map = InputMap::default();
        map.set_bindings(Action::Boost, &[KeyCode::ControlLeft]);
        map.save(&path).expect("save");
        assert_eq!(InputMap::load(&path), map);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("input.ron");
        std::fs::write(&path, r#"(bindings: { Pause: ["KeyZ"] })"#).expect("write");
        let map = InputMap::load(&path);
        assert_eq!(map.get_bindings(Action::Pause), &[KeyCode::KeyZ]);
        assert_eq!(map.get_bindings(Action::Resume), &[KeyCode::KeyO]);
    }

    #[test]
    fn test_malformed_or_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = dir.path().join("bad.ron");
        std::fs::write(&bad, "not ron {{{").expect("write");
        assert_eq!(InputMap::load(&bad), InputMap::default());
        assert_eq!(InputMap::load(&dir.path().join("missing.ron")), InputMap::default());
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        assert!(InputMap::from_ron(r#"(bindings: { Pause: ["NoSuchKey"] })"#).is_err());
    }
}
