//! Key bindings for the orrery.
//!
//! WASD moves the camera, digits 1-9 pick an illumination variant, `P`
//! pauses the animation, `L` toggles wireframe and `Esc` quits.

use winit::keyboard::KeyCode;

use crate::KeyboardState;

/// A planar camera movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];

    /// The key bound to this direction.
    #[must_use]
    pub fn key(self) -> KeyCode {
        match self {
            MoveDirection::Forward => KeyCode::KeyW,
            MoveDirection::Backward => KeyCode::KeyS,
            MoveDirection::Left => KeyCode::KeyA,
            MoveDirection::Right => KeyCode::KeyD,
        }
    }
}

/// Discrete scene actions triggered by a fresh key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    /// Select the variant at this zero-based index, if it exists.
    SelectVariant(usize),
    ToggleSpinning,
    ToggleWireframe,
    Exit,
}

/// Maps a pressed key to its scene command, if any.
#[must_use]
pub fn command_for_key(code: KeyCode) -> Option<SceneCommand> {
    let digit = match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        KeyCode::KeyP => return Some(SceneCommand::ToggleSpinning),
        KeyCode::KeyL => return Some(SceneCommand::ToggleWireframe),
        KeyCode::Escape => return Some(SceneCommand::Exit),
        _ => return None,
    };
    Some(SceneCommand::SelectVariant(digit - 1))
}

/// Directions whose keys are currently held.
pub fn held_directions(kb: &KeyboardState) -> impl Iterator<Item = MoveDirection> + '_ {
    MoveDirection::ALL
        .into_iter()
        .filter(|dir| kb.is_code_pressed(dir.key()))
}

/// True when exactly one of W/S and exactly one of A/D are held, i.e. the
/// camera is moving diagonally and its speed must be scaled down.
#[must_use]
pub fn movement_compensation(kb: &KeyboardState) -> bool {
    let vertical = kb.is_code_pressed(KeyCode::KeyW) ^ kb.is_code_pressed(KeyCode::KeyS);
    let horizontal = kb.is_code_pressed(KeyCode::KeyA) ^ kb.is_code_pressed(KeyCode::KeyD);
    vertical && horizontal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawKeyEvent;
    use winit::event::ElementState;

    fn held(keys: &[KeyCode]) -> KeyboardState {
        let mut kb = KeyboardState::new();
        for &key in keys {
            kb.process_raw(RawKeyEvent::new(key, ElementState::Pressed));
        }
        kb
    }

    #[test]
    fn test_compensation_on_single_diagonal() {
        assert!(movement_compensation(&held(&[KeyCode::KeyW, KeyCode::KeyA])));
        assert!(movement_compensation(&held(&[KeyCode::KeyS, KeyCode::KeyD])));
    }

    #[test]
    fn test_compensation_off_when_opposing_keys_cancel() {
        assert!(!movement_compensation(&held(&[KeyCode::KeyW, KeyCode::KeyA, KeyCode::KeyD])));
        assert!(!movement_compensation(&held(&[KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyA])));
    }

    #[test]
    fn test_compensation_off_for_straight_movement() {
        assert!(!movement_compensation(&held(&[])));
        assert!(!movement_compensation(&held(&[KeyCode::KeyW])));
        assert!(!movement_compensation(&held(&[KeyCode::KeyA])));
    }

    #[test]
    fn test_digit_maps_to_zero_based_variant() {
        assert_eq!(command_for_key(KeyCode::Digit1), Some(SceneCommand::SelectVariant(0)));
        assert_eq!(command_for_key(KeyCode::Digit9), Some(SceneCommand::SelectVariant(8)));
        assert_eq!(command_for_key(KeyCode::Numpad4), Some(SceneCommand::SelectVariant(3)));
        assert_eq!(command_for_key(KeyCode::Digit0), None);
    }

    #[test]
    fn test_toggle_and_exit_keys() {
        assert_eq!(command_for_key(KeyCode::KeyP), Some(SceneCommand::ToggleSpinning));
        assert_eq!(command_for_key(KeyCode::KeyL), Some(SceneCommand::ToggleWireframe));
        assert_eq!(command_for_key(KeyCode::Escape), Some(SceneCommand::Exit));
        assert_eq!(command_for_key(KeyCode::KeyW), None);
    }

    #[test]
    fn test_held_directions() {
        let kb = held(&[KeyCode::KeyW, KeyCode::KeyD]);
        let dirs: Vec<_> = held_directions(&kb).collect();
        assert_eq!(dirs, vec![MoveDirection::Forward, MoveDirection::Right]);
    }
}
