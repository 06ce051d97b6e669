//! Held keys, tracked by physical position.
//!
//! Physical codes keep WASD on the same keys on AZERTY or Dvorak layouts.
//! The camera reads the held set every frame; scene toggles react only to
//! the press that starts a hold.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// The parts of a winit key event the orrery cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    /// OS auto-repeat while the key stays down.
    pub repeat: bool,
}

impl RawKeyEvent {
    /// A non-repeat event for a key code.
    pub fn new(code: KeyCode, state: ElementState) -> Self {
        Self {
            key: PhysicalKey::Code(code),
            state,
            repeat: false,
        }
    }
}

impl From<&KeyEvent> for RawKeyEvent {
    fn from(event: &KeyEvent) -> Self {
        Self {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<PhysicalKey>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a winit event. `true` means a new hold started.
    pub fn process_event(&mut self, event: &KeyEvent) -> bool {
        self.process_raw(RawKeyEvent::from(event))
    }

    /// Records an event; auto-repeats are dropped. `true` means a new hold
    /// started.
    pub fn process_raw(&mut self, event: RawKeyEvent) -> bool {
        if event.repeat {
            return false;
        }
        if event.state.is_pressed() {
            // A second press without a release (lost focus, missed event)
            // does not start a new hold.
            self.held.insert(event.key)
        } else {
            self.held.remove(&event.key);
            false
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.held.contains(&key)
    }

    #[must_use]
    pub fn is_code_pressed(&self, code: KeyCode) -> bool {
        self.is_pressed(PhysicalKey::Code(code))
    }

    /// Forgets every key. Call when the window loses focus, since the
    /// matching releases will never arrive.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
