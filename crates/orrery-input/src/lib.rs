//! Input abstraction: held-key tracking, cursor sampling, and the key
//! bindings that drive the camera and scene toggles.

pub mod bindings;
pub mod cursor;
pub mod keyboard;

pub use bindings::{MoveDirection, SceneCommand, command_for_key, held_directions, movement_compensation};
pub use cursor::CursorTracker;
pub use keyboard::{KeyboardState, RawKeyEvent};
