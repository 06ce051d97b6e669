//! Orrery application: the winit event loop, window and per-frame rendering
//! of the animated solar system.

pub mod renderer;
pub mod window;

pub use window::{OrreryApp, StartupError, run};
