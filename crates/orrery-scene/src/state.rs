//! The mutable scene owned by the application.

use glam::Mat4;
use orrery_config::Config;
use orrery_input::{KeyboardState, held_directions, movement_compensation};
use tracing::info;

use crate::{BodyTransform, FreeLookCamera, OrbitingBody, PerspectiveProjection};

/// Bodies, camera and the animation toggles.
#[derive(Debug, Clone)]
pub struct SceneState {
    pub bodies: Vec<OrbitingBody>,
    pub camera: FreeLookCamera,
    pub projection: PerspectiveProjection,
    /// While false, body phases are frozen (not reset).
    pub spinning: bool,
    pub wireframe: bool,
}

impl SceneState {
    pub fn new(bodies: Vec<OrbitingBody>, camera: FreeLookCamera, projection: PerspectiveProjection) -> Self {
        Self {
            bodies,
            camera,
            projection,
            spinning: true,
            wireframe: false,
        }
    }

    /// Builds the scene described by `config` for a surface of the given size.
    pub fn from_config(config: &Config, width: u32, height: u32) -> Self {
        let bodies = config.scene.bodies.iter().map(OrbitingBody::from_config).collect();
        let mut state = Self::new(
            bodies,
            FreeLookCamera::from_config(&config.input),
            PerspectiveProjection::from_config(&config.render, width, height),
        );
        state.spinning = config.scene.spinning;
        state.wireframe = config.scene.wireframe;
        state
    }

    /// Advances every body by `dt` seconds, unless the animation is paused.
    pub fn advance(&mut self, dt: f32) {
        if !self.spinning {
            return;
        }
        for body in &mut self.bodies {
            body.advance(dt);
        }
    }

    /// Moves the camera for every held direction key.
    pub fn apply_movement(&mut self, keyboard: &KeyboardState, dt: f32) {
        self.camera.set_movement_compensation(movement_compensation(keyboard));
        for direction in held_directions(keyboard) {
            self.camera.process_key(direction, dt);
        }
    }

    pub fn toggle_spinning(&mut self) -> bool {
        self.spinning = !self.spinning;
        info!(spinning = self.spinning, "Animation toggled");
        self.spinning
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.wireframe = !self.wireframe;
        info!(wireframe = self.wireframe, "Wireframe toggled");
        self.wireframe
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    /// Per-body matrices for the current frame, in body order.
    pub fn body_transforms(&self) -> Vec<BodyTransform> {
        let view = self.view_matrix();
        self.bodies.iter().map(|body| body.compose_matrices(view)).collect()
    }
}
