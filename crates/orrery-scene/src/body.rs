//! Orbiting bodies and their per-frame transform composition.
//!
//! Each body carries two cumulative angles: the orbital phase, which sweeps
//! it around its orbit axis, and the self phase, which spins it about its own
//! axis. The model matrix is always composed in the same order:
//!
//! ```text
//! model = R(orbit_phase, orbit_axis) * T(orbit_radius, 0, 0) * R(self_phase, spin_axis) * S(scale)
//! ```
//!
//! so a body with radius zero simply spins in place.

use glam::{Mat3, Mat4, Vec3};
use orrery_config::BodyConfig;

/// Model and normal matrices for one body in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    /// Object space to world space.
    pub model: Mat4,
    /// Inverse-transpose of the upper 3x3 of `view * model`; maps object
    /// space normals into view space.
    pub normal: Mat3,
}

/// A body on a circular orbit, spinning about its own axis.
#[derive(Debug, Clone)]
pub struct OrbitingBody {
    pub name: String,
    /// Cumulative orbital angle in degrees. Never wrapped or reset.
    pub orbit_phase: f32,
    /// Cumulative spin angle in degrees. Never wrapped or reset.
    pub self_phase: f32,
    pub orbit_radius: f32,
    /// Degrees per second.
    pub orbit_speed: f32,
    /// Degrees per second.
    pub spin_speed: f32,
    pub scale: Vec3,
    pub orbit_axis: Vec3,
    pub spin_axis: Vec3,
}

impl OrbitingBody {
    /// A body orbiting and spinning about +Y, starting at phase zero.
    pub fn new(name: impl Into<String>, orbit_radius: f32, orbit_speed: f32, spin_speed: f32) -> Self {
        Self {
            name: name.into(),
            orbit_phase: 0.0,
            self_phase: 0.0,
            orbit_radius,
            orbit_speed,
            spin_speed,
            scale: Vec3::ONE,
            orbit_axis: Vec3::Y,
            spin_axis: Vec3::Y,
        }
    }

    /// Builds a body from its config entry. Zero-length axes fall back to +Y.
    pub fn from_config(config: &BodyConfig) -> Self {
        Self {
            name: config.name.clone(),
            orbit_phase: config.orbit_start,
            self_phase: config.spin_start,
            orbit_radius: config.orbit_radius,
            orbit_speed: config.orbit_speed,
            spin_speed: config.spin_speed,
            scale: Vec3::from_array(config.scale),
            orbit_axis: unit_axis(config.orbit_axis),
            spin_axis: unit_axis(config.spin_axis),
        }
    }

    /// Advances both phases by `dt` seconds at the body's speeds.
    pub fn advance(&mut self, dt: f32) {
        self.orbit_phase += dt * self.orbit_speed;
        self.self_phase += dt * self.spin_speed;
    }

    /// The model matrix for the current phases.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(self.orbit_axis, self.orbit_phase.to_radians())
            * Mat4::from_translation(Vec3::new(self.orbit_radius, 0.0, 0.0))
            * Mat4::from_axis_angle(self.spin_axis, self.self_phase.to_radians())
            * Mat4::from_scale(self.scale)
    }

    /// Composes the model matrix and the view-space normal matrix.
    pub fn compose_matrices(&self, view: Mat4) -> BodyTransform {
        let model = self.model_matrix();
        BodyTransform {
            model,
            normal: normal_matrix(view * model),
        }
    }
}

/// Inverse-transpose of the upper 3x3 of `model_view`.
pub fn normal_matrix(model_view: Mat4) -> Mat3 {
    Mat3::from_mat4(model_view).inverse().transpose()
}

fn unit_axis(axis: [f32; 3]) -> Vec3 {
    Vec3::from_array(axis).try_normalize().unwrap_or(Vec3::Y)
}
