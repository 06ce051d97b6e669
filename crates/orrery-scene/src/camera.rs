//! Free-look camera with yaw/pitch mouse look and WASD movement.

use glam::{Mat3, Mat4, Vec2, Vec3};
use orrery_config::{InputConfig, RenderConfig};
use orrery_input::{CursorTracker, MoveDirection};

/// Pitch is kept strictly inside this bound so `front` never lines up with
/// the world up vector.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Speed scale applied to each axis while moving diagonally.
pub const DIAGONAL_SCALE: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// A free-look camera.
///
/// Yaw and pitch are in degrees. Yaw `-90` looks down -Z. The `front`,
/// `right` and `up` vectors are recomputed whenever the angles change and
/// always form an orthonormal basis.
#[derive(Debug, Clone)]
pub struct FreeLookCamera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    /// World units per second.
    pub speed: f32,
    /// Degrees per pixel of cursor travel.
    pub sensitivity: f32,
    pub invert_y: bool,
    movement_compensation: bool,
    /// Height the camera is pinned to when anchored to the ground.
    ground_height: Option<f32>,
    cursor: CursorTracker,
}

impl FreeLookCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES),
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            speed: 5.0,
            sensitivity: 0.05,
            invert_y: false,
            movement_compensation: false,
            ground_height: None,
            cursor: CursorTracker::new(),
        };
        camera.update_vectors();
        camera
    }

    pub fn from_config(config: &InputConfig) -> Self {
        let mut camera = Self::new(
            Vec3::from_array(config.start_position),
            config.start_yaw,
            config.start_pitch,
        );
        camera.speed = config.camera_speed;
        camera.sensitivity = config.mouse_sensitivity;
        camera.invert_y = config.invert_y;
        camera.set_anchored_to_ground(config.anchored_to_ground);
        camera
    }

    /// Pins (or releases) the camera to its current height.
    pub fn set_anchored_to_ground(&mut self, anchored: bool) {
        self.ground_height = anchored.then_some(self.position.y);
    }

    pub fn set_movement_compensation(&mut self, active: bool) {
        self.movement_compensation = active;
    }

    pub fn movement_compensation(&self) -> bool {
        self.movement_compensation
    }

    /// Moves the camera one step in `direction` for a frame of `dt` seconds.
    pub fn process_key(&mut self, direction: MoveDirection, dt: f32) {
        let mut velocity = self.speed * dt;
        if self.movement_compensation {
            velocity *= DIAGONAL_SCALE;
        }
        match direction {
            MoveDirection::Forward => self.position += self.front * velocity,
            MoveDirection::Backward => self.position -= self.front * velocity,
            MoveDirection::Left => self.position -= self.right * velocity,
            MoveDirection::Right => self.position += self.right * velocity,
        }
        if let Some(y) = self.ground_height {
            self.position.y = y;
        }
    }

    /// Applies a look offset in pixels. Positive `dy` looks up.
    pub fn process_mouse_delta(&mut self, dx: f32, dy: f32) {
        let dy = if self.invert_y { -dy } else { dy };
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity)
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        self.update_vectors();
    }

    /// Feeds an absolute cursor position. The first sample only calibrates.
    pub fn process_cursor_position(&mut self, x: f64, y: f64) {
        if let Some(offset) = self.cursor.on_cursor_moved(x, y) {
            self.apply_offset(offset);
        }
    }

    /// Feeds a raw device motion delta (used while the cursor is locked).
    pub fn process_raw_motion(&mut self, dx: f64, dy: f64) {
        if let Some(offset) = self.cursor.on_raw_motion(dx, dy) {
            self.apply_offset(offset);
        }
    }

    fn apply_offset(&mut self, offset: Vec2) {
        if offset != Vec2::ZERO {
            self.process_mouse_delta(offset.x, offset.y);
        }
    }

    pub fn cursor_mut(&mut self) -> &mut CursorTracker {
        &mut self.cursor
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

/// Rotation-only copy of `view`, for drawing geometry at infinity.
pub fn skybox_view(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

/// Perspective projection with reverse-Z depth (near maps to 1, far to 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveProjection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveProjection {
    pub fn from_config(config: &RenderConfig, width: u32, height: u32) -> Self {
        let mut projection = Self {
            fov_y: config.fov_y_degrees.to_radians(),
            aspect_ratio: 1.0,
            near: config.near,
            far: config.far,
        };
        projection.set_aspect_ratio(width, height);
        projection
    }

    /// Ignores zero-sized (minimized) surfaces.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    pub fn matrix(&self) -> Mat4 {
        // Swapped planes give reverse-Z.
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const EPS: f32 = 1e-5;

    fn camera() -> FreeLookCamera {
        FreeLookCamera::new(Vec3::new(0.0, 0.0, 7.0), -90.0, 0.0)
    }

    fn assert_orthonormal(cam: &FreeLookCamera) {
        for v in [cam.front(), cam.right(), cam.up()] {
            assert!((v.length() - 1.0).abs() < EPS);
        }
        assert!(cam.front().dot(cam.right()).abs() < EPS);
        assert!(cam.front().dot(cam.up()).abs() < EPS);
        assert!(cam.right().dot(cam.up()).abs() < EPS);
    }

    #[test]
    fn test_default_orientation_looks_down_neg_z() {
        let cam = camera();
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn test_forward_moves_speed_times_dt() {
        let mut cam = camera();
        cam.process_key(MoveDirection::Forward, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 4.5), EPS));
        cam.process_key(MoveDirection::Right, 0.2);
        assert!(cam.position().abs_diff_eq(Vec3::new(1.0, 0.0, 4.5), EPS));
    }

    #[test]
    fn test_compensation_scales_each_axis() {
        let mut cam = camera();
        cam.set_movement_compensation(true);
        cam.process_key(MoveDirection::Forward, 1.0);
        cam.process_key(MoveDirection::Left, 1.0);
        let moved = cam.position() - Vec3::new(0.0, 0.0, 7.0);
        assert!((moved.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_mouse_delta_changes_yaw_and_pitch() {
        let mut cam = camera();
        cam.process_mouse_delta(100.0, 40.0);
        assert!((cam.yaw() - -85.0).abs() < EPS);
        assert!((cam.pitch() - 2.0).abs() < EPS);
        assert_orthonormal(&cam);
    }

    #[test]
    fn test_invert_y_flips_pitch() {
        let mut cam = camera();
        cam.invert_y = true;
        cam.process_mouse_delta(0.0, 40.0);
        assert!((cam.pitch() + 2.0).abs() < EPS);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = camera();
        cam.process_mouse_delta(0.0, 1_000_000.0);
        assert_eq!(cam.pitch(), PITCH_LIMIT_DEGREES);
        assert_orthonormal(&cam);
        cam.process_mouse_delta(0.0, -10_000_000.0);
        assert_eq!(cam.pitch(), -PITCH_LIMIT_DEGREES);
        assert_orthonormal(&cam);
    }

    #[test]
    fn test_first_cursor_sample_does_not_rotate() {
        let mut cam = camera();
        cam.process_cursor_position(600.0, 450.0);
        assert_eq!(cam.yaw(), -90.0);
        assert_eq!(cam.pitch(), 0.0);
        cam.process_cursor_position(620.0, 430.0);
        assert!((cam.yaw() - -89.0).abs() < EPS);
        assert!((cam.pitch() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_anchored_camera_keeps_height() {
        let mut cam = camera();
        cam.set_anchored_to_ground(true);
        cam.process_mouse_delta(0.0, 600.0);
        cam.process_key(MoveDirection::Forward, 1.0);
        assert_eq!(cam.position().y, 0.0);
        assert!(cam.position().z < 7.0);
    }

    #[test]
    fn test_free_camera_climbs_when_pitched() {
        let mut cam = camera();
        cam.process_mouse_delta(0.0, 600.0);
        cam.process_key(MoveDirection::Forward, 1.0);
        assert!(cam.position().y > 0.0);
    }

    #[test]
    fn test_view_matrix_maps_position_to_origin() {
        let mut cam = camera();
        cam.process_mouse_delta(123.0, -45.0);
        let p = cam.view_matrix() * cam.position().extend(1.0);
        assert!(p.abs_diff_eq(Vec4::new(0.0, 0.0, 0.0, 1.0), 1e-4));
        let ahead = cam.view_matrix() * (cam.position() + cam.front()).extend(1.0);
        assert!((ahead.z + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_skybox_view_drops_translation() {
        let cam = camera();
        let view = cam.view_matrix();
        let sky = skybox_view(view);
        assert_eq!(sky.w_axis, Vec4::W);
        assert_eq!(Mat3::from_mat4(sky), Mat3::from_mat4(view));
        // The shared view is untouched.
        assert_eq!(view, cam.view_matrix());
    }

    #[test]
    fn test_reverse_z_projection() {
        let config = RenderConfig::default();
        let proj = PerspectiveProjection::from_config(&config, 1200, 900);
        assert!((proj.aspect_ratio - 4.0 / 3.0).abs() < EPS);
        let near = proj.matrix() * Vec4::new(0.0, 0.0, -config.near, 1.0);
        let far = proj.matrix() * Vec4::new(0.0, 0.0, -config.far, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-4);
        assert!((far.z / far.w).abs() < 1e-4);
    }

    #[test]
    fn test_zero_size_keeps_aspect() {
        let mut proj = PerspectiveProjection::from_config(&RenderConfig::default(), 800, 400);
        proj.set_aspect_ratio(0, 0);
        assert_eq!(proj.aspect_ratio, 2.0);
    }
}
