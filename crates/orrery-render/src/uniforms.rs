//! GPU uniform layouts shared with `illumination.wgsl` and `skybox.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use orrery_config::LightingConfig;

/// Per-frame camera and light state. `@group(0) @binding(0)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FrameUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// World-space camera position, w = 1.
    pub camera_position: [f32; 4],
    /// World-space point light position, w = 1.
    pub light_position: [f32; 4],
}

impl FrameUniform {
    pub fn new(view: Mat4, projection: Mat4, camera_position: Vec3, light_position: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            camera_position: camera_position.extend(1.0).to_array(),
            light_position: light_position.extend(1.0).to_array(),
        }
    }
}

/// Illumination model parameters. `@group(0) @binding(1)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient_color: [f32; 4],
    pub specular_color: [f32; 4],
    /// `kd, ks, ka, shininess`
    pub coefficients: [f32; 4],
    /// `alpha` (GGX roughness), `f0`, `eta`, `fresnel_power`
    pub optics: [f32; 4],
}

impl MaterialUniform {
    pub fn from_config(lighting: &LightingConfig) -> Self {
        Self {
            ambient_color: rgb(lighting.ambient_color),
            specular_color: rgb(lighting.specular_color),
            coefficients: [lighting.kd, lighting.ks, lighting.ka, lighting.shininess],
            optics: [lighting.alpha, lighting.f0, lighting.eta, lighting.fresnel_power],
        }
    }
}

fn rgb(c: [f32; 3]) -> [f32; 4] {
    [c[0], c[1], c[2], 1.0]
}

/// Per-body transform and surface. `@group(1) @binding(0)`, dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BodyUniform {
    pub model: [[f32; 4]; 4],
    /// View-space normal matrix, columns padded to vec4 as WGSL lays out
    /// `mat3x3<f32>` in uniform memory.
    pub normal: [[f32; 4]; 3],
    /// Base color in rgb, texture coordinate repeat in w.
    pub surface: [f32; 4],
}

impl BodyUniform {
    pub fn new(model: Mat4, normal: Mat3, color: [f32; 3], uv_repeat: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: [
                normal.x_axis.extend(0.0).to_array(),
                normal.y_axis.extend(0.0).to_array(),
                normal.z_axis.extend(0.0).to_array(),
            ],
            surface: [color[0], color[1], color[2], uv_repeat],
        }
    }
}

/// Inverse view-projection for the skybox. `@group(0) @binding(0)` of the
/// skybox pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyboxUniform {
    pub inv_view_proj: [[f32; 4]; 4],
}

impl SkyboxUniform {
    /// `view` must already be rotation-only.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            inv_view_proj: (projection * view).inverse().to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 160);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 64);
        assert_eq!(std::mem::size_of::<BodyUniform>(), 128);
        assert_eq!(std::mem::size_of::<SkyboxUniform>(), 64);
    }

    #[test]
    fn test_body_uniform_pads_normal_columns() {
        let normal = Mat3::from_cols(Vec3::X, Vec3::Y * 2.0, Vec3::Z * 3.0);
        let u = BodyUniform::new(Mat4::IDENTITY, normal, [0.5, 0.25, 1.0], 4.0);
        assert_eq!(u.normal[1], [0.0, 2.0, 0.0, 0.0]);
        assert_eq!(u.normal[2], [0.0, 0.0, 3.0, 0.0]);
        assert_eq!(u.surface, [0.5, 0.25, 1.0, 4.0]);
    }

    #[test]
    fn test_frame_uniform_positions_are_points() {
        let u = FrameUniform::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::new(0.0, 0.0, 7.0), Vec3::Z * 10.0);
        assert_eq!(u.camera_position, [0.0, 0.0, 7.0, 1.0]);
        assert_eq!(u.light_position, [0.0, 0.0, 10.0, 1.0]);
    }

    #[test]
    fn test_material_from_default_lighting() {
        let m = MaterialUniform::from_config(&LightingConfig::default());
        assert_eq!(m.coefficients, [0.8, 0.5, 0.1, 25.0]);
        assert_eq!(m.optics[0], 0.2);
        assert_eq!(m.optics[2], 1.0 / 1.52);
        assert_eq!(m.specular_color, [1.0, 1.0, 1.0, 1.0]);
    }
}
