//! Environment skybox drawn after the bodies.
//!
//! A fullscreen triangle on the far plane samples the environment cubemap
//! along the view ray. The ray comes from the inverse of `projection *
//! rotation-only view`, so the sky never moves with the camera position.

use bytemuck::bytes_of;
use glam::Mat4;

use crate::buffer::BufferAllocator;
use crate::depth::DepthBuffer;
use crate::texture::{EnvironmentMap, texture_bind_group_layout};
use crate::uniforms::SkyboxUniform;

pub const SKYBOX_VERTEX_ENTRY: &str = "vs_skybox";
pub const SKYBOX_FRAGMENT_ENTRY: &str = "fs_skybox";

pub struct SkyboxRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    environment_bind_group: wgpu::BindGroup,
}

impl SkyboxRenderer {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        environment: &EnvironmentMap,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<SkyboxUniform>() as u64),
                },
                count: None,
            }],
        });
        let environment_layout =
            texture_bind_group_layout(device, "skybox-environment-bgl", wgpu::TextureViewDimension::Cube);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &environment_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(SKYBOX_VERTEX_ENTRY),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::background_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(SKYBOX_FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let uniform = SkyboxUniform::new(Mat4::IDENTITY, Mat4::IDENTITY);
        let uniform_buffer = BufferAllocator::new(device).create_uniform("skybox-uniform", &uniform);
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-uniform-bg"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let environment_bind_group = environment.bind_group(device, &environment_layout);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            environment_bind_group,
        }
    }

    /// `sky_view` must be a rotation-only view (see `skybox_view`).
    pub fn update(&self, queue: &wgpu::Queue, sky_view: Mat4, projection: Mat4) {
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&SkyboxUniform::new(sky_view, projection)));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.environment_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat3, Vec3, Vec4};

    /// The ray through the screen center must match the camera's front.
    #[test]
    fn test_center_ray_follows_camera_rotation() {
        let front = Vec3::new(1.0, 0.0, -1.0).normalize();
        let view = Mat4::look_at_rh(Vec3::new(3.0, 2.0, 7.0), Vec3::new(3.0, 2.0, 7.0) + front, Vec3::Y);
        let sky_view = Mat4::from_mat3(Mat3::from_mat4(view));
        let projection = Mat4::perspective_rh(45f32.to_radians(), 4.0 / 3.0, 10_000.0, 0.1);
        let inv = Mat4::from_cols_array_2d(&SkyboxUniform::new(sky_view, projection).inv_view_proj);
        let world = inv * Vec4::new(0.0, 0.0, 0.5, 1.0);
        let dir = (world.truncate() / world.w).normalize();
        assert!(dir.abs_diff_eq(front, 1e-4));
    }
}
