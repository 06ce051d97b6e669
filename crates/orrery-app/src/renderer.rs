//! GPU resources for one orrery scene and the per-frame draw.
//!
//! Owns everything built at startup (pipelines, sphere mesh, uniform
//! buffers, textures, skybox) and turns a [`SceneState`] plus the active
//! [`VariantHandle`] into one submitted frame.

use bytemuck::bytes_of;
use glam::Vec3;
use orrery_config::Config;
use orrery_render::{
    BodyTexture, BodyUniform, BufferAllocator, DepthBuffer, DynamicUniformBuffer, EnvironmentMap,
    FrameEncoder, FrameUniform, IlluminationPipeline, MaterialUniform, MeshBuffer, RenderContext,
    RenderPassBuilder, ShaderError, ShaderLibrary, ShaderVariantSet, SkyboxRenderer, SurfaceError,
    VariantHandle, VertexPositionNormalUv, generate_sphere,
    shader::{ILLUMINATION_SHADER, SKYBOX_SHADER},
};
use orrery_scene::{BodyTransform, SceneState, skybox_view};
use tracing::{debug, info};

/// Surface description of one body: tint and texture repeat factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySurface {
    pub color: [f32; 3],
    pub uv_repeat: f32,
}

/// Packs per-body matrices and surfaces into uniform values, in body order.
pub fn body_uniforms(transforms: &[BodyTransform], surfaces: &[BodySurface]) -> Vec<BodyUniform> {
    transforms
        .iter()
        .zip(surfaces)
        .map(|(t, s)| BodyUniform::new(t.model, t.normal, s.color, s.uv_repeat))
        .collect()
}

pub struct SceneRenderer {
    illumination: IlluminationPipeline,
    skybox: SkyboxRenderer,
    depth: DepthBuffer,
    sphere: MeshBuffer,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    body_buffer: DynamicUniformBuffer<BodyUniform>,
    body_bind_group: wgpu::BindGroup,
    body_textures: Vec<wgpu::BindGroup>,
    environment_bind_group: wgpu::BindGroup,
    surfaces: Vec<BodySurface>,
    light_position: Vec3,
    pass: RenderPassBuilder,
    clear_color: [f32; 3],
}

impl SceneRenderer {
    /// Builds every GPU resource the scene needs.
    ///
    /// One illumination pipeline per entry of `variants` is compiled here, so
    /// switching variants later never recompiles anything.
    pub fn new(
        gpu: &RenderContext,
        library: &mut ShaderLibrary,
        variants: &ShaderVariantSet,
        config: &Config,
    ) -> Result<Self, ShaderError> {
        let device = &gpu.device;
        let queue = gpu.queue.as_ref();
        let (width, height) = gpu.size();

        let illumination_shader = library.load(device, ILLUMINATION_SHADER)?;
        let skybox_shader = library.load(device, SKYBOX_SHADER)?;

        let illumination = IlluminationPipeline::new(
            device,
            &illumination_shader,
            variants,
            gpu.surface_format,
            gpu.supports_wireframe,
        );
        let depth = DepthBuffer::new(device, width, height);

        let sphere_mesh = generate_sphere(config.render.sphere_subdivisions);
        debug!(
            triangles = sphere_mesh.triangle_count(),
            "Sphere mesh generated"
        );
        let allocator = BufferAllocator::new(device);
        let sphere = allocator.create_mesh::<VertexPositionNormalUv>(
            "sphere",
            &sphere_mesh.vertices,
            &sphere_mesh.indices,
        );

        let frame_buffer = allocator.create_uniform("frame-uniform", &FrameUniform::default());
        let material_buffer = allocator.create_uniform(
            "material-uniform",
            &MaterialUniform::from_config(&config.lighting),
        );
        let frame_bind_group = illumination.frame_bind_group(device, &frame_buffer, &material_buffer);

        let body_count = config.scene.bodies.len().max(1) as u32;
        let body_buffer = DynamicUniformBuffer::new(device, "body-uniforms", body_count);
        let body_bind_group = illumination.body_bind_group(device, &body_buffer);

        let body_textures = config
            .scene
            .bodies
            .iter()
            .map(|body| {
                BodyTexture::load_or_white(device, queue, &body.name, body.texture.as_deref())
                    .bind_group(device, &illumination.texture_layout)
            })
            .collect();
        let surfaces = config
            .scene
            .bodies
            .iter()
            .map(|body| BodySurface {
                color: body.color,
                uv_repeat: body.uv_repeat,
            })
            .collect();

        let environment = EnvironmentMap::load_or_gradient(device, queue, config.render.skybox_dir.as_deref());
        let environment_bind_group = environment.bind_group(device, &illumination.environment_layout);
        let skybox = SkyboxRenderer::new(device, &skybox_shader, gpu.surface_format, &environment);

        let clear_color = config.render.clear_color;
        let pass = Self::pass_builder(clear_color, &depth);

        info!(
            variants = illumination.variant_count(),
            bodies = config.scene.bodies.len(),
            wireframe = illumination.supports_wireframe(),
            "Scene renderer ready"
        );

        Ok(Self {
            illumination,
            skybox,
            depth,
            sphere,
            frame_buffer,
            frame_bind_group,
            body_buffer,
            body_bind_group,
            body_textures,
            environment_bind_group,
            surfaces,
            light_position: Vec3::from(config.lighting.light_position),
            pass,
            clear_color,
        })
    }

    fn pass_builder(clear_color: [f32; 3], depth: &DepthBuffer) -> RenderPassBuilder {
        RenderPassBuilder::new()
            .label("scene-pass")
            .clear_rgb(clear_color)
            .depth(depth)
    }

    pub fn supports_wireframe(&self) -> bool {
        self.illumination.supports_wireframe()
    }

    /// Recreates size-dependent resources after the surface was resized.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
        self.pass = Self::pass_builder(self.clear_color, &self.depth);
    }

    /// Draws every body with the active variant, then the skybox.
    pub fn render(
        &mut self,
        gpu: &RenderContext,
        scene: &SceneState,
        variant: VariantHandle,
    ) -> Result<(), SurfaceError> {
        let view = scene.view_matrix();
        let projection = scene.projection.matrix();

        gpu.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytes_of(&FrameUniform::new(
                view,
                projection,
                scene.camera.position(),
                self.light_position,
            )),
        );
        let uniforms = body_uniforms(&scene.body_transforms(), &self.surfaces);
        self.body_buffer.write(&gpu.queue, &uniforms);
        self.skybox.update(&gpu.queue, skybox_view(view), projection);

        let surface_texture = gpu.get_current_texture()?;
        let mut frame = FrameEncoder::new(&gpu.device, gpu.queue.clone(), surface_texture);
        {
            let mut pass = frame.begin_render_pass(&self.pass);
            if self.illumination.bind_variant(&mut pass, variant, scene.wireframe) {
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_bind_group(3, &self.environment_bind_group, &[]);
                self.sphere.bind(&mut pass);
                for (index, texture) in self.body_textures.iter().enumerate().take(uniforms.len()) {
                    let offset = self.body_buffer.offset(index as u32);
                    pass.set_bind_group(1, &self.body_bind_group, &[offset]);
                    pass.set_bind_group(2, texture, &[]);
                    self.sphere.draw(&mut pass);
                }
            }
            // Last: the sky only fills pixels no body has written depth to.
            self.skybox.render(&mut pass);
        }
        frame.submit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat3, Mat4};

    #[test]
    fn test_body_uniforms_follow_body_order() {
        let transforms = [
            BodyTransform {
                model: Mat4::IDENTITY,
                normal: Mat3::IDENTITY,
            },
            BodyTransform {
                model: Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
                normal: Mat3::IDENTITY,
            },
        ];
        let surfaces = [
            BodySurface {
                color: [1.0, 0.9, 0.2],
                uv_repeat: 1.0,
            },
            BodySurface {
                color: [0.2, 0.4, 1.0],
                uv_repeat: 4.0,
            },
        ];
        let uniforms = body_uniforms(&transforms, &surfaces);
        assert_eq!(uniforms.len(), 2);
        assert_eq!(uniforms[0].surface, [1.0, 0.9, 0.2, 1.0]);
        assert_eq!(uniforms[1].surface, [0.2, 0.4, 1.0, 4.0]);
        assert_eq!(uniforms[1].model[3][0], 2.0);
    }

    #[test]
    fn test_body_uniforms_truncate_to_shorter_input() {
        let transforms = [BodyTransform {
            model: Mat4::IDENTITY,
            normal: Mat3::IDENTITY,
        }];
        assert!(body_uniforms(&transforms, &[]).is_empty());
    }
}
