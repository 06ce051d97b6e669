//! Render pipelines for the illumination variants.
//!
//! Every discovered variant gets its own pipeline, built once at startup
//! against the same vertex stage and bind group layouts. Activating a
//! variant at draw time is a single `set_pipeline`.
//!
//! Bind groups:
//! - `@group(0)`: [`FrameUniform`] and [`MaterialUniform`]
//! - `@group(1)`: [`BodyUniform`], one dynamic-offset slot per body
//! - `@group(2)`: body texture and sampler
//! - `@group(3)`: environment cubemap and sampler

use std::collections::HashMap;
use std::num::NonZeroU64;

use log::{debug, info};

use crate::buffer::{DynamicUniformBuffer, VertexPositionNormalUv};
use crate::depth::DepthBuffer;
use crate::texture::texture_bind_group_layout;
use crate::uniforms::{BodyUniform, FrameUniform, MaterialUniform};
use crate::variant::{ShaderVariantSet, VariantHandle};

/// Vertex entry point shared by all variants.
pub const VERTEX_ENTRY: &str = "vs_main";

struct VariantPipelines {
    fill: wgpu::RenderPipeline,
    line: Option<wgpu::RenderPipeline>,
}

pub struct IlluminationPipeline {
    pipelines: HashMap<VariantHandle, VariantPipelines>,
    pub frame_layout: wgpu::BindGroupLayout,
    pub body_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub environment_layout: wgpu::BindGroupLayout,
    wireframe: bool,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages, dynamic: bool, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

impl IlluminationPipeline {
    /// Builds fill pipelines for every variant in `variants`, plus line
    /// pipelines when `wireframe` is supported by the device.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        variants: &ShaderVariantSet,
        surface_format: wgpu::TextureFormat,
        wireframe: bool,
    ) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("illumination-frame-bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT, false, size_of::<FrameUniform>()),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, false, size_of::<MaterialUniform>()),
            ],
        });
        let body_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("illumination-body-bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                true,
                size_of::<BodyUniform>(),
            )],
        });
        let texture_layout =
            texture_bind_group_layout(device, "illumination-texture-bgl", wgpu::TextureViewDimension::D2);
        let environment_layout =
            texture_bind_group_layout(device, "illumination-environment-bgl", wgpu::TextureViewDimension::Cube);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("illumination-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &body_layout, &texture_layout, &environment_layout],
            immediate_size: 0,
        });

        let build = |entry_point: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(entry_point),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers: &[VertexPositionNormalUv::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    unclipped_depth: false,
                    polygon_mode,
                    conservative: false,
                },
                depth_stencil: Some(DepthBuffer::opaque_state()),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some(entry_point),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        };

        let pipelines = variants
            .iter()
            .map(|(name, handle)| {
                debug!("Building pipeline for '{name}'");
                let pipelines = VariantPipelines {
                    fill: build(name, wgpu::PolygonMode::Fill),
                    line: wireframe.then(|| build(name, wgpu::PolygonMode::Line)),
                };
                (handle, pipelines)
            })
            .collect::<HashMap<_, _>>();
        info!(
            "Built {} illumination pipeline(s){}",
            pipelines.len(),
            if wireframe { " with wireframe" } else { "" }
        );

        Self {
            pipelines,
            frame_layout,
            body_layout,
            texture_layout,
            environment_layout,
            wireframe,
        }
    }

    /// Activates `handle` on `pass`. Falls back to the fill pipeline when
    /// wireframe is requested but unsupported. Returns `false` for unknown
    /// handles.
    pub fn bind_variant(&self, pass: &mut wgpu::RenderPass<'_>, handle: VariantHandle, wireframe: bool) -> bool {
        let Some(variant) = self.pipelines.get(&handle) else {
            return false;
        };
        let pipeline = match (&variant.line, wireframe) {
            (Some(line), true) => line,
            _ => &variant.fill,
        };
        pass.set_pipeline(pipeline);
        true
    }

    pub fn supports_wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn variant_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn frame_bind_group(
        &self,
        device: &wgpu::Device,
        frame: &wgpu::Buffer,
        material: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("illumination-frame-bg"),
            layout: &self.frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material.as_entire_binding(),
                },
            ],
        })
    }

    /// Bind group over one [`BodyUniform`] window of `bodies`; select the
    /// body with a dynamic offset.
    pub fn body_bind_group(&self, device: &wgpu::Device, bodies: &DynamicUniformBuffer<BodyUniform>) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("illumination-body-bg"),
            layout: &self.body_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &bodies.buffer,
                    offset: 0,
                    size: bodies.binding_size(),
                }),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{ILLUMINATION_SHADER, ShaderLibrary};
    use crate::variant::ShaderStage;

    #[test]
    fn test_pipeline_per_variant() {
        let Some((device, _queue)) = crate::gpu::test_device() else {
            eprintln!("No GPU adapter available, skipping");
            return;
        };
        let mut library = ShaderLibrary::new();
        let program = library.program(ILLUMINATION_SHADER).unwrap();
        let variants = ShaderVariantSet::discover(&program, ShaderStage::Fragment).unwrap();
        let shader = library.load(&device, ILLUMINATION_SHADER).unwrap();
        let pipeline = IlluminationPipeline::new(
            &device,
            &shader,
            &variants,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            false,
        );
        assert_eq!(pipeline.variant_count(), variants.len());
        assert!(!pipeline.supports_wireframe());
    }
}
