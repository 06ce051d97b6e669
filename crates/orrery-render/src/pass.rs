//! Per-frame command encoding.
//!
//! [`RenderPassBuilder`] describes the clear color and depth attachment of
//! the scene pass; [`FrameEncoder`] owns the command encoder and surface
//! texture for one frame and presents it on [`submit`](FrameEncoder::submit).

use std::sync::Arc;

use crate::depth::DepthBuffer;

#[derive(Debug)]
struct DepthAttachment {
    view: wgpu::TextureView,
    clear_value: f32,
}

/// Fluent description of a render pass that clears color and depth.
#[derive(Debug)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    depth: Option<DepthAttachment>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    pub fn new() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            depth: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Clear color from linear RGB components.
    pub fn clear_rgb(self, rgb: [f32; 3]) -> Self {
        self.clear_color(wgpu::Color {
            r: f64::from(rgb[0]),
            g: f64::from(rgb[1]),
            b: f64::from(rgb[2]),
            a: 1.0,
        })
    }

    /// Attaches `depth`, cleared to the reverse-Z far plane.
    pub fn depth(mut self, depth: &DepthBuffer) -> Self {
        self.depth = Some(DepthAttachment {
            view: depth.view.clone(),
            clear_value: DepthBuffer::CLEAR_VALUE,
        });
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            self.depth
                .as_ref()
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(depth.clear_value),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Command encoder and surface texture for one frame.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    queue: Arc<wgpu::Queue>,
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, queue: Arc<wgpu::Queue>, surface_texture: wgpu::SurfaceTexture) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            encoder,
            queue,
            surface_texture,
            surface_view,
        }
    }

    pub fn begin_render_pass<'a>(&'a mut self, builder: &RenderPassBuilder) -> wgpu::RenderPass<'a> {
        builder.begin(&mut self.encoder, &self.surface_view)
    }

    /// Submits the recorded commands and presents the frame.
    pub fn submit(self) {
        self.queue.submit([self.encoder.finish()]);
        self.surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_rgb_sets_opaque_color() {
        let builder = RenderPassBuilder::new().clear_rgb([0.26, 0.46, 0.98]);
        assert!((builder.clear_color.r - 0.26).abs() < 1e-6);
        assert!((builder.clear_color.g - 0.46).abs() < 1e-6);
        assert!((builder.clear_color.b - 0.98).abs() < 1e-6);
        assert_eq!(builder.clear_color.a, 1.0);
    }

    #[test]
    fn test_depth_attachment_is_optional() {
        let builder = RenderPassBuilder::new();
        assert!(builder.depth.is_none());
    }

    #[test]
    fn test_label_is_stored() {
        let builder = RenderPassBuilder::new().label("scene-pass");
        assert_eq!(builder.label, Some("scene-pass"));
    }

    #[test]
    fn test_depth_clears_to_far_plane() {
        let Some((device, _queue)) = crate::gpu::test_device() else {
            eprintln!("No GPU adapter available, skipping");
            return;
        };
        let depth = DepthBuffer::new(&device, 64, 64);
        let builder = RenderPassBuilder::new().depth(&depth);
        assert_eq!(builder.depth.as_ref().map(|d| d.clear_value), Some(0.0));
    }
}
