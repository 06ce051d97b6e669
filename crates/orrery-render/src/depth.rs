//! Reverse-Z depth buffer.
//!
//! The near plane maps to 1.0 and the far plane to 0.0, so the buffer clears
//! to 0.0 and closer fragments win with `GreaterEqual`. The orrery's far
//! plane sits at 10 000 units against a 0.1 near plane; reverse-Z keeps the
//! outer planets free of z-fighting.

pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Far plane under reverse-Z.
    pub const CLEAR_VALUE: f32 = 0.0;

    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Recreates the buffer if the size changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width.max(1) && self.height == height.max(1) {
            return;
        }
        *self = Self::new(device, width, height);
    }

    /// Depth state for opaque geometry.
    pub fn opaque_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled: true,
            depth_compare: Self::COMPARE_FUNCTION,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// Depth state for far-plane geometry that must stay behind everything.
    pub fn background_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            depth_write_enabled: false,
            ..Self::opaque_state()
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_z_constants() {
        assert_eq!(DepthBuffer::FORMAT, wgpu::TextureFormat::Depth32Float);
        assert_eq!(DepthBuffer::CLEAR_VALUE, 0.0);
        assert_eq!(DepthBuffer::COMPARE_FUNCTION, wgpu::CompareFunction::GreaterEqual);
    }

    #[test]
    fn test_background_state_does_not_write() {
        let state = DepthBuffer::background_state();
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::GreaterEqual);
        assert!(DepthBuffer::opaque_state().depth_write_enabled);
    }

    #[test]
    fn test_resize_recreates_only_on_change() {
        let Some((device, _queue)) = crate::gpu::test_device() else {
            eprintln!("No GPU adapter available, skipping");
            return;
        };
        let mut depth = DepthBuffer::new(&device, 1200, 900);
        depth.resize(&device, 1200, 900);
        assert_eq!((depth.width(), depth.height()), (1200, 900));
        depth.resize(&device, 640, 480);
        assert_eq!((depth.width(), depth.height()), (640, 480));
        assert_eq!(depth.texture.width(), 640);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let Some((device, _queue)) = crate::gpu::test_device() else {
            eprintln!("No GPU adapter available, skipping");
            return;
        };
        let depth = DepthBuffer::new(&device, 0, 0);
        assert_eq!((depth.width(), depth.height()), (1, 1));
    }
}
