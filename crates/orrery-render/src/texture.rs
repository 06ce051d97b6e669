//! Body textures and the environment cubemap.
//!
//! Body textures come from image files and fall back to a 1x1 white texture,
//! so a missing file never stops the scene. The environment
//! cubemap is read from six face images (`posx`, `negx`, `posy`, `negy`,
//! `posz`, `negz`) or generated as a sky gradient.

use std::path::{Path, PathBuf};

use glam::Vec3;
use image::{RgbaImage, imageops::FilterType};
use log::{debug, info, warn};

/// Face file stems in wgpu cube layer order.
pub const CUBE_FACES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

const FACE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Edge length of the generated gradient cubemap.
pub const GRADIENT_FACE_SIZE: u32 = 64;

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("cubemap face '{face}' missing in {dir}")]
    MissingFace { face: &'static str, dir: PathBuf },

    #[error("cubemap faces must be square and equal in size, '{face}' is {width}x{height}")]
    FaceSizeMismatch {
        face: &'static str,
        width: u32,
        height: u32,
    },
}

/// Number of mip levels down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Full mip chain for `image`, level 0 first.
pub fn mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(image.width(), image.height());
    let mut chain = vec![image.clone()];
    for level in 1..levels {
        let w = (image.width() >> level).max(1);
        let h = (image.height() >> level).max(1);
        chain.push(image::imageops::resize(image, w, h, FilterType::Triangle));
    }
    chain
}

fn load_rgba(path: &Path) -> Result<RgbaImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(TextureError::ZeroDimensions {
            width: rgba.width(),
            height: rgba.height(),
        });
    }
    Ok(rgba)
}

/// A solid color as a 1x1 image.
pub fn solid_color(color: [f32; 3]) -> RgbaImage {
    let px = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    RgbaImage::from_pixel(1, 1, image::Rgba([px[0], px[1], px[2], 255]))
}

fn write_level(queue: &wgpu::Queue, texture: &wgpu::Texture, mip_level: u32, layer: u32, image: &RgbaImage) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width()),
            rows_per_image: Some(image.height()),
        },
        wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        },
    );
}

/// Layout shared by body textures (`@group(2)`) and the environment map
/// (`@group(3)`, and `@group(1)` of the skybox).
pub fn texture_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// A mipmapped, repeating 2D texture for one body.
pub struct BodyTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl BodyTexture {
    /// Loads `path`, or falls back to plain white when it is absent or
    /// unreadable. The shader tints every texel with the body color, so
    /// white shows the body color unchanged.
    pub fn load_or_white(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, path: Option<&Path>) -> Self {
        let image = match path.map(load_rgba) {
            Some(Ok(image)) => {
                info!("Loaded texture for '{}' ({}x{})", label, image.width(), image.height());
                image
            }
            Some(Err(e)) => {
                warn!("{e}, using solid color for '{label}'");
                solid_color([1.0; 3])
            }
            None => solid_color([1.0; 3]),
        };
        Self::from_image(device, queue, label, &image)
    }

    pub fn from_image(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, image: &RgbaImage) -> Self {
        let chain = mip_chain(image);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: chain.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (level, mip) in chain.iter().enumerate() {
            write_level(queue, &texture, level as u32, 0, mip);
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("body-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        Self { texture, view, sampler }
    }

    pub fn bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        texture_bind_group(device, "body-texture-bg", layout, &self.view, &self.sampler)
    }
}

/// The environment cubemap used by the skybox and the reflective variants.
pub struct EnvironmentMap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub face_size: u32,
}

impl EnvironmentMap {
    /// Loads the six faces from `dir`, falling back to the generated gradient.
    pub fn load_or_gradient(device: &wgpu::Device, queue: &wgpu::Queue, dir: Option<&Path>) -> Self {
        if let Some(dir) = dir {
            match load_faces(dir) {
                Ok(faces) => {
                    info!("Loaded skybox from {:?} ({}px faces)", dir, faces[0].width());
                    return Self::from_faces(device, queue, &faces);
                }
                Err(e) => warn!("{e}, using gradient skybox"),
            }
        }
        Self::from_faces(device, queue, &gradient_faces(GRADIENT_FACE_SIZE))
    }

    /// `faces` are square, equally sized and in [`CUBE_FACES`] order.
    pub fn from_faces(device: &wgpu::Device, queue: &wgpu::Queue, faces: &[RgbaImage; 6]) -> Self {
        let face_size = faces[0].width();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("environment-cubemap"),
            size: wgpu::Extent3d {
                width: face_size,
                height: face_size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, face) in faces.iter().enumerate() {
            write_level(queue, &texture, 0, layer as u32, face);
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("environment-cubemap-view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("environment-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
            face_size,
        }
    }

    pub fn bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        texture_bind_group(device, "environment-bg", layout, &self.view, &self.sampler)
    }
}

fn find_face(dir: &Path, face: &'static str) -> Result<PathBuf, TextureError> {
    FACE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{face}.{ext}")))
        .find(|path| path.exists())
        .ok_or_else(|| TextureError::MissingFace {
            face,
            dir: dir.to_path_buf(),
        })
}

/// Reads the six cube faces from `dir`.
pub fn load_faces(dir: &Path) -> Result<[RgbaImage; 6], TextureError> {
    let mut faces: Vec<RgbaImage> = Vec::with_capacity(6);
    for face in CUBE_FACES {
        let path = find_face(dir, face)?;
        debug!("Cubemap face {face}: {:?}", path);
        let image = load_rgba(&path)?;
        let expected = faces.first().map_or(image.width(), RgbaImage::width);
        if image.width() != image.height() || image.width() != expected {
            return Err(TextureError::FaceSizeMismatch {
                face,
                width: image.width(),
                height: image.height(),
            });
        }
        faces.push(image);
    }
    faces.try_into().map_err(|_| TextureError::MissingFace {
        face: CUBE_FACES[5],
        dir: dir.to_path_buf(),
    })
}

/// Direction through texel center `(x, y)` of cube `face`.
pub fn cube_direction(face: usize, x: u32, y: u32, size: u32) -> Vec3 {
    let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
    let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
    let dir = match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    };
    dir.normalize()
}

/// A vertical sky gradient: pale at the horizon, deep blue overhead and a
/// dark floor below.
pub fn gradient_faces(size: u32) -> [RgbaImage; 6] {
    const ZENITH: Vec3 = Vec3::new(0.05, 0.12, 0.45);
    const HORIZON: Vec3 = Vec3::new(0.55, 0.70, 0.95);
    const NADIR: Vec3 = Vec3::new(0.04, 0.04, 0.06);

    std::array::from_fn(|face| {
        RgbaImage::from_fn(size, size, |x, y| {
            let h = cube_direction(face, x, y, size).y;
            let color = if h >= 0.0 {
                HORIZON.lerp(ZENITH, h.sqrt())
            } else {
                HORIZON.lerp(NADIR, (-h).sqrt())
            };
            let c = (color * 255.0).round();
            image::Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
        })
    })
}
