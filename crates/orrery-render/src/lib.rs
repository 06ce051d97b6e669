//! wgpu rendering for the orrery: device setup, the illumination variant
//! registry, sphere meshes, textures and the skybox.

pub mod buffer;
pub mod depth;
pub mod gpu;
pub mod illumination;
pub mod mesh;
pub mod pass;
pub mod reflection;
pub mod shader;
pub mod skybox;
pub mod texture;
pub mod uniforms;
pub mod variant;

pub use buffer::{BufferAllocator, DynamicUniformBuffer, MeshBuffer, VertexPositionNormalUv};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use illumination::IlluminationPipeline;
pub use mesh::{SphereMesh, generate_sphere};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use reflection::WgslProgram;
pub use shader::{ShaderError, ShaderLibrary};
pub use skybox::SkyboxRenderer;
pub use texture::{BodyTexture, EnvironmentMap, TextureError};
pub use uniforms::{BodyUniform, FrameUniform, MaterialUniform};
pub use variant::{ShaderStage, ShaderVariantSet, ShadingBackend, VariantError, VariantHandle};
