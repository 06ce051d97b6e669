//! Shader source lookup and module caching.
//!
//! Sources ship embedded in the binary. A shader directory can be configured
//! to override them from disk (`<dir>/<name>.wgsl`), which is how shading
//! variants are edited without rebuilding.

use log::{debug, info, warn};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::illumination::VERTEX_ENTRY;
use crate::reflection::WgslProgram;
use crate::skybox::{SKYBOX_FRAGMENT_ENTRY, SKYBOX_VERTEX_ENTRY};
use crate::variant::ShaderStage;

/// Illumination shader: one vertex entry point and one fragment entry point
/// per shading model.
pub const ILLUMINATION_SHADER: &str = "illumination";
pub const SKYBOX_SHADER: &str = "skybox";

struct BuiltinShader {
    name: &'static str,
    source: &'static str,
    /// Entry points the pipelines built from this shader bind by name.
    required: &'static [(ShaderStage, &'static str)],
}

const BUILTIN_SHADERS: &[BuiltinShader] = &[
    BuiltinShader {
        name: ILLUMINATION_SHADER,
        source: include_str!("shaders/illumination.wgsl"),
        required: &[(ShaderStage::Vertex, VERTEX_ENTRY)],
    },
    BuiltinShader {
        name: SKYBOX_SHADER,
        source: include_str!("shaders/skybox.wgsl"),
        required: &[
            (ShaderStage::Vertex, SKYBOX_VERTEX_ENTRY),
            (ShaderStage::Fragment, SKYBOX_FRAGMENT_ENTRY),
        ],
    },
];

fn builtin(name: &str) -> Option<&'static BuiltinShader> {
    BUILTIN_SHADERS.iter().find(|shader| shader.name == name)
}

/// Parses `source`, then checks the entry points a built-in `name` must keep.
fn validate(name: &str, source: &str) -> Result<WgslProgram, ShaderError> {
    let program = WgslProgram::parse(name, source)?;
    for &(stage, entry_point) in builtin(name).map_or(&[][..], |shader| shader.required) {
        program.require_entry_point(stage, entry_point)?;
    }
    Ok(program)
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' failed to compile: {message}")]
    CompilationFailed { name: String, message: String },

    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("shader '{name}' not found")]
    NotFound { name: String },
}

/// Compiled shader modules keyed by name.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer `<dir>/<name>.wgsl` over the embedded sources.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    /// WGSL source for `name`: the override file if present, else the
    /// embedded copy.
    pub fn source(&self, name: &str) -> Result<String, ShaderError> {
        if let Some(dir) = &self.shader_dir {
            let path = dir.join(format!("{name}.wgsl"));
            if path.exists() {
                debug!("Loading shader '{}' from {:?}", name, path);
                return Ok(std::fs::read_to_string(&path)?);
            }
            warn!("No override for shader '{}' in {:?}, using built-in", name, dir);
        }
        builtin(name)
            .map(|shader| shader.source.to_string())
            .ok_or_else(|| ShaderError::NotFound {
                name: name.to_string(),
            })
    }

    /// Parses `name` for reflection without touching the GPU.
    pub fn program(&self, name: &str) -> Result<WgslProgram, ShaderError> {
        validate(name, &self.source(name)?)
    }

    /// Validates and compiles `name`, caching the module.
    pub fn load(&mut self, device: &wgpu::Device, name: &str) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        if let Some(module) = self.modules.get(name) {
            return Ok(module.clone());
        }
        let source = self.source(name)?;
        self.load_from_source(device, name, &source)
    }

    /// Validates `source` with naga, then creates the module under `name`.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        validate(name, source)?;

        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));
        if self.modules.insert(name.to_string(), module.clone()).is_some() {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{ShaderStage, ShaderVariantSet};

    #[test]
    fn test_builtin_shaders_validate() {
        let library = ShaderLibrary::new();
        for BuiltinShader { name, .. } in BUILTIN_SHADERS {
            library
                .program(name)
                .unwrap_or_else(|e| panic!("built-in shader '{name}' invalid: {e}"));
        }
    }

    #[test]
    fn test_illumination_variants() {
        let program = ShaderLibrary::new().program(ILLUMINATION_SHADER).unwrap();
        let set = ShaderVariantSet::discover(&program, ShaderStage::Fragment).unwrap();
        assert_eq!(
            set.names(),
            [
                "illumination_lambertian",
                "illumination_phong",
                "illumination_blinn_phong",
                "illumination_ggx",
                "illumination_reflection",
                "illumination_fresnel",
            ]
        );
        let vertex: Vec<_> = program.entry_points(ShaderStage::Vertex).collect();
        assert_eq!(vertex, ["vs_main"]);
    }

    #[test]
    fn test_unknown_shader() {
        let err = ShaderLibrary::new().source("toon").unwrap_err();
        assert!(matches!(err, ShaderError::NotFound { .. }));
    }

    #[test]
    fn test_override_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        let custom = "@fragment fn illumination_flat() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n";
        std::fs::write(dir.path().join("illumination.wgsl"), custom).unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        assert_eq!(library.source(ILLUMINATION_SHADER).unwrap(), custom);
        // Shaders without an override fall back to the embedded copy.
        assert!(library.source(SKYBOX_SHADER).unwrap().contains("fs_skybox"));
    }

    #[test]
    fn test_override_without_vertex_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let custom = "@fragment fn illumination_flat() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n";
        std::fs::write(dir.path().join("illumination.wgsl"), custom).unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        let err = library.program(ILLUMINATION_SHADER).unwrap_err();
        assert!(matches!(err, ShaderError::CompilationFailed { ref message, .. } if message.contains("vs_main")));
    }
}
