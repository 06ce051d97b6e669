//! Orrery settings: window, camera, lighting and the bodies of the scene, persisted as `config.ron`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";
const APP_NAME: &str = "orrery";
/// Deepest icosphere refinement accepted by [`Config::validate`].
pub const MAX_SPHERE_SUBDIVISIONS: u32 = 7;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Camera and mouse settings.
    pub input: InputConfig,
    /// Light and material coefficients shared by every illumination variant.
    pub lighting: LightingConfig,
    /// Scene content and initial toggles.
    pub scene: SceneConfig,
    /// Log level and FPS reporting.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Inner width, logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Allow the user to resize the window.
    pub resizable: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Frame buffer clear color (linear RGB).
    pub clear_color: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Icosphere subdivision level used for every body.
    pub sphere_subdivisions: u32,
    /// Directory to load `.wgsl` files from instead of the embedded sources.
    pub shader_dir: Option<PathBuf>,
    /// Directory holding the six skybox faces (`posx.png` ... `negz.png`).
    pub skybox_dir: Option<PathBuf>,
}

/// Camera and mouse configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Degrees of rotation per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    /// Camera movement speed in world units per second.
    pub camera_speed: f32,
    /// Invert the vertical mouse axis.
    pub invert_y: bool,
    /// Keep the camera at its starting height while walking.
    pub anchored_to_ground: bool,
    /// Initial camera position.
    pub start_position: [f32; 3],
    /// Initial camera yaw in degrees (-90 looks down -Z).
    pub start_yaw: f32,
    /// Initial camera pitch in degrees.
    pub start_pitch: f32,
}

/// Single point light plus the material coefficients of the illumination models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// World-space point light position.
    pub light_position: [f32; 3],
    /// Ambient color.
    pub ambient_color: [f32; 3],
    /// Specular highlight color.
    pub specular_color: [f32; 3],
    /// Diffuse weight.
    pub kd: f32,
    /// Specular weight.
    pub ks: f32,
    /// Ambient weight.
    pub ka: f32,
    /// Phong / Blinn-Phong shininess exponent.
    pub shininess: f32,
    /// GGX roughness.
    pub alpha: f32,
    /// Fresnel reflectance at normal incidence.
    pub f0: f32,
    /// Ratio of refraction indices (air over glass by default).
    pub eta: f32,
    /// Exponent of Schlick's approximation (5 is physically based).
    pub fresnel_power: f32,
}

/// Scene content and initial toggle state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Start with bodies animated.
    pub spinning: bool,
    /// Start in wireframe mode.
    pub wireframe: bool,
    /// Index of the illumination variant selected at startup.
    pub initial_variant: usize,
    /// Bodies drawn every frame, in draw order.
    pub bodies: Vec<BodyConfig>,
}

/// Constant parameters of one orbiting body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    /// Display name, used in logs and GPU labels.
    pub name: String,
    /// Distance from the orbit center along the reference axis.
    pub orbit_radius: f32,
    /// Orbital angular speed in degrees per second.
    pub orbit_speed: f32,
    /// Spin angular speed in degrees per second.
    pub spin_speed: f32,
    /// Per-axis scale.
    pub scale: [f32; 3],
    /// Initial orbital phase in degrees.
    pub orbit_start: f32,
    /// Initial spin phase in degrees.
    pub spin_start: f32,
    /// Normal of the orbital plane.
    pub orbit_axis: [f32; 3],
    /// Axis the body spins around.
    pub spin_axis: [f32; 3],
    /// Surface color used when no texture is configured or it fails to load.
    pub color: [f32; 3],
    /// Optional surface texture.
    pub texture: Option<PathBuf>,
    /// Number of texture repetitions across the UV range.
    pub uv_repeat: f32,
}

impl BodyConfig {
    /// A body orbiting in the XZ plane with an upright spin axis.
    pub fn new(name: &str, orbit_radius: f32, orbit_speed: f32, spin_speed: f32, size: f32) -> Self {
        Self {
            name: name.to_string(),
            orbit_radius,
            orbit_speed,
            spin_speed,
            scale: [size; 3],
            ..Self::default()
        }
    }

    /// Set the fallback surface color.
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Set the initial orbital phase in degrees.
    pub fn with_orbit_start(mut self, degrees: f32) -> Self {
        self.orbit_start = degrees;
        self
    }

    /// Spin about -Y. Speeds stay positive, so retrograde rotation lives in
    /// the axis.
    pub fn retrograde(mut self) -> Self {
        self.spin_axis = [0.0, -1.0, 0.0];
        self
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: "body".to_string(),
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            spin_speed: 0.0,
            scale: [1.0; 3],
            orbit_start: 0.0,
            spin_start: 0.0,
            orbit_axis: [0.0, 1.0, 0.0],
            spin_axis: [0.0, 1.0, 0.0],
            color: [1.0; 3],
            texture: None,
            uv_repeat: 1.0,
        }
    }
}

/// Diagnostics knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log the frame rate every N frames (0 disables).
    pub fps_log_interval: u32,
}

// Defaults

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            vsync: true,
            resizable: false,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.26, 0.46, 0.98],
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 10_000.0,
            sphere_subdivisions: 4,
            shader_dir: None,
            skybox_dir: None,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.05,
            camera_speed: 5.0,
            invert_y: false,
            anchored_to_ground: true,
            start_position: [0.0, 0.0, 7.0],
            start_yaw: -90.0,
            start_pitch: 0.0,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            light_position: [0.0, 0.0, 10.0],
            ambient_color: [0.1, 0.1, 0.1],
            specular_color: [1.0, 1.0, 1.0],
            kd: 0.8,
            ks: 0.5,
            ka: 0.1,
            shininess: 25.0,
            alpha: 0.2,
            f0: 0.9,
            eta: 1.0 / 1.52,
            fresnel_power: 5.0,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spinning: true,
            wireframe: false,
            initial_variant: 0,
            bodies: default_bodies(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            fps_log_interval: 0,
        }
    }
}

/// A sun at the origin and eight planets on widening orbits.
fn default_bodies() -> Vec<BodyConfig> {
    vec![
        BodyConfig::new("sun", 0.0, 0.0, 30.0, 1.0).with_color([1.0, 0.8, 0.3]),
        BodyConfig::new("mercury", 2.0, 47.0, 10.0, 0.15)
            .with_color([0.6, 0.6, 0.6])
            .with_orbit_start(20.0),
        BodyConfig::new("venus", 3.0, 35.0, 6.0, 0.25)
            .retrograde()
            .with_color([0.9, 0.7, 0.4])
            .with_orbit_start(110.0),
        BodyConfig::new("earth", 4.2, 30.0, 90.0, 0.27)
            .with_color([0.2, 0.4, 0.9])
            .with_orbit_start(200.0),
        BodyConfig::new("mars", 5.4, 24.0, 85.0, 0.2)
            .with_color([0.8, 0.3, 0.2])
            .with_orbit_start(300.0),
        BodyConfig::new("jupiter", 7.5, 13.0, 200.0, 0.6)
            .with_color([0.8, 0.6, 0.4])
            .with_orbit_start(45.0),
        BodyConfig::new("saturn", 9.5, 9.7, 180.0, 0.5)
            .with_color([0.9, 0.8, 0.5])
            .with_orbit_start(160.0),
        BodyConfig::new("uranus", 11.5, 6.8, 120.0, 0.35)
            .retrograde()
            .with_color([0.5, 0.8, 0.9])
            .with_orbit_start(250.0),
        BodyConfig::new("neptune", 13.0, 5.4, 130.0, 0.34)
            .with_color([0.3, 0.4, 0.9])
            .with_orbit_start(330.0),
    ]
}

/// Platform configuration directory for the viewer (`<config>/orrery`).
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// when the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }
        let config = read_config(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes `config.ron` into `config_dir`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_error = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(&path, serialized).map_err(write_error)
    }

    /// Rejects values that would make the scene unrenderable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be non-zero"));
        }
        let render = &self.render;
        if !(render.fov_y_degrees > 0.0 && render.fov_y_degrees < 180.0) {
            return Err(invalid("render.fov_y_degrees", format!("{} is outside (0, 180)", render.fov_y_degrees)));
        }
        if !(render.near > 0.0 && render.far > render.near) {
            return Err(invalid(
                "render.near",
                format!("need 0 < near < far, got near {} far {}", render.near, render.far),
            ));
        }
        if render.sphere_subdivisions > MAX_SPHERE_SUBDIVISIONS {
            return Err(invalid(
                "render.sphere_subdivisions",
                format!("{} exceeds {MAX_SPHERE_SUBDIVISIONS}", render.sphere_subdivisions),
            ));
        }
        for body in &self.scene.bodies {
            if body.scale.iter().any(|s| *s <= 0.0) {
                return Err(invalid("scene.bodies", format!("'{}' has a non-positive scale", body.name)));
            }
            // Phases only ever grow; reverse rotation is a flipped axis.
            if !(body.orbit_speed >= 0.0 && body.spin_speed >= 0.0) {
                return Err(invalid(
                    "scene.bodies",
                    format!("'{}' has a negative orbit or spin speed", body.name),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("width: 1200"));
        assert!(ron_str.contains("name: \"sun\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), render: (), input: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.lighting, LightingConfig::default());
        assert_eq!(config.scene, SceneConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_partial_body_uses_defaults() {
        let ron_str = r#"(scene: (bodies: [(name: "moon", orbit_radius: 1.5)]))"#;
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene.bodies.len(), 1);
        let moon = &config.scene.bodies[0];
        assert_eq!(moon.name, "moon");
        assert_eq!(moon.orbit_radius, 1.5);
        assert_eq!(moon.scale, [1.0; 3]);
        assert_eq!(moon.orbit_axis, [0.0, 1.0, 0.0]);
        assert!(moon.texture.is_none());
    }

    #[test]
    fn test_default_scene_has_central_sun() {
        let scene = SceneConfig::default();
        assert_eq!(scene.bodies.len(), 9);
        assert_eq!(scene.bodies[0].name, "sun");
        assert_eq!(scene.bodies[0].orbit_radius, 0.0);
        assert!(scene.bodies[1..].iter().all(|b| b.orbit_radius > 0.0));
    }

    #[test]
    fn test_default_lighting_matches_glass_ratio() {
        let lighting = LightingConfig::default();
        assert!((lighting.eta - 1.0 / 1.52).abs() < 1e-6);
        assert_eq!(lighting.fresnel_power, 5.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.scene.bodies.truncate(2);
        config.render.skybox_dir = Some(PathBuf::from("textures/cube"));

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_far_plane_before_near_is_rejected() {
        let mut config = Config::default();
        config.render.far = 0.05;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "render.near", .. }));
    }

    #[test]
    fn test_negative_spin_speed_is_rejected() {
        let mut config = Config::default();
        config.scene.bodies[2].spin_speed = -6.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "scene.bodies: 'venus' has a negative orbit or spin speed");
    }

    #[test]
    fn test_default_retrograde_bodies_use_flipped_axis() {
        let scene = SceneConfig::default();
        for name in ["venus", "uranus"] {
            let body = scene.bodies.iter().find(|b| b.name == name).unwrap();
            assert!(body.spin_speed > 0.0);
            assert_eq!(body.spin_axis, [0.0, -1.0, 0.0]);
        }
    }

    #[test]
    fn test_excessive_subdivisions_are_rejected() {
        let mut config = Config::default();
        config.render.sphere_subdivisions = MAX_SPHERE_SUBDIVISIONS;
        assert!(config.validate().is_ok());
        config.render.sphere_subdivisions = 12;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "render.sphere_subdivisions", .. }));
    }

    #[test]
    fn test_zero_scale_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ron_str = r#"(scene: (bodies: [(name: "flat", scale: (1.0, 0.0, 1.0))]))"#;
        std::fs::write(dir.path().join(CONFIG_FILE), ron_str).unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "scene.bodies: 'flat' has a non-positive scale");
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// viewer settings\n(\n  // nothing overridden\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
