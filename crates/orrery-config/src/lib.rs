//! Configuration system for the orrery viewer.
//!
//! Settings persist to disk as a RON file, tolerate missing and unknown
//! fields, and can be overridden from the command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BodyConfig, Config, DebugConfig, InputConfig, LightingConfig, RenderConfig, SceneConfig,
    WindowConfig, MAX_SPHERE_SUBDIVISIONS, default_config_dir,
};
pub use error::ConfigError;
