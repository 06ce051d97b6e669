//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated solar system with swappable illumination models")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start with the animation running (true) or frozen (false).
    #[arg(long)]
    pub spinning: Option<bool>,

    /// Start in wireframe mode.
    #[arg(long)]
    pub wireframe: Option<bool>,

    /// Index of the illumination variant selected at startup.
    #[arg(long)]
    pub variant: Option<usize>,

    /// Directory holding the six skybox face images.
    #[arg(long)]
    pub skybox: Option<PathBuf>,

    /// Directory to load WGSL shaders from.
    #[arg(long)]
    pub shader_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding `config.ron` instead of the per-user default.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Overwrites settings with every flag that was given on the command line.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(spinning) = args.spinning {
            self.scene.spinning = spinning;
        }
        if let Some(wireframe) = args.wireframe {
            self.scene.wireframe = wireframe;
        }
        if let Some(variant) = args.variant {
            self.scene.initial_variant = variant;
        }
        if let Some(ref dir) = args.skybox {
            self.render.skybox_dir = Some(dir.clone());
        }
        if let Some(ref dir) = args.shader_dir {
            self.render.shader_dir = Some(dir.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
