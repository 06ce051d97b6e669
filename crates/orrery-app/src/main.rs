//! Orrery entry point.
//!
//! Parses the command line, loads `config.ron`, initializes logging and opens
//! the window.
//!
//! Run with: `cargo run -p orrery-app -- --variant 2`

use std::process::ExitCode;

use clap::Parser;
use orrery_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(default_config_dir);
    let (mut config, load_error) = match &config_dir {
        Some(dir) => match Config::load_or_create(dir) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        },
        None => (Config::default(), None),
    };
    config.apply_cli_overrides(&args);
    let invalid = config.validate().err();

    orrery_log::init_logging(config_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Some(e) = load_error {
        error!("Failed to load config, using defaults: {e}");
    }
    if let Some(e) = invalid {
        error!("Invalid settings: {e}");
        return ExitCode::FAILURE;
    }
    info!("Orrery");
    info!(
        "Window: {}x{} | Bodies: {} | Spinning: {}",
        config.window.width,
        config.window.height,
        config.scene.bodies.len(),
        config.scene.spinning
    );
    info!("Controls: WASD move, mouse look, 1-9 shader, P pause, L wireframe, Esc quit");

    match orrery_app::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Event loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}
