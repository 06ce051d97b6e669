//! Window creation and event handling via winit.
//!
//! [`OrreryApp`] implements winit's [`ApplicationHandler`]: it creates the
//! window and GPU resources on `resumed`, routes key and cursor events into
//! the [`SceneState`], and draws one frame per `RedrawRequested`.

use std::ops::ControlFlow;
use std::sync::Arc;

use orrery_config::Config;
use orrery_input::{KeyboardState, SceneCommand, command_for_key};
use orrery_render::shader::ILLUMINATION_SHADER;
use orrery_render::{
    RenderContext, RenderContextError, ShaderError, ShaderLibrary, ShaderStage, ShaderVariantSet,
    SurfaceError, VariantError, init_render_context_blocking,
};
use orrery_scene::{FrameClock, SceneState};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::error::{EventLoopError, OsError};
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::renderer::SceneRenderer;

/// Anything that prevents the first frame from being drawn.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create window: {0}")]
    Window(#[from] OsError),

    #[error(transparent)]
    RenderContext(#[from] RenderContextError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Variant(#[from] VariantError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_resizable(config.window.resizable)
}

/// Applies one key command to the scene and the variant registry.
///
/// Returns [`ControlFlow::Break`] when the application should exit.
pub fn apply_command(
    scene: &mut SceneState,
    variants: &mut ShaderVariantSet,
    command: SceneCommand,
    wireframe_supported: bool,
) -> ControlFlow<()> {
    match command {
        SceneCommand::SelectVariant(index) => match variants.select_by_index(index) {
            Ok(()) => info!("Current shader [{}]: {}", variants.active_index() + 1, variants.active_name()),
            Err(e) => debug!("Ignoring variant selection: {e}"),
        },
        SceneCommand::ToggleSpinning => {
            scene.toggle_spinning();
        }
        SceneCommand::ToggleWireframe => {
            if wireframe_supported {
                scene.toggle_wireframe();
            } else {
                warn!("Wireframe rendering is not supported by this adapter");
            }
        }
        SceneCommand::Exit => {
            info!("Escape pressed, shutting down");
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

/// Window-bound state, created once the event loop is resumed.
struct Graphics {
    window: Arc<Window>,
    gpu: RenderContext,
    variants: ShaderVariantSet,
    renderer: SceneRenderer,
}

pub struct OrreryApp {
    config: Config,
    scene: SceneState,
    keyboard: KeyboardState,
    clock: FrameClock,
    graphics: Option<Graphics>,
}

impl OrreryApp {
    pub fn new(config: Config) -> Self {
        let scene = SceneState::from_config(&config, config.window.width, config.window.height);
        Self {
            config,
            scene,
            keyboard: KeyboardState::new(),
            clock: FrameClock::new(),
            graphics: None,
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<Graphics, StartupError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        self.scene.camera.cursor_mut().set_captured(&window, true);

        let gpu = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        let (width, height) = gpu.size();
        self.scene.projection.set_aspect_ratio(width, height);

        let mut library = ShaderLibrary::new();
        if let Some(dir) = &self.config.render.shader_dir {
            info!("Loading shader overrides from {}", dir.display());
            library = library.with_shader_dir(dir.clone());
        }
        let program = library.program(ILLUMINATION_SHADER)?;
        let mut variants = ShaderVariantSet::discover(&program, ShaderStage::Fragment)?;
        if let Err(e) = variants.select_by_index(self.config.scene.initial_variant) {
            warn!("Initial variant unavailable ({e}), using the first");
        }
        info!("Current shader [{}]: {}", variants.active_index() + 1, variants.active_name());

        if self.scene.wireframe && !gpu.supports_wireframe {
            warn!("Wireframe requested but not supported, drawing filled");
            self.scene.wireframe = false;
        }

        let renderer = SceneRenderer::new(&gpu, &mut library, &variants, &self.config)?;
        self.clock = FrameClock::new();

        Ok(Graphics {
            window,
            gpu,
            variants,
            renderer,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        self.scene.advance(dt);
        self.scene.apply_movement(&self.keyboard, dt);

        let Some(graphics) = &mut self.graphics else {
            return;
        };
        let handle = graphics.variants.resolve_active_binding();
        match graphics.renderer.render(&graphics.gpu, &self.scene, handle) {
            Ok(()) => {}
            Err(SurfaceError::Timeout) => debug!("Surface timeout, skipping frame"),
            Err(SurfaceError::Lost) => {
                let (width, height) = graphics.gpu.size();
                graphics.gpu.resize(width, height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, shutting down");
                event_loop.exit();
                return;
            }
        }

        if let Some(fps) = self.clock.fps_report(self.config.debug.fps_log_interval) {
            info!("FPS: {fps:.1} ({} frames)", self.clock.frame_count());
        }
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match self.initialize(event_loop) {
            Ok(graphics) => {
                graphics.window.request_redraw();
                self.graphics = Some(graphics);
            }
            Err(e) => {
                error!("Startup failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.scene.projection.set_aspect_ratio(size.width, size.height);
                if let Some(graphics) = &mut self.graphics {
                    graphics.gpu.resize(size.width, size.height);
                    let (width, height) = graphics.gpu.size();
                    graphics.renderer.resize(&graphics.gpu.device, width, height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !self.keyboard.process_event(&event) {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(command) = command_for_key(code) else {
                    return;
                };
                let Some(graphics) = &mut self.graphics else {
                    return;
                };
                let supported = graphics.renderer.supports_wireframe();
                if apply_command(&mut self.scene, &mut graphics.variants, command, supported).is_break() {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.scene.camera.process_cursor_position(position.x, position.y);
            }
            WindowEvent::Focused(focused) => {
                if focused {
                    if let Some(graphics) = &self.graphics {
                        self.scene.camera.cursor_mut().set_captured(&graphics.window, true);
                    }
                } else {
                    self.keyboard.release_all();
                    self.scene.camera.cursor_mut().recalibrate();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.scene.camera.process_raw_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }
}

/// Creates an event loop and runs the orrery with the given config.
///
/// Blocks until the window is closed.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = OrreryApp::new(config);
    event_loop.run_app(&mut app)
}
