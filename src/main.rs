// =============================================================================
// HELLO TRIANGLE - Vulkan setup, frame loop and teardown
// =============================================================================
//
// ARCHITECTURE OVERVIEW:
// ┌─────────────────────────────────────────────────────────────────┐
// │  winit event loop (window, close requests, redraws)             │
// │    └── RenderContext (every GPU handle, populated by setup)     │
// │          └── VulkanBackend (ash calls behind narrow traits)     │
// │                └── FrameExecutor (acquire -> submit -> present) │
// └─────────────────────────────────────────────────────────────────┘
//
// FRAME FLOW:
// 1. Acquire swapchain image (signals image_available)
// 2. Submit the pre-recorded command buffer for that image
// 3. Present the image once render_finished is signalled
//
// =============================================================================

mod backend;
mod config;
mod error;

use anyhow::{Context, Result};
use ash::vk;
use backend::{FileShaderLoader, FrameExecutor, RenderContext, VulkanBackend};
use config::Config;
use error::FrameError;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let (config, outcome) = Config::load();

    // Load messages wait for the logger the config configures
    init_logging(&config);
    outcome.log();
    log::debug!("Config: {:?}", config);
    log::info!("Starting {}", config.debug.application_name);
    log::info!("Window: {}x{}", config.window.width, config.window.height);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.exit_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Config sets the level; RUST_LOG overrides it
fn init_logging(config: &Config) {
    env_logger::Builder::new()
        .filter_level(config.log_filter())
        .parse_default_env()
        .init();
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// IMPORTANT: the window has to outlive the surface, so `shutdown` runs
/// teardown before the window is dropped.
struct App {
    config: Config,
    window: Option<Window>,
    backend: Option<VulkanBackend>,
    context: RenderContext,
    executor: FrameExecutor,
    /// Why the loop stopped, if it was not a normal close
    exit_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            window: None,
            backend: None,
            context: RenderContext::new(),
            executor: FrameExecutor::new(),
            exit_error: None,
        }
    }

    fn init_vulkan(&mut self, window: &Window) -> Result<()> {
        let mut backend = VulkanBackend::new(window)?;

        let size = window.inner_size();
        let params = self.config.setup_params(vk::Extent2D {
            width: size.width,
            height: size.height,
        });
        let shaders = FileShaderLoader::new(&self.config.shaders.vertex, &self.config.shaders.fragment);

        let result = self.context.initialize(&mut backend, &params, &shaders);
        // Kept even on failure so shutdown can release what was created
        self.backend = Some(backend);
        result.context("Vulkan setup failed")
    }

    fn draw_frame(&mut self) -> Result<(), FrameError> {
        let backend = self.backend.as_mut().ok_or(FrameError::NotReady)?;
        let targets = self.context.frame_targets()?;
        self.executor.draw_frame(backend, &targets)?;
        Ok(())
    }

    fn shutdown(&mut self) {
        let Some(mut backend) = self.backend.take() else {
            return;
        };
        self.context.teardown(&mut backend);
        log::info!("Presented {} frame(s)", self.executor.frames_presented());
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.exit_error = Some(error);
        self.shutdown();
        event_loop.exit();
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // The swapchain is never recreated, so the size stays fixed
        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => w,
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to create window"));
                return;
            }
        };

        let result = self.init_vulkan(&window);
        self.window = Some(window);
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                self.shutdown();
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                use winit::keyboard::{KeyCode, PhysicalKey};

                if event.state.is_pressed() && event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    log::info!("ESC pressed, exiting...");
                    self.shutdown();
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                if !self.context.is_ready() {
                    return;
                }
                if let Err(e) = self.draw_frame() {
                    self.fail(event_loop, anyhow::Error::new(e).context("Render loop stopped"));
                }
            }

            _ => {}
        }
    }

    /// Keep drawing as fast as presentation allows
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
