// Render context - owns every GPU object and drives setup
//
// SETUP STAGES (in order, stopping at the first failure):
// 1. Instance (after checking requested layers)
// 2. Surface
// 3. Probe and select a physical device
// 4. Logical device + queues
// 5. Swapchain + image views
// 6. Render pass, graphics pipeline, framebuffers
// 7. Command pool + pre-recorded command buffers
// 8. Semaphores
//
// Each handle is stored the moment it exists, so whatever a failed setup
// managed to create is still reachable from `teardown`.

use super::device::{self, DeviceRequirements, DeviceSelection, LogicalDevice};
use super::frame::{self, CommandResources, FrameTargets};
use super::instance::{self, InstanceRequest};
use super::pipeline::{self, PipelineResources};
use super::probe;
use super::shader::ShaderLoader;
use super::swapchain::{self, SwapchainResources, SwapchainTarget};
use super::sync::FrameSync;
use super::GraphicsBackend;
use crate::error::{FrameError, SetupError};
use ash::vk;

/// Everything setup needs from the application
#[derive(Debug, Clone)]
pub struct SetupParams {
    pub instance: InstanceRequest,
    pub requirements: DeviceRequirements,
    /// Drawable size in pixels, used when the surface leaves the extent open
    pub window_extent: vk::Extent2D,
    pub preferred_present_mode: vk::PresentModeKHR,
    pub clear_color: [f32; 4],
}

/// Constructed empty, populated stage by stage, emptied by teardown.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub instance: Option<vk::Instance>,
    pub surface: Option<vk::SurfaceKHR>,
    pub selection: Option<DeviceSelection>,
    pub device: Option<LogicalDevice>,
    pub swapchain: Option<SwapchainResources>,
    pub pipeline: PipelineResources,
    pub commands: CommandResources,
    pub sync: Option<FrameSync>,
}

fn run_stage<T>(
    name: &'static str,
    stage: impl FnOnce() -> Result<T, SetupError>,
) -> Result<T, SetupError> {
    log::info!("[{}] starting", name);
    match stage() {
        Ok(value) => {
            log::info!("[{}] ok", name);
            Ok(value)
        }
        Err(e) => {
            log::error!("[{}] failed: {} (status {})", name, e, e.status().as_raw());
            Err(e)
        }
    }
}

/// A slot that should have been filled by an earlier stage
fn missing(stage: &'static str) -> SetupError {
    SetupError::api(stage)(vk::Result::ERROR_INITIALIZATION_FAILED)
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing is held and teardown has nothing to do
    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
            && self.surface.is_none()
            && self.selection.is_none()
            && self.device.is_none()
            && self.swapchain.is_none()
            && self.pipeline.render_pass.is_none()
            && self.pipeline.layout.is_none()
            && self.pipeline.pipeline.is_none()
            && self.pipeline.framebuffers.is_empty()
            && self.commands.pool.is_none()
            && self.commands.buffers.is_empty()
            && self.sync.is_none()
    }

    pub fn is_ready(&self) -> bool {
        self.sync.is_some() && !self.commands.buffers.is_empty()
    }

    /// Run every setup stage. On error the context keeps what was created;
    /// call `teardown` to release it.
    pub fn initialize<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        params: &SetupParams,
        shaders: &dyn ShaderLoader,
    ) -> Result<(), SetupError> {
        run_stage("instance", || self.create_instance(backend, &params.instance))?;
        run_stage("surface", || self.create_surface(backend))?;
        run_stage("device selection", || self.select_device(backend, &params.requirements))?;
        run_stage("logical device", || self.create_device(backend, &params.requirements))?;
        run_stage("swapchain", || self.create_swapchain(backend, params))?;
        run_stage("pipeline", || self.create_pipeline(backend, shaders))?;
        run_stage("command buffers", || self.create_commands(backend, params.clear_color))?;
        run_stage("sync", || self.create_sync(backend))?;

        log::info!("Setup complete");
        Ok(())
    }

    fn create_instance<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        request: &InstanceRequest,
    ) -> Result<(), SetupError> {
        instance::check_layer_support(&*backend, request)?;
        let handle = backend
            .create_instance(request)
            .map_err(SetupError::api("create_instance"))?;
        self.instance = Some(handle);
        Ok(())
    }

    fn create_surface<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) -> Result<(), SetupError> {
        let surface = backend
            .create_surface()
            .map_err(SetupError::api("create_surface"))?;
        self.surface = Some(surface);
        Ok(())
    }

    fn select_device<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        requirements: &DeviceRequirements,
    ) -> Result<(), SetupError> {
        let candidates =
            probe::probe_all(&*backend).map_err(SetupError::api("enumerate_physical_devices"))?;
        log::info!("Found {} device(s)", candidates.len());

        let selection = device::select_device(candidates, requirements)?;
        log::info!("Selected device: {}", selection.name);
        self.selection = Some(selection);
        Ok(())
    }

    fn create_device<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        requirements: &DeviceRequirements,
    ) -> Result<(), SetupError> {
        let selection = self.selection.as_ref().ok_or_else(|| missing("create_device"))?;
        let device = device::create_logical_device(backend, selection, requirements)?;
        log::info!(
            "Queues: graphics family {}, present family {}",
            device.queues.graphics,
            device.queues.present
        );
        self.device = Some(device);
        Ok(())
    }

    fn create_swapchain<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        params: &SetupParams,
    ) -> Result<(), SetupError> {
        let (Some(selection), Some(surface)) = (self.selection.as_ref(), self.surface) else {
            return Err(missing("create_swapchain"));
        };
        let target = SwapchainTarget {
            physical_device: selection.physical_device,
            surface,
            queues: selection.queues,
            window_extent: params.window_extent,
            preferred_present_mode: params.preferred_present_mode,
        };
        swapchain::create_swapchain(backend, &target, &mut self.swapchain)
    }

    fn create_pipeline<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        shaders: &dyn ShaderLoader,
    ) -> Result<(), SetupError> {
        let swapchain = self.swapchain.as_ref().ok_or_else(|| missing("create_pipeline"))?;
        let format = swapchain.config.format;
        let extent = swapchain.config.extent;

        let render_pass = pipeline::create_render_pass(backend, format)?;
        self.pipeline.render_pass = Some(render_pass);

        let graphics = pipeline::create_graphics_pipeline(backend, shaders, render_pass, extent)?;
        self.pipeline.layout = Some(graphics.layout);
        self.pipeline.pipeline = Some(graphics.pipeline);

        pipeline::create_framebuffers(
            backend,
            render_pass,
            &swapchain.image_views,
            extent,
            &mut self.pipeline.framebuffers,
        )
    }

    fn create_commands<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        clear_color: [f32; 4],
    ) -> Result<(), SetupError> {
        let (Some(device), Some(swapchain)) = (self.device.as_ref(), self.swapchain.as_ref()) else {
            return Err(missing("create_command_pool"));
        };

        let pool = backend
            .create_command_pool(device.queues.graphics)
            .map_err(SetupError::api("create_command_pool"))?;
        self.commands.pool = Some(pool);

        self.commands.buffers =
            frame::record_command_buffers(backend, pool, swapchain, &self.pipeline, clear_color)?;
        Ok(())
    }

    fn create_sync<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) -> Result<(), SetupError> {
        self.sync = Some(FrameSync::new(backend)?);
        Ok(())
    }

    /// Handles the frame loop works with
    pub fn frame_targets(&self) -> Result<FrameTargets<'_>, FrameError> {
        let (Some(device), Some(swapchain), Some(sync)) = (&self.device, &self.swapchain, &self.sync) else {
            return Err(FrameError::NotReady);
        };
        if self.commands.buffers.is_empty() {
            return Err(FrameError::NotReady);
        }

        Ok(FrameTargets {
            swapchain: swapchain.handle,
            graphics_queue: device.graphics_queue,
            present_queue: device.present_queue,
            image_available: sync.image_available,
            render_finished: sync.render_finished,
            command_buffers: &self.commands.buffers,
        })
    }
}
