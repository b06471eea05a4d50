// Frame execution
//
// FRAME FLOW:
// 1. Acquire the next swapchain image (signals image_available)
// 2. Submit that image's pre-recorded command buffer
//    (waits image_available at COLOR_ATTACHMENT_OUTPUT, signals render_finished)
// 3. Present the image (waits render_finished)
//
// Command buffers are recorded once, ahead of the loop.

use super::pipeline::PipelineResources;
use super::swapchain::SwapchainResources;
use crate::error::{FrameError, SetupError};
use ash::prelude::VkResult;
use ash::vk;

/// Acquisition blocks until an image is available
pub const ACQUIRE_TIMEOUT: u64 = u64::MAX;

/// Contents of one pre-recorded command buffer:
/// begin render pass -> bind pipeline -> draw -> end render pass
#[derive(Debug, Clone, Copy)]
pub struct DrawPass {
    pub render_pass: vk::RenderPass,
    pub framebuffer: vk::Framebuffer,
    pub extent: vk::Extent2D,
    pub pipeline: vk::Pipeline,
    pub clear_color: [f32; 4],
    pub vertex_count: u32,
    pub instance_count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Submission {
    pub command_buffer: vk::CommandBuffer,
    pub wait_semaphore: vk::Semaphore,
    pub wait_stage: vk::PipelineStageFlags,
    pub signal_semaphore: vk::Semaphore,
}

#[derive(Debug, Clone, Copy)]
pub struct Presentation {
    pub swapchain: vk::SwapchainKHR,
    pub image_index: u32,
    pub wait_semaphore: vk::Semaphore,
}

pub trait FrameExecution {
    fn create_command_pool(&mut self, queue_family: u32) -> VkResult<vk::CommandPool>;

    fn allocate_command_buffers(
        &mut self,
        pool: vk::CommandPool,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>>;

    fn record_draw(&mut self, command_buffer: vk::CommandBuffer, pass: &DrawPass) -> VkResult<()>;

    fn create_semaphore(&mut self) -> VkResult<vk::Semaphore>;

    /// Returns the image index and whether the swapchain is suboptimal
    fn acquire_next_image(
        &mut self,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)>;

    fn submit(&mut self, queue: vk::Queue, submission: &Submission) -> VkResult<()>;

    /// Returns whether the swapchain is suboptimal
    fn present(&mut self, queue: vk::Queue, presentation: &Presentation) -> VkResult<bool>;
}

/// Command pool on the graphics family and one buffer per swapchain image
#[derive(Debug, Clone, Default)]
pub struct CommandResources {
    pub pool: Option<vk::CommandPool>,
    /// Indexed by swapchain image
    pub buffers: Vec<vk::CommandBuffer>,
}

/// Allocate and record one command buffer per framebuffer.
pub fn record_command_buffers<B: FrameExecution + ?Sized>(
    backend: &mut B,
    pool: vk::CommandPool,
    swapchain: &SwapchainResources,
    pipeline: &PipelineResources,
    clear_color: [f32; 4],
) -> Result<Vec<vk::CommandBuffer>, SetupError> {
    let (Some(render_pass), Some(graphics_pipeline)) = (pipeline.render_pass, pipeline.pipeline) else {
        return Err(SetupError::api("record_command_buffers")(vk::Result::ERROR_INITIALIZATION_FAILED));
    };

    let count = pipeline.framebuffers.len() as u32;
    let buffers = backend
        .allocate_command_buffers(pool, count)
        .map_err(SetupError::api("allocate_command_buffers"))?;

    for (&command_buffer, &framebuffer) in buffers.iter().zip(&pipeline.framebuffers) {
        let pass = DrawPass {
            render_pass,
            framebuffer,
            extent: swapchain.config.extent,
            pipeline: graphics_pipeline,
            clear_color,
            vertex_count: 3,
            instance_count: 1,
        };
        backend
            .record_draw(command_buffer, &pass)
            .map_err(SetupError::api("record_command_buffer"))?;
    }

    log::info!("Recorded {} command buffer(s)", buffers.len());
    Ok(buffers)
}

/// Where the executor is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Acquiring,
    Submitted,
    Presenting,
}

/// Handles one frame needs
#[derive(Debug, Clone, Copy)]
pub struct FrameTargets<'a> {
    pub swapchain: vk::SwapchainKHR,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub image_available: vk::Semaphore,
    pub render_finished: vk::Semaphore,
    pub command_buffers: &'a [vk::CommandBuffer],
}

#[derive(Debug)]
pub struct FrameExecutor {
    state: FrameState,
    frames_presented: u64,
    wait_stage: vk::PipelineStageFlags,
}

impl Default for FrameExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameExecutor {
    pub fn new() -> Self {
        Self {
            state: FrameState::Idle,
            frames_presented: 0,
            wait_stage: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Acquire, submit and present one frame. Returns the presented image
    /// index. Any error means the loop should stop.
    pub fn draw_frame<B: FrameExecution + ?Sized>(
        &mut self,
        backend: &mut B,
        targets: &FrameTargets<'_>,
    ) -> Result<u32, FrameError> {
        let result = self.run_frame(backend, targets);
        match &result {
            Ok(_) => self.frames_presented += 1,
            Err(e) => log::error!("Frame {} failed while {:?}: {}", self.frames_presented, self.state, e),
        }
        self.state = FrameState::Idle;
        result
    }

    fn run_frame<B: FrameExecution + ?Sized>(
        &mut self,
        backend: &mut B,
        targets: &FrameTargets<'_>,
    ) -> Result<u32, FrameError> {
        // STEP 1: Acquire
        self.state = FrameState::Acquiring;
        let (image_index, suboptimal) = backend
            .acquire_next_image(targets.swapchain, ACQUIRE_TIMEOUT, targets.image_available)
            .map_err(|e| match e {
                vk::Result::ERROR_OUT_OF_DATE_KHR => FrameError::SurfaceOutOfDate,
                other => FrameError::Acquire(other),
            })?;
        if suboptimal {
            log::debug!("Swapchain is suboptimal for the surface");
        }

        let command_buffer = *targets
            .command_buffers
            .get(image_index as usize)
            .ok_or(FrameError::UnknownImage(image_index))?;

        // STEP 2: Submit
        let submission = Submission {
            command_buffer,
            wait_semaphore: targets.image_available,
            wait_stage: self.wait_stage,
            signal_semaphore: targets.render_finished,
        };
        backend
            .submit(targets.graphics_queue, &submission)
            .map_err(FrameError::Submit)?;
        self.state = FrameState::Submitted;

        // STEP 3: Present
        let presentation = Presentation {
            swapchain: targets.swapchain,
            image_index,
            wait_semaphore: targets.render_finished,
        };
        self.state = FrameState::Presenting;
        let suboptimal = backend
            .present(targets.present_queue, &presentation)
            .map_err(|e| match e {
                vk::Result::ERROR_OUT_OF_DATE_KHR => FrameError::SurfaceOutOfDate,
                other => FrameError::Present(other),
            })?;
        if suboptimal {
            log::debug!("Presented to a suboptimal swapchain");
        }

        Ok(image_index)
    }
}
