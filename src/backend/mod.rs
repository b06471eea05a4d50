// Backend module - Vulkan setup, frame loop and teardown
//
// Design: the setup logic talks to the GPU only through the narrow traits
// below. `VulkanBackend` implements them with ash; tests use an in-memory
// backend instead.

pub mod context;
pub mod device;
pub mod frame;
pub mod instance;
pub mod pipeline;
pub mod probe;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod teardown;
pub mod vulkan;

#[cfg(test)]
pub(crate) mod mock;

pub use context::{RenderContext, SetupParams};
pub use device::DeviceRequirements;
pub use frame::FrameExecutor;
pub use instance::InstanceRequest;
pub use shader::FileShaderLoader;
pub use vulkan::VulkanBackend;

use device::DeviceFactory;
use frame::FrameExecution;
use instance::InstanceFactory;
use pipeline::PipelineBuilding;
use probe::DeviceProbing;
use swapchain::SwapchainNegotiation;
use teardown::ResourceRelease;

/// Everything setup, the frame loop and teardown need from a backend
pub trait GraphicsBackend:
    InstanceFactory
    + DeviceProbing
    + DeviceFactory
    + SwapchainNegotiation
    + PipelineBuilding
    + FrameExecution
    + ResourceRelease
{
}

impl<T> GraphicsBackend for T where
    T: InstanceFactory
        + DeviceProbing
        + DeviceFactory
        + SwapchainNegotiation
        + PipelineBuilding
        + FrameExecution
        + ResourceRelease
        + ?Sized
{
}
