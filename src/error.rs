// Error taxonomy for setup and the per-frame loop
//
// Backends hand back raw `vk::Result` codes. The setup driver wraps them
// with the name of the stage that failed so the log line is enough to
// find the broken call.

use ash::vk;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while negotiating or building the pipeline. Setup stops at the
/// first one of these.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("validation layer {0} requested but not available")]
    ValidationLayerUnavailable(String),

    #[error("no Vulkan-capable device found")]
    NoDeviceFound,

    #[error("none of the {candidates} device(s) meets the requirements")]
    NoSuitableDevice { candidates: usize },

    #[error("surface reports no formats or no present modes")]
    SurfaceUnsupported,

    #[error("logical device creation failed: {0}")]
    DeviceCreationFailed(vk::Result),

    #[error("swapchain creation failed: {0}")]
    SwapchainCreationFailed(vk::Result),

    #[error("image view {index} creation failed: {result}")]
    ImageViewCreationFailed { index: usize, result: vk::Result },

    #[error("pipeline creation failed at {stage}: {result}")]
    PipelineCreationFailed {
        stage: &'static str,
        result: vk::Result,
    },

    #[error("failed to load shader {}", path.display())]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed: {result} (code {})", result.as_raw())]
    Api {
        stage: &'static str,
        result: vk::Result,
    },
}

impl SetupError {
    /// Status code reported for this failure.
    pub fn status(&self) -> vk::Result {
        match self {
            Self::ValidationLayerUnavailable(_) => vk::Result::ERROR_LAYER_NOT_PRESENT,
            Self::NoDeviceFound | Self::NoSuitableDevice { .. } => vk::Result::ERROR_DEVICE_LOST,
            Self::SurfaceUnsupported => vk::Result::ERROR_FORMAT_NOT_SUPPORTED,
            Self::ShaderLoad { .. } => vk::Result::ERROR_UNKNOWN,
            Self::DeviceCreationFailed(result)
            | Self::SwapchainCreationFailed(result)
            | Self::ImageViewCreationFailed { result, .. }
            | Self::PipelineCreationFailed { result, .. }
            | Self::Api { result, .. } => *result,
        }
    }

    /// Wrap a raw API failure with the stage it came from.
    pub fn api(stage: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| Self::Api { stage, result }
    }
}

/// Failure inside the render loop. Any of these ends the loop.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame requested before setup completed")]
    NotReady,

    #[error("failed to acquire swapchain image: {0}")]
    Acquire(vk::Result),

    #[error("presentation engine returned unknown image index {0}")]
    UnknownImage(u32),

    #[error("surface is out of date and needs a new swapchain")]
    SurfaceOutOfDate,

    #[error("queue submit failed: {0}")]
    Submit(vk::Result),

    #[error("queue present failed: {0}")]
    Present(vk::Result),
}
