// Swapchain - negotiation with the surface and creation
//
// The choosers are pure so the policy can be checked without a driver.
// `create_swapchain` then builds the swapchain and one view per image.

use super::device::SelectedQueues;
use super::probe::{DeviceProbing, SwapchainSupport};
use crate::error::SetupError;
use ash::prelude::VkResult;
use ash::vk;

/// `currentExtent` value meaning "the window decides"
pub const UNDEFINED_EXTENT: u32 = u32::MAX;

const PREFERRED_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_SRGB,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

/// BGRA8 sRGB if offered, otherwise whatever the surface lists first.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| f.format == PREFERRED_FORMAT.format && f.color_space == PREFERRED_FORMAT.color_space)
        .or_else(|| formats.first())
        .copied()
}

/// The preferred mode if the surface supports it, otherwise the first
/// reported mode. Never returns a mode the surface did not list.
pub fn choose_present_mode(
    modes: &[vk::PresentModeKHR],
    preferred: vk::PresentModeKHR,
) -> Option<vk::PresentModeKHR> {
    modes
        .iter()
        .copied()
        .find(|&mode| mode == preferred)
        .or_else(|| modes.first().copied())
}

pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window: vk::Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != UNDEFINED_EXTENT {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: window.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One more than the minimum, capped by the maximum (0 = no maximum).
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        capabilities.max_image_count
    } else {
        count
    }
}

/// Fixed for the life of one swapchain
#[derive(Debug, Clone, Copy)]
pub struct SwapchainConfig {
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub transform: vk::SurfaceTransformFlagsKHR,
}

impl SwapchainConfig {
    /// Consumes the support lists; they are not needed past this point.
    pub fn negotiate(
        support: SwapchainSupport,
        window: vk::Extent2D,
        preferred_present_mode: vk::PresentModeKHR,
    ) -> Result<Self, SetupError> {
        let surface_format =
            choose_surface_format(&support.formats).ok_or(SetupError::SurfaceUnsupported)?;
        let present_mode = choose_present_mode(&support.present_modes, preferred_present_mode)
            .ok_or(SetupError::SurfaceUnsupported)?;

        let capabilities = &support.capabilities;
        Ok(Self {
            format: surface_format.format,
            color_space: surface_format.color_space,
            present_mode,
            extent: choose_extent(capabilities, window),
            image_count: choose_image_count(capabilities),
            transform: capabilities.current_transform,
        })
    }
}

/// How swapchain images are shared between queue families
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSharing {
    Exclusive,
    Concurrent(Vec<u32>),
}

impl ImageSharing {
    pub fn for_queues(queues: &SelectedQueues) -> Self {
        if queues.is_shared() {
            Self::Exclusive
        } else {
            Self::Concurrent(queues.unique_families())
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwapchainRequest {
    pub surface: vk::SurfaceKHR,
    pub config: SwapchainConfig,
    pub sharing: ImageSharing,
}

pub trait SwapchainNegotiation {
    fn create_swapchain(&mut self, request: &SwapchainRequest) -> VkResult<vk::SwapchainKHR>;

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;

    /// 2D color view with identity swizzle
    fn create_image_view(&mut self, image: vk::Image, format: vk::Format) -> VkResult<vk::ImageView>;
}

/// The swapchain, its images and their views
#[derive(Debug, Clone)]
pub struct SwapchainResources {
    pub handle: vk::SwapchainKHR,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
    pub config: SwapchainConfig,
}

/// Inputs to swapchain creation that come from earlier stages
#[derive(Debug, Clone, Copy)]
pub struct SwapchainTarget {
    pub physical_device: vk::PhysicalDevice,
    pub surface: vk::SurfaceKHR,
    pub queues: SelectedQueues,
    pub window_extent: vk::Extent2D,
    pub preferred_present_mode: vk::PresentModeKHR,
}

/// Negotiate and create the swapchain, then one view per image.
///
/// `slot` is filled as soon as the swapchain exists and views are pushed as
/// they are made, so a failure halfway leaves everything created so far
/// where teardown can find it.
pub fn create_swapchain<B>(
    backend: &mut B,
    target: &SwapchainTarget,
    slot: &mut Option<SwapchainResources>,
) -> Result<(), SetupError>
where
    B: DeviceProbing + SwapchainNegotiation + ?Sized,
{
    let support = backend
        .swapchain_support(target.physical_device)
        .map_err(SetupError::api("query_swapchain_support"))?;
    let config = SwapchainConfig::negotiate(support, target.window_extent, target.preferred_present_mode)?;

    log::info!("Surface format: {:?} / {:?}", config.format, config.color_space);
    log::info!("Present mode: {:?}", config.present_mode);
    log::info!(
        "Extent: {}x{}, requesting {} image(s)",
        config.extent.width,
        config.extent.height,
        config.image_count
    );

    let request = SwapchainRequest {
        surface: target.surface,
        config,
        sharing: ImageSharing::for_queues(&target.queues),
    };
    let handle = backend
        .create_swapchain(&request)
        .map_err(SetupError::SwapchainCreationFailed)?;

    let resources = slot.insert(SwapchainResources {
        handle,
        images: Vec::new(),
        image_views: Vec::new(),
        config,
    });

    // The driver may hand back a different number than requested
    resources.images = backend
        .swapchain_images(handle)
        .map_err(SetupError::SwapchainCreationFailed)?;
    log::info!("Swapchain has {} image(s)", resources.images.len());

    for (index, &image) in resources.images.iter().enumerate() {
        let view = backend
            .create_image_view(image, config.format)
            .map_err(|result| SetupError::ImageViewCreationFailed { index, result })?;
        resources.image_views.push(view);
    }

    Ok(())
}
