// Capability probing - read-only queries against the driver
//
// Nothing here creates objects. Every list returned is owned by the caller
// and dropped once the decision that needs it has been made.

use ash::prelude::VkResult;
use ash::vk;

/// One queue family as reported by the device, plus whether it can present
/// to the target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub flags: vk::QueueFlags,
    pub queue_count: u32,
    pub supports_present: bool,
}

impl QueueFamily {
    pub fn supports_graphics(&self) -> bool {
        self.flags.contains(vk::QueueFlags::GRAPHICS)
    }
}

/// Cached subset of `vk::PhysicalDeviceProperties`
#[derive(Debug, Clone, Default)]
pub struct DeviceProperties {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub vendor_id: u32,
    pub device_id: u32,
    pub driver_version: u32,
    pub api_version: u32,
}

impl DeviceProperties {
    pub fn is_discrete(&self) -> bool {
        self.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
    }
}

/// What a surface allows on a given device.
///
/// A device can only drive a swapchain when both lists are non-empty.
#[derive(Debug, Clone, Default)]
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Snapshot of everything the selector needs to judge one device.
/// Discarded once a device has been picked.
#[derive(Debug, Clone)]
pub struct PhysicalDeviceCandidate {
    pub handle: vk::PhysicalDevice,
    pub properties: DeviceProperties,
    pub features: vk::PhysicalDeviceFeatures,
    pub queue_families: Vec<QueueFamily>,
    pub extensions: Vec<String>,
    pub swapchain_support: SwapchainSupport,
}

/// Raw platform/GPU queries
pub trait DeviceProbing {
    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>>;

    fn device_properties(&self, device: vk::PhysicalDevice) -> DeviceProperties;

    fn device_features(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures;

    /// Families in index order, with present support checked against the
    /// backend's surface.
    fn queue_families(&self, device: vk::PhysicalDevice) -> VkResult<Vec<QueueFamily>>;

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>>;

    fn swapchain_support(&self, device: vk::PhysicalDevice) -> VkResult<SwapchainSupport>;
}

/// Gather everything known about one device into a candidate.
///
/// A query that fails leaves its part of the snapshot empty, which makes
/// the device unsuitable without stopping the scan of the others.
pub fn probe_candidate<P: DeviceProbing + ?Sized>(
    prober: &P,
    device: vk::PhysicalDevice,
) -> PhysicalDeviceCandidate {
    let properties = prober.device_properties(device);
    let queue_families = or_empty(&properties.name, "queue families", prober.queue_families(device));
    let extensions = or_empty(&properties.name, "device extensions", prober.device_extensions(device));
    let swapchain_support = or_empty(&properties.name, "swapchain support", prober.swapchain_support(device));

    PhysicalDeviceCandidate {
        handle: device,
        features: prober.device_features(device),
        properties,
        queue_families,
        extensions,
        swapchain_support,
    }
}

fn or_empty<T: Default>(device: &str, query: &str, result: VkResult<T>) -> T {
    result.unwrap_or_else(|e| {
        log::warn!("Querying {} of {} failed: {}", query, device, e);
        T::default()
    })
}

/// Probe every enumerated device, in enumeration order. Only enumeration
/// itself can fail.
pub fn probe_all<P: DeviceProbing + ?Sized>(prober: &P) -> VkResult<Vec<PhysicalDeviceCandidate>> {
    Ok(prober
        .enumerate_physical_devices()?
        .into_iter()
        .map(|device| probe_candidate(prober, device))
        .collect())
}
