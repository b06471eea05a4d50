// Device selection and logical device creation
//
// Responsibilities:
// - Queue family discovery (graphics + present)
// - Suitability check against the required features and extensions
// - Physical device selection (first suitable device wins)
// - Logical device + queue creation

use super::probe::{PhysicalDeviceCandidate, QueueFamily};
use crate::error::SetupError;
use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CStr;

/// Every queue is requested at this priority
const QUEUE_PRIORITY: f32 = 1.0;

/// What a device must offer to be picked
#[derive(Debug, Clone)]
pub struct DeviceRequirements {
    pub discrete_only: bool,
    pub geometry_shader: bool,
    pub extensions: Vec<&'static CStr>,
}

impl Default for DeviceRequirements {
    fn default() -> Self {
        Self {
            discrete_only: true,
            geometry_shader: true,
            extensions: vec![ash::extensions::khr::Swapchain::name()],
        }
    }
}

impl DeviceRequirements {
    /// Device features to enable: everything off except what selection
    /// insisted on.
    pub fn enabled_features(&self) -> vk::PhysicalDeviceFeatures {
        vk::PhysicalDeviceFeatures {
            geometry_shader: if self.geometry_shader { vk::TRUE } else { vk::FALSE },
            ..Default::default()
        }
    }

    fn features_present(&self, candidate: &PhysicalDeviceCandidate) -> bool {
        (!self.discrete_only || candidate.properties.is_discrete())
            && (!self.geometry_shader || candidate.features.geometry_shader == vk::TRUE)
    }

    fn extensions_present(&self, candidate: &PhysicalDeviceCandidate) -> bool {
        self.extensions.iter().all(|required| {
            let required = required.to_string_lossy();
            candidate.extensions.iter().any(|ext| *ext == required)
        })
    }
}

/// Result of queue family discovery. Only usable once both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    pub fn resolve(&self) -> Option<SelectedQueues> {
        Some(SelectedQueues {
            graphics: self.graphics?,
            present: self.present?,
        })
    }
}

/// Graphics and present family indices of the chosen device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedQueues {
    pub graphics: u32,
    pub present: u32,
}

impl SelectedQueues {
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Distinct family indices, graphics first
    pub fn unique_families(&self) -> Vec<u32> {
        if self.is_shared() {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }
}

/// Scan families in index order, taking the first graphics family and the
/// first present-capable family. Stops as soon as both are known.
pub fn find_queue_families(families: &[QueueFamily]) -> QueueFamilyIndices {
    let mut indices = QueueFamilyIndices::default();

    for family in families {
        if indices.graphics.is_none() && family.supports_graphics() {
            indices.graphics = Some(family.index);
        }
        if indices.present.is_none() && family.supports_present {
            indices.present = Some(family.index);
        }
        if indices.is_complete() {
            break;
        }
    }

    indices
}

pub fn is_device_suitable(candidate: &PhysicalDeviceCandidate, requirements: &DeviceRequirements) -> bool {
    requirements.features_present(candidate)
        && find_queue_families(&candidate.queue_families).is_complete()
        && requirements.extensions_present(candidate)
        && candidate.swapchain_support.is_adequate()
}

/// The device setup continues with
#[derive(Debug, Clone)]
pub struct DeviceSelection {
    pub physical_device: vk::PhysicalDevice,
    pub name: String,
    pub queues: SelectedQueues,
}

/// Pick the first suitable candidate in enumeration order.
pub fn select_device(
    candidates: Vec<PhysicalDeviceCandidate>,
    requirements: &DeviceRequirements,
) -> Result<DeviceSelection, SetupError> {
    if candidates.is_empty() {
        return Err(SetupError::NoDeviceFound);
    }

    let mut selection = None;
    for candidate in &candidates {
        let suitable = is_device_suitable(candidate, requirements);
        log_candidate(candidate, suitable);

        if suitable && selection.is_none() {
            let indices = find_queue_families(&candidate.queue_families);
            selection = indices.resolve().map(|queues| DeviceSelection {
                physical_device: candidate.handle,
                name: candidate.properties.name.clone(),
                queues,
            });
        }
    }

    selection.ok_or(SetupError::NoSuitableDevice {
        candidates: candidates.len(),
    })
}

fn log_candidate(candidate: &PhysicalDeviceCandidate, suitable: bool) {
    let props = &candidate.properties;
    log::info!(
        "{} {} (Device ID: {}) (Driver version: {})",
        if suitable { "[ OK ]" } else { "[ ERROR ]" },
        props.name,
        props.device_id,
        format_driver_version(props.vendor_id, props.driver_version)
    );
    log::info!(
        "    Discrete: {}, Geometry shader: {}",
        if props.is_discrete() { "Yes" } else { "No" },
        if candidate.features.geometry_shader == vk::TRUE { "Yes" } else { "No" }
    );
    log::debug!(
        "    API version: {}.{}.{}",
        vk::api_version_major(props.api_version),
        vk::api_version_minor(props.api_version),
        vk::api_version_patch(props.api_version)
    );
}

/// Render a driver version using the vendor's packing convention.
pub fn format_driver_version(vendor_id: u32, version: u32) -> String {
    match vendor_id {
        // NVIDIA
        0x10DE => format!(
            "{}.{}.{}.{}",
            (version >> 22) & 0x3FF,
            (version >> 14) & 0xFF,
            (version >> 6) & 0xFF,
            version & 0x3F
        ),
        // Intel
        0x8086 => format!("{}.{}", version >> 14, version & 0x3FFF),
        _ => format!(
            "{}.{}.{}",
            version >> 22,
            (version >> 12) & 0x3FF,
            version & 0xFFF
        ),
    }
}

/// Everything needed to create the logical device
#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub physical_device: vk::PhysicalDevice,
    /// One single-queue request per entry, at `priority`
    pub queue_families: Vec<u32>,
    pub priority: f32,
    pub features: vk::PhysicalDeviceFeatures,
    pub extensions: Vec<&'static CStr>,
}

pub trait DeviceFactory {
    fn create_logical_device(&mut self, request: &DeviceRequest) -> VkResult<vk::Device>;

    fn device_queue(&self, family: u32, index: u32) -> vk::Queue;
}

/// The created device and the queues taken from it
#[derive(Debug, Clone, Copy)]
pub struct LogicalDevice {
    pub handle: vk::Device,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub queues: SelectedQueues,
}

pub fn create_logical_device<F: DeviceFactory + ?Sized>(
    factory: &mut F,
    selection: &DeviceSelection,
    requirements: &DeviceRequirements,
) -> Result<LogicalDevice, SetupError> {
    let request = DeviceRequest {
        physical_device: selection.physical_device,
        queue_families: selection.queues.unique_families(),
        priority: QUEUE_PRIORITY,
        features: requirements.enabled_features(),
        extensions: requirements.extensions.clone(),
    };

    // Retrying gives the same answer, so the error goes straight up
    let handle = factory
        .create_logical_device(&request)
        .map_err(SetupError::DeviceCreationFailed)?;

    Ok(LogicalDevice {
        handle,
        graphics_queue: factory.device_queue(selection.queues.graphics, 0),
        present_queue: factory.device_queue(selection.queues.present, 0),
        queues: selection.queues,
    })
}
