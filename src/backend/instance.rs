// Instance and surface creation - the first two setup stages

use crate::error::SetupError;
use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CStr;

pub const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

#[derive(Debug, Clone)]
pub struct InstanceRequest {
    pub application_name: String,
    pub engine_name: String,
    pub enable_validation: bool,
}

impl InstanceRequest {
    /// Layers to enable on the instance
    pub fn layers(&self) -> Vec<&'static CStr> {
        if self.enable_validation {
            vec![VALIDATION_LAYER]
        } else {
            Vec::new()
        }
    }
}

pub trait InstanceFactory {
    /// Names of the instance layers the loader can provide
    fn available_layers(&self) -> VkResult<Vec<String>>;

    fn create_instance(&mut self, request: &InstanceRequest) -> VkResult<vk::Instance>;

    /// Create the presentation surface for the window the backend was built for.
    fn create_surface(&mut self) -> VkResult<vk::SurfaceKHR>;
}

/// Make sure every requested layer exists before asking for an instance.
pub fn check_layer_support<F: InstanceFactory + ?Sized>(
    factory: &F,
    request: &InstanceRequest,
) -> Result<(), SetupError> {
    let wanted = request.layers();
    if wanted.is_empty() {
        return Ok(());
    }

    let available = factory
        .available_layers()
        .map_err(SetupError::api("enumerate_instance_layer_properties"))?;

    for layer in wanted {
        let name = layer.to_string_lossy();
        if !available.iter().any(|a| *a == name) {
            log::warn!("Requested layer {} is not installed", name);
            return Err(SetupError::ValidationLayerUnavailable(name.into_owned()));
        }
    }

    Ok(())
}
