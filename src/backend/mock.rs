// In-memory backend for tests
//
// Hands out fake handles, records every call by name, tracks which objects
// are alive, and fails named calls on request.

use super::context::SetupParams;
use super::device::{DeviceFactory, DeviceRequest, DeviceRequirements};
use super::frame::{DrawPass, FrameExecution, Presentation, Submission};
use super::instance::{InstanceFactory, InstanceRequest, VALIDATION_LAYER};
use super::pipeline::{PipelineBuilding, PipelineDesc, RenderPassDesc};
use super::probe::{DeviceProbing, DeviceProperties, QueueFamily, SwapchainSupport};
use super::shader::{ShaderLoader, ShaderStage};
use super::swapchain::{SwapchainNegotiation, SwapchainRequest};
use super::teardown::ResourceRelease;
use crate::error::SetupError;
use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::RefCell;
use std::collections::HashMap;

const PHYSICAL_DEVICE_BASE: u64 = 0x100;
const IMAGE_BASE: u64 = 0x8000;
const QUEUE_BASE: u64 = 0x9000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Instance,
    Surface,
    Device,
    Swapchain,
    ImageView,
    ShaderModule,
    RenderPass,
    PipelineLayout,
    Pipeline,
    Framebuffer,
    CommandPool,
    Semaphore,
}

/// A fake physical device
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub properties: DeviceProperties,
    pub geometry_shader: bool,
    pub families: Vec<QueueFamily>,
    pub extensions: Vec<String>,
    pub support: SwapchainSupport,
}

impl MockDevice {
    fn new(name: &str, device_type: vk::PhysicalDeviceType) -> Self {
        Self {
            properties: DeviceProperties {
                name: name.to_string(),
                device_type,
                vendor_id: 0x10DE,
                device_id: 0x2684,
                driver_version: (535 << 22) | (104 << 14),
                api_version: vk::API_VERSION_1_3,
            },
            geometry_shader: true,
            families: vec![QueueFamily {
                index: 0,
                flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
                queue_count: 1,
                supports_present: true,
            }],
            extensions: vec!["VK_KHR_swapchain".to_string()],
            support: SwapchainSupport {
                capabilities: vk::SurfaceCapabilitiesKHR {
                    min_image_count: 1,
                    max_image_count: 1,
                    current_extent: vk::Extent2D { width: 400, height: 400 },
                    min_image_extent: vk::Extent2D { width: 1, height: 1 },
                    max_image_extent: vk::Extent2D {
                        width: 4096,
                        height: 4096,
                    },
                    current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                    ..Default::default()
                },
                formats: vec![vk::SurfaceFormatKHR {
                    format: vk::Format::B8G8R8A8_SRGB,
                    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
                }],
                present_modes: vec![vk::PresentModeKHR::FIFO],
            },
        }
    }

    pub fn discrete(name: &str) -> Self {
        Self::new(name, vk::PhysicalDeviceType::DISCRETE_GPU)
    }

    pub fn integrated(name: &str) -> Self {
        Self::new(name, vk::PhysicalDeviceType::INTEGRATED_GPU)
    }

    pub fn without_geometry_shader(mut self) -> Self {
        self.geometry_shader = false;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_families(mut self, families: Vec<QueueFamily>) -> Self {
        self.families = families;
        self
    }

    pub fn with_formats(mut self, formats: Vec<vk::SurfaceFormatKHR>) -> Self {
        self.support.formats = formats;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    successes_left: u32,
    result: vk::Result,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    pub devices: Vec<MockDevice>,
    pub layers: Vec<String>,
    /// Number of images the swapchain reports, regardless of the request
    pub swapchain_image_override: Option<u32>,

    pub last_device_request: Option<DeviceRequest>,
    pub last_swapchain_request: Option<SwapchainRequest>,
    pub recorded: Vec<(vk::CommandBuffer, DrawPass)>,
    pub submissions: Vec<Submission>,
    pub presentations: Vec<Presentation>,

    calls: RefCell<Vec<&'static str>>,
    failures: RefCell<HashMap<&'static str, Failure>>,
    live: HashMap<u64, ObjectKind>,
    invalid_releases: usize,
    next_handle: u64,
    swapchain_images: u32,
    acquired: u32,
}

impl MockBackend {
    pub fn with_devices(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            layers: vec![VALIDATION_LAYER.to_string_lossy().into_owned()],
            next_handle: 0x1000,
            ..Default::default()
        }
    }

    /// One combined graphics/present family, BGRA8 sRGB, FIFO, exactly one
    /// image and a fixed 400x400 surface.
    pub fn single_queue_scenario() -> Self {
        Self::with_devices(vec![MockDevice::discrete("Mock GPU")])
    }

    pub fn setup_params() -> SetupParams {
        SetupParams {
            instance: InstanceRequest {
                application_name: "Hello Triangle".into(),
                engine_name: "No Engine".into(),
                enable_validation: false,
            },
            requirements: DeviceRequirements::default(),
            window_extent: vk::Extent2D { width: 400, height: 400 },
            preferred_present_mode: vk::PresentModeKHR::FIFO,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn first_device(&self) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(PHYSICAL_DEVICE_BASE)
    }

    /// Every call to `name` fails with `result`
    pub fn fail(&mut self, name: &'static str, result: vk::Result) {
        self.fail_after(name, 0, result);
    }

    /// The first `successes` calls to `name` succeed, the rest fail
    pub fn fail_after(&mut self, name: &'static str, successes: u32, result: vk::Result) {
        self.failures.borrow_mut().insert(
            name,
            Failure {
                successes_left: successes,
                result,
            },
        );
    }

    pub fn call_log(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == name).count()
    }

    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn live_objects(&self) -> usize {
        self.live.len()
    }

    pub fn is_live<H: Handle>(&self, handle: H) -> bool {
        self.live.contains_key(&handle.as_raw())
    }

    /// Releases of handles that were never created or already released
    pub fn invalid_releases(&self) -> usize {
        self.invalid_releases
    }

    fn check(&self, name: &'static str) -> VkResult<()> {
        self.calls.borrow_mut().push(name);
        match self.failures.borrow_mut().get_mut(name) {
            Some(failure) if failure.successes_left > 0 => {
                failure.successes_left -= 1;
                Ok(())
            }
            Some(failure) => Err(failure.result),
            None => Ok(()),
        }
    }

    fn create<H: Handle>(&mut self, name: &'static str, kind: ObjectKind) -> VkResult<H> {
        self.check(name)?;
        self.next_handle += 1;
        self.live.insert(self.next_handle, kind);
        Ok(H::from_raw(self.next_handle))
    }

    fn release<H: Handle>(&mut self, name: &'static str, kind: ObjectKind, handle: H) {
        self.calls.borrow_mut().push(name);
        match self.live.remove(&handle.as_raw()) {
            Some(found) if found == kind => {}
            _ => self.invalid_releases += 1,
        }
    }

    fn device(&self, handle: vk::PhysicalDevice) -> Option<&MockDevice> {
        let index = handle.as_raw().checked_sub(PHYSICAL_DEVICE_BASE)?;
        self.devices.get(index as usize)
    }

    fn known_device(&self, handle: vk::PhysicalDevice) -> VkResult<&MockDevice> {
        self.device(handle).ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }
}

impl InstanceFactory for MockBackend {
    fn available_layers(&self) -> VkResult<Vec<String>> {
        self.check("available_layers")?;
        Ok(self.layers.clone())
    }

    fn create_instance(&mut self, _request: &InstanceRequest) -> VkResult<vk::Instance> {
        self.create("create_instance", ObjectKind::Instance)
    }

    fn create_surface(&mut self) -> VkResult<vk::SurfaceKHR> {
        self.create("create_surface", ObjectKind::Surface)
    }
}

impl DeviceProbing for MockBackend {
    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.check("enumerate_physical_devices")?;
        Ok((0..self.devices.len() as u64)
            .map(|i| vk::PhysicalDevice::from_raw(PHYSICAL_DEVICE_BASE + i))
            .collect())
    }

    fn device_properties(&self, device: vk::PhysicalDevice) -> DeviceProperties {
        self.device(device)
            .map(|d| d.properties.clone())
            .unwrap_or_default()
    }

    fn device_features(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures {
        let geometry_shader = self.device(device).is_some_and(|d| d.geometry_shader);
        vk::PhysicalDeviceFeatures {
            geometry_shader: geometry_shader.into(),
            ..Default::default()
        }
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> VkResult<Vec<QueueFamily>> {
        self.check("queue_families")?;
        Ok(self.known_device(device)?.families.clone())
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        self.check("device_extensions")?;
        Ok(self.known_device(device)?.extensions.clone())
    }

    fn swapchain_support(&self, device: vk::PhysicalDevice) -> VkResult<SwapchainSupport> {
        self.check("swapchain_support")?;
        Ok(self.known_device(device)?.support.clone())
    }
}

impl DeviceFactory for MockBackend {
    fn create_logical_device(&mut self, request: &DeviceRequest) -> VkResult<vk::Device> {
        self.last_device_request = Some(request.clone());
        self.create("create_logical_device", ObjectKind::Device)
    }

    fn device_queue(&self, family: u32, index: u32) -> vk::Queue {
        vk::Queue::from_raw(QUEUE_BASE + u64::from(family) * 16 + u64::from(index))
    }
}

impl SwapchainNegotiation for MockBackend {
    fn create_swapchain(&mut self, request: &SwapchainRequest) -> VkResult<vk::SwapchainKHR> {
        self.last_swapchain_request = Some(request.clone());
        let swapchain = self.create("create_swapchain", ObjectKind::Swapchain)?;
        self.swapchain_images = self
            .swapchain_image_override
            .unwrap_or(request.config.image_count);
        Ok(swapchain)
    }

    fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        self.check("swapchain_images")?;
        Ok((0..u64::from(self.swapchain_images))
            .map(|i| vk::Image::from_raw(IMAGE_BASE + i))
            .collect())
    }

    fn create_image_view(&mut self, _image: vk::Image, _format: vk::Format) -> VkResult<vk::ImageView> {
        self.create("create_image_view", ObjectKind::ImageView)
    }
}

impl PipelineBuilding for MockBackend {
    fn create_shader_module(&mut self, _code: &[u32]) -> VkResult<vk::ShaderModule> {
        self.create("create_shader_module", ObjectKind::ShaderModule)
    }

    fn create_render_pass(&mut self, _desc: &RenderPassDesc) -> VkResult<vk::RenderPass> {
        self.create("create_render_pass", ObjectKind::RenderPass)
    }

    fn create_pipeline_layout(&mut self) -> VkResult<vk::PipelineLayout> {
        self.create("create_pipeline_layout", ObjectKind::PipelineLayout)
    }

    fn create_graphics_pipeline(&mut self, _desc: &PipelineDesc) -> VkResult<vk::Pipeline> {
        self.create("create_graphics_pipeline", ObjectKind::Pipeline)
    }

    fn create_framebuffer(
        &mut self,
        _render_pass: vk::RenderPass,
        _view: vk::ImageView,
        _extent: vk::Extent2D,
    ) -> VkResult<vk::Framebuffer> {
        self.create("create_framebuffer", ObjectKind::Framebuffer)
    }
}

impl FrameExecution for MockBackend {
    fn create_command_pool(&mut self, _queue_family: u32) -> VkResult<vk::CommandPool> {
        self.create("create_command_pool", ObjectKind::CommandPool)
    }

    fn allocate_command_buffers(
        &mut self,
        _pool: vk::CommandPool,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        self.check("allocate_command_buffers")?;
        // Owned by the pool, so not tracked
        Ok((0..count)
            .map(|_| {
                self.next_handle += 1;
                vk::CommandBuffer::from_raw(self.next_handle)
            })
            .collect())
    }

    fn record_draw(&mut self, command_buffer: vk::CommandBuffer, pass: &DrawPass) -> VkResult<()> {
        self.check("record_draw")?;
        self.recorded.push((command_buffer, *pass));
        Ok(())
    }

    fn create_semaphore(&mut self) -> VkResult<vk::Semaphore> {
        self.create("create_semaphore", ObjectKind::Semaphore)
    }

    fn acquire_next_image(
        &mut self,
        _swapchain: vk::SwapchainKHR,
        _timeout: u64,
        _signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)> {
        self.check("acquire_next_image")?;
        let index = self.acquired % self.swapchain_images.max(1);
        self.acquired += 1;
        Ok((index, false))
    }

    fn submit(&mut self, _queue: vk::Queue, submission: &Submission) -> VkResult<()> {
        self.check("submit")?;
        self.submissions.push(*submission);
        Ok(())
    }

    fn present(&mut self, _queue: vk::Queue, presentation: &Presentation) -> VkResult<bool> {
        self.check("present")?;
        self.presentations.push(*presentation);
        Ok(false)
    }
}

impl ResourceRelease for MockBackend {
    fn wait_idle(&mut self) -> VkResult<()> {
        self.check("wait_idle")
    }

    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
        self.release("destroy_semaphore", ObjectKind::Semaphore, semaphore);
    }

    fn destroy_command_pool(&mut self, pool: vk::CommandPool) {
        self.release("destroy_command_pool", ObjectKind::CommandPool, pool);
    }

    fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer) {
        self.release("destroy_framebuffer", ObjectKind::Framebuffer, framebuffer);
    }

    fn destroy_pipeline(&mut self, pipeline: vk::Pipeline) {
        self.release("destroy_pipeline", ObjectKind::Pipeline, pipeline);
    }

    fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout) {
        self.release("destroy_pipeline_layout", ObjectKind::PipelineLayout, layout);
    }

    fn destroy_render_pass(&mut self, render_pass: vk::RenderPass) {
        self.release("destroy_render_pass", ObjectKind::RenderPass, render_pass);
    }

    fn destroy_shader_module(&mut self, module: vk::ShaderModule) {
        self.release("destroy_shader_module", ObjectKind::ShaderModule, module);
    }

    fn destroy_image_view(&mut self, view: vk::ImageView) {
        self.release("destroy_image_view", ObjectKind::ImageView, view);
    }

    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        self.release("destroy_swapchain", ObjectKind::Swapchain, swapchain);
    }

    fn destroy_device(&mut self, device: vk::Device) {
        self.release("destroy_device", ObjectKind::Device, device);
    }

    fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        self.release("destroy_surface", ObjectKind::Surface, surface);
    }

    fn destroy_instance(&mut self, instance: vk::Instance) {
        self.release("destroy_instance", ObjectKind::Instance, instance);
    }
}

/// Serves a minimal valid SPIR-V header for both stages
pub struct MockShaders;

impl ShaderLoader for MockShaders {
    fn load(&self, _stage: ShaderStage) -> Result<Vec<u32>, SetupError> {
        Ok(vec![0x0723_0203, 0x0001_0000, 0, 1, 0])
    }
}
