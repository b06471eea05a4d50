// Vulkan backend - the real implementation of every backend trait
//
// Owns the loader objects (entry, instance, device and extension loaders)
// while the render context owns the handles. Each trait method is a thin
// wrapper over one or two ash calls; all policy lives in the callers.

use super::device::{DeviceFactory, DeviceRequest};
use super::frame::{DrawPass, FrameExecution, Presentation, Submission};
use super::instance::{InstanceFactory, InstanceRequest};
use super::pipeline::{PipelineBuilding, PipelineDesc, RenderPassDesc};
use super::probe::{DeviceProbing, DeviceProperties, QueueFamily, SwapchainSupport};
use super::swapchain::{ImageSharing, SwapchainNegotiation, SwapchainRequest};
use super::teardown::ResourceRelease;
use anyhow::{Context, Result};
use ash::extensions::{ext::DebugUtils, khr};
use ash::prelude::VkResult;
use ash::{vk, Entry};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle};
use std::ffi::{c_char, CStr, CString};

/// Loader objects only exist once the matching handle has been created
const NOT_CREATED: vk::Result = vk::Result::ERROR_INITIALIZATION_FAILED;

pub struct VulkanBackend {
    entry: Entry,
    display_handle: RawDisplayHandle,
    window_handle: RawWindowHandle,

    instance: Option<ash::Instance>,
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
    surface_loader: Option<khr::Surface>,
    surface: vk::SurfaceKHR,

    device: Option<ash::Device>,
    swapchain_loader: Option<khr::Swapchain>,
}

impl VulkanBackend {
    /// Load the Vulkan library for `window`. The window must outlive the
    /// surface created from it.
    pub fn new<W: HasRawDisplayHandle + HasRawWindowHandle>(window: &W) -> Result<Self> {
        let entry = unsafe { Entry::load() }.context("Failed to load Vulkan library. Is Vulkan installed?")?;

        Ok(Self {
            entry,
            display_handle: window.raw_display_handle(),
            window_handle: window.raw_window_handle(),
            instance: None,
            debug_utils: None,
            surface_loader: None,
            surface: vk::SurfaceKHR::null(),
            device: None,
            swapchain_loader: None,
        })
    }

    fn instance(&self) -> VkResult<&ash::Instance> {
        self.instance.as_ref().ok_or(NOT_CREATED)
    }

    fn surface_loader(&self) -> VkResult<&khr::Surface> {
        self.surface_loader.as_ref().ok_or(NOT_CREATED)
    }

    fn device(&self) -> VkResult<&ash::Device> {
        self.device.as_ref().ok_or(NOT_CREATED)
    }

    fn swapchain_loader(&self) -> VkResult<&khr::Swapchain> {
        self.swapchain_loader.as_ref().ok_or(NOT_CREATED)
    }

    fn setup_debug_messenger(&mut self, instance: &ash::Instance) {
        let debug_utils = DebugUtils::new(&self.entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        match unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) } {
            Ok(messenger) => self.debug_utils = Some((debug_utils, messenger)),
            Err(e) => log::warn!("Failed to set up debug messenger: {}", e),
        }
    }
}

fn name_from_raw(raw: &[c_char]) -> String {
    unsafe { CStr::from_ptr(raw.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

fn c_string(value: &str) -> VkResult<CString> {
    CString::new(value).map_err(|_| vk::Result::ERROR_INITIALIZATION_FAILED)
}

impl InstanceFactory for VulkanBackend {
    fn available_layers(&self) -> VkResult<Vec<String>> {
        #[allow(unused_unsafe)]
        let layers = unsafe { self.entry.enumerate_instance_layer_properties() }?;
        Ok(layers.iter().map(|l| name_from_raw(&l.layer_name)).collect())
    }

    fn create_instance(&mut self, request: &InstanceRequest) -> VkResult<vk::Instance> {
        let app_name = c_string(&request.application_name)?;
        let engine_name = c_string(&request.engine_name)?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        // Surface extensions for this platform
        let mut extensions = ash_window::enumerate_required_extensions(self.display_handle)?.to_vec();
        if request.enable_validation {
            extensions.push(DebugUtils::name().as_ptr());
        }
        for &ext in &extensions {
            log::debug!("Instance extension: {}", unsafe { CStr::from_ptr(ext) }.to_string_lossy());
        }

        let layers: Vec<*const c_char> = request.layers().iter().map(|l| l.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layers);

        let instance = unsafe { self.entry.create_instance(&create_info, None) }?;

        if request.enable_validation {
            self.setup_debug_messenger(&instance);
        }
        self.surface_loader = Some(khr::Surface::new(&self.entry, &instance));
        let handle = instance.handle();
        self.instance = Some(instance);
        Ok(handle)
    }

    fn create_surface(&mut self) -> VkResult<vk::SurfaceKHR> {
        let instance = self.instance()?;
        let surface = unsafe {
            ash_window::create_surface(&self.entry, instance, self.display_handle, self.window_handle, None)
        }?;
        self.surface = surface;
        Ok(surface)
    }
}

impl DeviceProbing for VulkanBackend {
    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance()?.enumerate_physical_devices() }
    }

    fn device_properties(&self, device: vk::PhysicalDevice) -> DeviceProperties {
        let Ok(instance) = self.instance() else {
            return DeviceProperties::default();
        };
        let props = unsafe { instance.get_physical_device_properties(device) };
        DeviceProperties {
            name: name_from_raw(&props.device_name),
            device_type: props.device_type,
            vendor_id: props.vendor_id,
            device_id: props.device_id,
            driver_version: props.driver_version,
            api_version: props.api_version,
        }
    }

    fn device_features(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceFeatures {
        match self.instance() {
            Ok(instance) => unsafe { instance.get_physical_device_features(device) },
            Err(_) => vk::PhysicalDeviceFeatures::default(),
        }
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> VkResult<Vec<QueueFamily>> {
        let instance = self.instance()?;
        let surface_loader = self.surface_loader()?;
        let families = unsafe { instance.get_physical_device_queue_family_properties(device) };

        families
            .iter()
            .enumerate()
            .map(|(index, props)| {
                let index = index as u32;
                let supports_present = unsafe {
                    surface_loader.get_physical_device_surface_support(device, index, self.surface)
                }?;
                Ok(QueueFamily {
                    index,
                    flags: props.queue_flags,
                    queue_count: props.queue_count,
                    supports_present,
                })
            })
            .collect()
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VkResult<Vec<String>> {
        let extensions = unsafe { self.instance()?.enumerate_device_extension_properties(device) }?;
        Ok(extensions.iter().map(|e| name_from_raw(&e.extension_name)).collect())
    }

    fn swapchain_support(&self, device: vk::PhysicalDevice) -> VkResult<SwapchainSupport> {
        let loader = self.surface_loader()?;
        unsafe {
            Ok(SwapchainSupport {
                capabilities: loader.get_physical_device_surface_capabilities(device, self.surface)?,
                formats: loader.get_physical_device_surface_formats(device, self.surface)?,
                present_modes: loader.get_physical_device_surface_present_modes(device, self.surface)?,
            })
        }
    }
}

impl DeviceFactory for VulkanBackend {
    fn create_logical_device(&mut self, request: &DeviceRequest) -> VkResult<vk::Device> {
        let instance = self.instance()?;

        let priorities = [request.priority];
        let queue_infos: Vec<vk::DeviceQueueCreateInfo> = request
            .queue_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::builder()
                    .queue_family_index(family)
                    .queue_priorities(&priorities)
                    .build()
            })
            .collect();

        let extensions: Vec<*const c_char> = request.extensions.iter().map(|e| e.as_ptr()).collect();

        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&request.features);

        let device = unsafe { instance.create_device(request.physical_device, &create_info, None) }?;

        let swapchain_loader = khr::Swapchain::new(instance, &device);
        self.swapchain_loader = Some(swapchain_loader);
        let handle = device.handle();
        self.device = Some(device);
        Ok(handle)
    }

    fn device_queue(&self, family: u32, index: u32) -> vk::Queue {
        match self.device() {
            Ok(device) => unsafe { device.get_device_queue(family, index) },
            Err(_) => vk::Queue::null(),
        }
    }
}

impl SwapchainNegotiation for VulkanBackend {
    fn create_swapchain(&mut self, request: &SwapchainRequest) -> VkResult<vk::SwapchainKHR> {
        let loader = self.swapchain_loader()?;
        let config = &request.config;

        let (sharing_mode, families): (_, &[u32]) = match &request.sharing {
            ImageSharing::Exclusive => (vk::SharingMode::EXCLUSIVE, &[]),
            ImageSharing::Concurrent(families) => (vk::SharingMode::CONCURRENT, families.as_slice()),
        };

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(request.surface)
            .min_image_count(config.image_count)
            .image_format(config.format)
            .image_color_space(config.color_space)
            .image_extent(config.extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(families)
            .pre_transform(config.transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(config.present_mode)
            .clipped(true)
            .old_swapchain(vk::SwapchainKHR::null());

        unsafe { loader.create_swapchain(&create_info, None) }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader()?.get_swapchain_images(swapchain) }
    }

    fn create_image_view(&mut self, image: vk::Image, format: vk::Format) -> VkResult<vk::ImageView> {
        let create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe { self.device()?.create_image_view(&create_info, None) }
    }
}

impl PipelineBuilding for VulkanBackend {
    fn create_shader_module(&mut self, code: &[u32]) -> VkResult<vk::ShaderModule> {
        let create_info = vk::ShaderModuleCreateInfo::builder().code(code);
        unsafe { self.device()?.create_shader_module(&create_info, None) }
    }

    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> VkResult<vk::RenderPass> {
        let attachments = [vk::AttachmentDescription::builder()
            .format(desc.color_format)
            .samples(desc.samples)
            .load_op(desc.load_op)
            .store_op(desc.store_op)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(desc.initial_layout)
            .final_layout(desc.final_layout)
            .build()];

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: desc.subpass_layout,
        }];
        let subpasses = [vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .build()];
        let dependencies = [desc.dependency];

        let create_info = vk::RenderPassCreateInfo::builder()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        unsafe { self.device()?.create_render_pass(&create_info, None) }
    }

    fn create_pipeline_layout(&mut self) -> VkResult<vk::PipelineLayout> {
        let create_info = vk::PipelineLayoutCreateInfo::builder();
        unsafe { self.device()?.create_pipeline_layout(&create_info, None) }
    }

    fn create_graphics_pipeline(&mut self, desc: &PipelineDesc) -> VkResult<vk::Pipeline> {
        let stages = [
            vk::PipelineShaderStageCreateInfo::builder()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(desc.vertex_shader)
                .name(desc.entry_point)
                .build(),
            vk::PipelineShaderStageCreateInfo::builder()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(desc.fragment_shader)
                .name(desc.entry_point)
                .build(),
        ];

        // Vertices come from the shader
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder();
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(desc.topology)
            .primitive_restart_enable(false);

        let viewports = [vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: desc.extent.width as f32,
            height: desc.extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }];
        let scissors = [vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: desc.extent,
        }];
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(desc.polygon_mode)
            .line_width(1.0)
            .cull_mode(desc.cull_mode)
            .front_face(desc.front_face)
            .depth_bias_enable(false);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(false)
            .rasterization_samples(desc.samples);

        let blend_attachments = [vk::PipelineColorBlendAttachmentState::builder()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(desc.blend_enable)
            .build()];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&blend_attachments);

        let create_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .color_blend_state(&color_blending)
            .layout(desc.layout)
            .render_pass(desc.render_pass)
            .subpass(0)
            .build();

        let pipelines = unsafe {
            self.device()?
                .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
        }
        .map_err(|(_, result)| result)?;

        pipelines.into_iter().next().ok_or(vk::Result::ERROR_UNKNOWN)
    }

    fn create_framebuffer(
        &mut self,
        render_pass: vk::RenderPass,
        view: vk::ImageView,
        extent: vk::Extent2D,
    ) -> VkResult<vk::Framebuffer> {
        let attachments = [view];
        let create_info = vk::FramebufferCreateInfo::builder()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        unsafe { self.device()?.create_framebuffer(&create_info, None) }
    }
}

impl FrameExecution for VulkanBackend {
    fn create_command_pool(&mut self, queue_family: u32) -> VkResult<vk::CommandPool> {
        // Buffers are recorded once and never reset
        let create_info = vk::CommandPoolCreateInfo::builder().queue_family_index(queue_family);
        unsafe { self.device()?.create_command_pool(&create_info, None) }
    }

    fn allocate_command_buffers(
        &mut self,
        pool: vk::CommandPool,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);
        unsafe { self.device()?.allocate_command_buffers(&alloc_info) }
    }

    fn record_draw(&mut self, cmd: vk::CommandBuffer, pass: &DrawPass) -> VkResult<()> {
        let device = self.device()?;
        let clear_values = [vk::ClearValue {
            color: vk::ClearColorValue {
                float32: pass.clear_color,
            },
        }];
        let render_pass_info = vk::RenderPassBeginInfo::builder()
            .render_pass(pass.render_pass)
            .framebuffer(pass.framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: pass.extent,
            })
            .clear_values(&clear_values);

        unsafe {
            device.begin_command_buffer(cmd, &vk::CommandBufferBeginInfo::builder())?;
            device.cmd_begin_render_pass(cmd, &render_pass_info, vk::SubpassContents::INLINE);
            device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, pass.pipeline);
            device.cmd_draw(cmd, pass.vertex_count, pass.instance_count, 0, 0);
            device.cmd_end_render_pass(cmd);
            device.end_command_buffer(cmd)
        }
    }

    fn create_semaphore(&mut self) -> VkResult<vk::Semaphore> {
        let create_info = vk::SemaphoreCreateInfo::builder();
        unsafe { self.device()?.create_semaphore(&create_info, None) }
    }

    fn acquire_next_image(
        &mut self,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        signal: vk::Semaphore,
    ) -> VkResult<(u32, bool)> {
        unsafe {
            self.swapchain_loader()?
                .acquire_next_image(swapchain, timeout, signal, vk::Fence::null())
        }
    }

    fn submit(&mut self, queue: vk::Queue, submission: &Submission) -> VkResult<()> {
        let wait_semaphores = [submission.wait_semaphore];
        let wait_stages = [submission.wait_stage];
        let command_buffers = [submission.command_buffer];
        let signal_semaphores = [submission.signal_semaphore];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();

        unsafe { self.device()?.queue_submit(queue, &[submit_info], vk::Fence::null()) }
    }

    fn present(&mut self, queue: vk::Queue, presentation: &Presentation) -> VkResult<bool> {
        let wait_semaphores = [presentation.wait_semaphore];
        let swapchains = [presentation.swapchain];
        let image_indices = [presentation.image_index];

        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        unsafe { self.swapchain_loader()?.queue_present(queue, &present_info) }
    }
}

impl ResourceRelease for VulkanBackend {
    fn wait_idle(&mut self) -> VkResult<()> {
        unsafe { self.device()?.device_wait_idle() }
    }

    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_semaphore(semaphore, None) };
        }
    }

    fn destroy_command_pool(&mut self, pool: vk::CommandPool) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_command_pool(pool, None) };
        }
    }

    fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_framebuffer(framebuffer, None) };
        }
    }

    fn destroy_pipeline(&mut self, pipeline: vk::Pipeline) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_pipeline(pipeline, None) };
        }
    }

    fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_pipeline_layout(layout, None) };
        }
    }

    fn destroy_render_pass(&mut self, render_pass: vk::RenderPass) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_render_pass(render_pass, None) };
        }
    }

    fn destroy_shader_module(&mut self, module: vk::ShaderModule) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_shader_module(module, None) };
        }
    }

    fn destroy_image_view(&mut self, view: vk::ImageView) {
        if let Ok(device) = self.device() {
            unsafe { device.destroy_image_view(view, None) };
        }
    }

    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        if let Ok(loader) = self.swapchain_loader() {
            unsafe { loader.destroy_swapchain(swapchain, None) };
        }
    }

    fn destroy_device(&mut self, handle: vk::Device) {
        self.swapchain_loader = None;
        match self.device.take() {
            Some(device) if device.handle() == handle => unsafe { device.destroy_device(None) },
            other => {
                log::warn!("destroy_device called for a device this backend does not own");
                self.device = other;
            }
        }
    }

    fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        if let Ok(loader) = self.surface_loader() {
            unsafe { loader.destroy_surface(surface, None) };
        }
        self.surface = vk::SurfaceKHR::null();
    }

    fn destroy_instance(&mut self, handle: vk::Instance) {
        // The messenger has to go before the instance it reports on
        if let Some((debug_utils, messenger)) = self.debug_utils.take() {
            unsafe { debug_utils.destroy_debug_utils_messenger(messenger, None) };
        }
        self.surface_loader = None;

        match self.instance.take() {
            Some(instance) if instance.handle() == handle => unsafe { instance.destroy_instance(None) },
            other => {
                log::warn!("destroy_instance called for an instance this backend does not own");
                self.instance = other;
            }
        }
    }
}

// Validation layer messages are routed into the log
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => log::error!("[Vulkan] {}", message),
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => log::warn!("[Vulkan] {}", message),
        _ => log::debug!("[Vulkan] {}", message),
    }

    vk::FALSE
}
