// Teardown - destroy everything in reverse dependency order
//
// ORDER:
// sync -> command pool -> framebuffers -> pipeline -> pipeline layout ->
// render pass -> image views -> swapchain -> device -> surface -> instance
//
// Each slot is taken out of the context before it is destroyed, so running
// teardown twice or after a partial setup never touches a handle twice.

use super::context::RenderContext;
use ash::prelude::VkResult;
use ash::vk::{self, Handle};

pub trait ResourceRelease {
    /// Block until the device has finished all submitted work
    fn wait_idle(&mut self) -> VkResult<()>;

    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore);
    /// Frees every command buffer allocated from the pool as well
    fn destroy_command_pool(&mut self, pool: vk::CommandPool);
    fn destroy_framebuffer(&mut self, framebuffer: vk::Framebuffer);
    fn destroy_pipeline(&mut self, pipeline: vk::Pipeline);
    fn destroy_pipeline_layout(&mut self, layout: vk::PipelineLayout);
    fn destroy_render_pass(&mut self, render_pass: vk::RenderPass);
    fn destroy_shader_module(&mut self, module: vk::ShaderModule);
    fn destroy_image_view(&mut self, view: vk::ImageView);
    fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR);
    fn destroy_device(&mut self, device: vk::Device);
    fn destroy_surface(&mut self, surface: vk::SurfaceKHR);
    fn destroy_instance(&mut self, instance: vk::Instance);
}

/// Run `destroy` only for a handle that was actually created
fn release<H: Handle + Copy>(handle: H, destroy: impl FnOnce(H)) {
    if handle.as_raw() != 0 {
        destroy(handle);
    }
}

impl RenderContext {
    /// Destroy every object the context holds. Safe to call at any point
    /// after construction, any number of times.
    pub fn teardown<B: ResourceRelease + ?Sized>(&mut self, backend: &mut B) {
        if self.is_empty() {
            return;
        }
        log::info!("Tearing down render context");

        if self.device.is_some() {
            if let Err(e) = backend.wait_idle() {
                log::warn!("device_wait_idle failed during teardown: {}", e);
            }
        }

        if let Some(sync) = self.sync.take() {
            sync.destroy(backend);
            log::debug!("Destroyed semaphores");
        }

        if let Some(pool) = self.commands.pool.take() {
            release(pool, |p| backend.destroy_command_pool(p));
            log::debug!("Destroyed command pool");
        }
        self.commands.buffers.clear();

        for framebuffer in self.pipeline.framebuffers.drain(..) {
            release(framebuffer, |f| backend.destroy_framebuffer(f));
        }

        if let Some(pipeline) = self.pipeline.pipeline.take() {
            release(pipeline, |p| backend.destroy_pipeline(p));
            log::debug!("Destroyed graphics pipeline");
        }
        if let Some(layout) = self.pipeline.layout.take() {
            release(layout, |l| backend.destroy_pipeline_layout(l));
        }
        if let Some(render_pass) = self.pipeline.render_pass.take() {
            release(render_pass, |r| backend.destroy_render_pass(r));
            log::debug!("Destroyed render pass");
        }

        if let Some(mut swapchain) = self.swapchain.take() {
            for view in swapchain.image_views.drain(..) {
                release(view, |v| backend.destroy_image_view(v));
            }
            // Images belong to the swapchain
            release(swapchain.handle, |s| backend.destroy_swapchain(s));
            log::debug!("Destroyed swapchain");
        }

        if let Some(device) = self.device.take() {
            release(device.handle, |d| backend.destroy_device(d));
            log::debug!("Destroyed logical device");
        }
        self.selection = None;

        if let Some(surface) = self.surface.take() {
            release(surface, |s| backend.destroy_surface(s));
            log::debug!("Destroyed surface");
        }
        if let Some(instance) = self.instance.take() {
            release(instance, |i| backend.destroy_instance(i));
            log::debug!("Destroyed instance");
        }

        log::info!("Teardown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, MockShaders};

    const RELEASE_ORDER: [&str; 12] = [
        "destroy_semaphore",
        "destroy_semaphore",
        "destroy_command_pool",
        "destroy_framebuffer",
        "destroy_pipeline",
        "destroy_pipeline_layout",
        "destroy_render_pass",
        "destroy_image_view",
        "destroy_swapchain",
        "destroy_device",
        "destroy_surface",
        "destroy_instance",
    ];

    fn destroy_calls(backend: &MockBackend) -> Vec<&'static str> {
        backend
            .call_log()
            .into_iter()
            .filter(|c| c.starts_with("destroy_") && *c != "destroy_shader_module")
            .collect()
    }

    #[test]
    fn full_teardown_follows_reverse_order() {
        let mut backend = MockBackend::single_queue_scenario();
        let mut ctx = RenderContext::default();
        ctx.initialize(&mut backend, &MockBackend::setup_params(), &MockShaders)
            .unwrap();

        ctx.teardown(&mut backend);

        assert_eq!(destroy_calls(&backend), RELEASE_ORDER);
        assert_eq!(backend.live_objects(), 0);
        assert_eq!(backend.invalid_releases(), 0);
        assert!(ctx.is_empty());
    }

    #[test]
    fn waits_for_idle_before_destroying() {
        let mut backend = MockBackend::single_queue_scenario();
        let mut ctx = RenderContext::default();
        ctx.initialize(&mut backend, &MockBackend::setup_params(), &MockShaders)
            .unwrap();

        ctx.teardown(&mut backend);

        let calls = backend.call_log();
        let idle = calls.iter().position(|c| *c == "wait_idle").unwrap();
        let first_destroy = calls
            .iter()
            .position(|c| *c == "destroy_semaphore")
            .unwrap();
        assert!(idle < first_destroy);
    }

    #[test]
    fn teardown_twice_is_harmless() {
        let mut backend = MockBackend::single_queue_scenario();
        let mut ctx = RenderContext::default();
        ctx.initialize(&mut backend, &MockBackend::setup_params(), &MockShaders)
            .unwrap();

        ctx.teardown(&mut backend);
        let after_first = backend.call_log().len();
        ctx.teardown(&mut backend);

        assert_eq!(backend.call_log().len(), after_first);
        assert_eq!(backend.invalid_releases(), 0);
    }

    #[test]
    fn instance_only_context() {
        let mut backend = MockBackend::single_queue_scenario();
        backend.fail("create_surface", vk::Result::ERROR_INITIALIZATION_FAILED);

        let mut ctx = RenderContext::default();
        assert!(ctx
            .initialize(&mut backend, &MockBackend::setup_params(), &MockShaders)
            .is_err());
        assert!(ctx.instance.is_some());

        ctx.teardown(&mut backend);
        assert_eq!(destroy_calls(&backend), ["destroy_instance"]);
        assert_eq!(backend.calls("wait_idle"), 0);
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn empty_context_does_nothing() {
        let mut backend = MockBackend::single_queue_scenario();
        RenderContext::default().teardown(&mut backend);
        assert!(backend.call_log().is_empty());
    }

    #[test]
    fn null_handles_are_skipped() {
        let mut backend = MockBackend::single_queue_scenario();
        let mut ctx = RenderContext {
            instance: Some(vk::Instance::null()),
            surface: Some(vk::SurfaceKHR::null()),
            ..Default::default()
        };
        ctx.pipeline.framebuffers.push(vk::Framebuffer::null());

        ctx.teardown(&mut backend);
        assert!(destroy_calls(&backend).is_empty());
        assert_eq!(backend.invalid_releases(), 0);
    }

    #[test]
    fn partial_swapchain_is_released() {
        let mut backend = MockBackend::single_queue_scenario();
        backend.swapchain_image_override = Some(3);
        backend.fail_after("create_image_view", 2, vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        let mut ctx = RenderContext::default();
        assert!(ctx
            .initialize(&mut backend, &MockBackend::setup_params(), &MockShaders)
            .is_err());

        ctx.teardown(&mut backend);
        assert_eq!(backend.calls("destroy_image_view"), 2);
        assert_eq!(backend.calls("destroy_swapchain"), 1);
        assert_eq!(backend.live_objects(), 0);
        assert_eq!(backend.invalid_releases(), 0);
    }
}
