// Graphics pipeline, render pass and framebuffers
//
// One color attachment, one subpass, no vertex buffers: the triangle's
// vertices live in the vertex shader. Descriptions are plain data so the
// fixed-function state can be checked without a device.

use super::shader::{ShaderLoader, ShaderStage};
use super::teardown::ResourceRelease;
use crate::error::SetupError;
use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CStr;

pub const SHADER_ENTRY_POINT: &CStr = c"main";

/// Single color attachment render pass
#[derive(Debug, Clone, Copy)]
pub struct RenderPassDesc {
    pub color_format: vk::Format,
    pub samples: vk::SampleCountFlags,
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub initial_layout: vk::ImageLayout,
    pub final_layout: vk::ImageLayout,
    pub subpass_layout: vk::ImageLayout,
    pub dependency: vk::SubpassDependency,
}

impl RenderPassDesc {
    /// Clear on load, keep on store, hand the image to the presentation engine.
    pub fn for_swapchain(format: vk::Format) -> Self {
        Self {
            color_format: format,
            samples: vk::SampleCountFlags::TYPE_1,
            load_op: vk::AttachmentLoadOp::CLEAR,
            store_op: vk::AttachmentStoreOp::STORE,
            initial_layout: vk::ImageLayout::UNDEFINED,
            final_layout: vk::ImageLayout::PRESENT_SRC_KHR,
            subpass_layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            // Writes wait until the presentation engine is done reading
            dependency: vk::SubpassDependency {
                src_subpass: vk::SUBPASS_EXTERNAL,
                dst_subpass: 0,
                src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                src_access_mask: vk::AccessFlags::empty(),
                dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                dependency_flags: vk::DependencyFlags::empty(),
            },
        }
    }
}

/// Fixed-function and shader state of the triangle pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineDesc {
    pub vertex_shader: vk::ShaderModule,
    pub fragment_shader: vk::ShaderModule,
    pub entry_point: &'static CStr,
    pub extent: vk::Extent2D,
    pub topology: vk::PrimitiveTopology,
    pub polygon_mode: vk::PolygonMode,
    pub cull_mode: vk::CullModeFlags,
    pub front_face: vk::FrontFace,
    pub samples: vk::SampleCountFlags,
    pub blend_enable: bool,
    pub layout: vk::PipelineLayout,
    pub render_pass: vk::RenderPass,
}

impl PipelineDesc {
    pub fn triangle(
        vertex_shader: vk::ShaderModule,
        fragment_shader: vk::ShaderModule,
        layout: vk::PipelineLayout,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
    ) -> Self {
        Self {
            vertex_shader,
            fragment_shader,
            entry_point: SHADER_ENTRY_POINT,
            extent,
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::BACK,
            front_face: vk::FrontFace::CLOCKWISE,
            samples: vk::SampleCountFlags::TYPE_1,
            blend_enable: false,
            layout,
            render_pass,
        }
    }
}

pub trait PipelineBuilding {
    fn create_shader_module(&mut self, code: &[u32]) -> VkResult<vk::ShaderModule>;

    fn create_render_pass(&mut self, desc: &RenderPassDesc) -> VkResult<vk::RenderPass>;

    /// Layout with no descriptor sets and no push constants
    fn create_pipeline_layout(&mut self) -> VkResult<vk::PipelineLayout>;

    fn create_graphics_pipeline(&mut self, desc: &PipelineDesc) -> VkResult<vk::Pipeline>;

    fn create_framebuffer(
        &mut self,
        render_pass: vk::RenderPass,
        view: vk::ImageView,
        extent: vk::Extent2D,
    ) -> VkResult<vk::Framebuffer>;
}

/// Everything tied to one swapchain generation. Rebuilt whenever the
/// swapchain is.
#[derive(Debug, Clone, Default)]
pub struct PipelineResources {
    pub render_pass: Option<vk::RenderPass>,
    pub layout: Option<vk::PipelineLayout>,
    pub pipeline: Option<vk::Pipeline>,
    pub framebuffers: Vec<vk::Framebuffer>,
}

#[derive(Debug, Clone, Copy)]
pub struct GraphicsPipeline {
    pub layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

pub fn create_render_pass<B: PipelineBuilding + ?Sized>(
    backend: &mut B,
    format: vk::Format,
) -> Result<vk::RenderPass, SetupError> {
    backend
        .create_render_pass(&RenderPassDesc::for_swapchain(format))
        .map_err(SetupError::api("create_render_pass"))
}

/// Build the pipeline. Shader modules are always released before
/// returning, and so is the layout if the pipeline itself fails.
pub fn create_graphics_pipeline<B>(
    backend: &mut B,
    shaders: &dyn ShaderLoader,
    render_pass: vk::RenderPass,
    extent: vk::Extent2D,
) -> Result<GraphicsPipeline, SetupError>
where
    B: PipelineBuilding + ResourceRelease + ?Sized,
{
    let vertex_code = shaders.load(ShaderStage::Vertex)?;
    let fragment_code = shaders.load(ShaderStage::Fragment)?;

    let vertex = backend
        .create_shader_module(&vertex_code)
        .map_err(|result| SetupError::PipelineCreationFailed {
            stage: "vertex shader module",
            result,
        })?;

    let fragment = match backend.create_shader_module(&fragment_code) {
        Ok(module) => module,
        Err(result) => {
            backend.destroy_shader_module(vertex);
            return Err(SetupError::PipelineCreationFailed {
                stage: "fragment shader module",
                result,
            });
        }
    };

    let result = build_with_modules(backend, vertex, fragment, render_pass, extent);

    backend.destroy_shader_module(fragment);
    backend.destroy_shader_module(vertex);
    result
}

fn build_with_modules<B>(
    backend: &mut B,
    vertex: vk::ShaderModule,
    fragment: vk::ShaderModule,
    render_pass: vk::RenderPass,
    extent: vk::Extent2D,
) -> Result<GraphicsPipeline, SetupError>
where
    B: PipelineBuilding + ResourceRelease + ?Sized,
{
    let layout = backend
        .create_pipeline_layout()
        .map_err(|result| SetupError::PipelineCreationFailed {
            stage: "pipeline layout",
            result,
        })?;

    let desc = PipelineDesc::triangle(vertex, fragment, layout, render_pass, extent);
    match backend.create_graphics_pipeline(&desc) {
        Ok(pipeline) => Ok(GraphicsPipeline { layout, pipeline }),
        Err(result) => {
            backend.destroy_pipeline_layout(layout);
            Err(SetupError::PipelineCreationFailed {
                stage: "graphics pipeline",
                result,
            })
        }
    }
}

/// One framebuffer per swapchain image view, pushed into `framebuffers` as
/// each one is created.
pub fn create_framebuffers<B: PipelineBuilding + ?Sized>(
    backend: &mut B,
    render_pass: vk::RenderPass,
    image_views: &[vk::ImageView],
    extent: vk::Extent2D,
    framebuffers: &mut Vec<vk::Framebuffer>,
) -> Result<(), SetupError> {
    for &view in image_views {
        let framebuffer = backend
            .create_framebuffer(render_pass, view, extent)
            .map_err(SetupError::api("create_framebuffer"))?;
        framebuffers.push(framebuffer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockBackend, MockShaders, ObjectKind};

    const EXTENT: vk::Extent2D = vk::Extent2D {
        width: 400,
        height: 400,
    };

    #[test]
    fn render_pass_clears_and_presents() {
        let desc = RenderPassDesc::for_swapchain(vk::Format::B8G8R8A8_SRGB);
        assert_eq!(desc.load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(desc.store_op, vk::AttachmentStoreOp::STORE);
        assert_eq!(desc.initial_layout, vk::ImageLayout::UNDEFINED);
        assert_eq!(desc.final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
        assert_eq!(desc.dependency.src_subpass, vk::SUBPASS_EXTERNAL);
        assert_eq!(desc.dependency.dst_subpass, 0);
        assert_eq!(
            desc.dependency.dst_stage_mask,
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
        );
        assert_eq!(desc.dependency.dst_access_mask, vk::AccessFlags::COLOR_ATTACHMENT_WRITE);
    }

    #[test]
    fn triangle_pipeline_state() {
        let desc = PipelineDesc::triangle(
            vk::ShaderModule::null(),
            vk::ShaderModule::null(),
            vk::PipelineLayout::null(),
            vk::RenderPass::null(),
            EXTENT,
        );
        assert_eq!(desc.topology, vk::PrimitiveTopology::TRIANGLE_LIST);
        assert_eq!(desc.polygon_mode, vk::PolygonMode::FILL);
        assert_eq!(desc.cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(desc.samples, vk::SampleCountFlags::TYPE_1);
        assert!(!desc.blend_enable);
        assert_eq!(desc.entry_point, c"main");
    }

    #[test]
    fn success_releases_shader_modules_only() {
        let mut backend = MockBackend::single_queue_scenario();
        let pipeline =
            create_graphics_pipeline(&mut backend, &MockShaders, vk::RenderPass::null(), EXTENT).unwrap();

        assert_eq!(backend.live_count(ObjectKind::ShaderModule), 0);
        assert!(backend.is_live(pipeline.layout));
        assert!(backend.is_live(pipeline.pipeline));
    }

    #[test]
    fn pipeline_failure_releases_layout_and_modules() {
        let mut backend = MockBackend::single_queue_scenario();
        backend.fail("create_graphics_pipeline", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        let err = create_graphics_pipeline(&mut backend, &MockShaders, vk::RenderPass::null(), EXTENT)
            .unwrap_err();
        assert!(matches!(
            err,
            SetupError::PipelineCreationFailed {
                stage: "graphics pipeline",
                ..
            }
        ));
        assert_eq!(backend.live_count(ObjectKind::ShaderModule), 0);
        assert_eq!(backend.live_count(ObjectKind::PipelineLayout), 0);
    }

    #[test]
    fn fragment_module_failure_releases_vertex_module() {
        let mut backend = MockBackend::single_queue_scenario();
        backend.fail_after("create_shader_module", 1, vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);

        let err = create_graphics_pipeline(&mut backend, &MockShaders, vk::RenderPass::null(), EXTENT)
            .unwrap_err();
        assert!(matches!(
            err,
            SetupError::PipelineCreationFailed {
                stage: "fragment shader module",
                ..
            }
        ));
        assert_eq!(backend.live_count(ObjectKind::ShaderModule), 0);
        assert_eq!(backend.calls("destroy_shader_module"), 1);
    }

    #[test]
    fn layout_failure_releases_both_modules() {
        let mut backend = MockBackend::single_queue_scenario();
        backend.fail("create_pipeline_layout", vk::Result::ERROR_OUT_OF_HOST_MEMORY);

        let err = create_graphics_pipeline(&mut backend, &MockShaders, vk::RenderPass::null(), EXTENT)
            .unwrap_err();
        assert_eq!(err.status(), vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        assert_eq!(backend.live_count(ObjectKind::ShaderModule), 0);
        assert_eq!(backend.calls("create_graphics_pipeline"), 0);
    }

    #[test]
    fn framebuffer_per_view() {
        let mut backend = MockBackend::single_queue_scenario();
        let views = [vk::ImageView::null(); 3];
        let mut framebuffers = Vec::new();
        create_framebuffers(&mut backend, vk::RenderPass::null(), &views, EXTENT, &mut framebuffers).unwrap();
        assert_eq!(framebuffers.len(), 3);
        assert_eq!(backend.live_count(ObjectKind::Framebuffer), 3);
    }
}
