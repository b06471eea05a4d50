// Synchronization primitives
//
// Two binary semaphores order the GPU work of a frame:
// acquire -> image_available -> submit -> render_finished -> present

use super::frame::FrameExecution;
use super::teardown::ResourceRelease;
use crate::error::SetupError;
use ash::vk;

#[derive(Debug, Clone, Copy)]
pub struct FrameSync {
    /// Signalled by the presentation engine when the acquired image is free
    pub image_available: vk::Semaphore,
    /// Signalled by the graphics queue when the frame's commands finish
    pub render_finished: vk::Semaphore,
}

impl FrameSync {
    pub fn new<B>(backend: &mut B) -> Result<Self, SetupError>
    where
        B: FrameExecution + ResourceRelease + ?Sized,
    {
        let image_available = backend
            .create_semaphore()
            .map_err(SetupError::api("create image_available semaphore"))?;

        let render_finished = match backend.create_semaphore() {
            Ok(semaphore) => semaphore,
            Err(result) => {
                backend.destroy_semaphore(image_available);
                return Err(SetupError::api("create render_finished semaphore")(result));
            }
        };

        Ok(Self {
            image_available,
            render_finished,
        })
    }

    pub fn destroy<B: ResourceRelease + ?Sized>(&self, backend: &mut B) {
        for semaphore in [self.render_finished, self.image_available] {
            if semaphore != vk::Semaphore::null() {
                backend.destroy_semaphore(semaphore);
            }
        }
    }
}
