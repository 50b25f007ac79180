use ash::vk;

use crate::vk_utils::BufferError;

/// Failure while creating the Vulkan context. Nothing here is recoverable.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
  #[error("Could not load Vulkan library: {0}")]
  Loading(#[from] ash::LoadingError),
  #[error("{step} failed: {result}")]
  Vulkan {
    step: &'static str,
    result: vk::Result,
  },
  #[error("No physical device can render and present to the window surface")]
  NoSuitableDevice,
  #[error("Could not read shader '{path}': {source}")]
  Shader {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("Could not create memory allocator: {0}")]
  Allocator(#[source] gpu_allocator::AllocationError),
  #[error(transparent)]
  Buffer(#[from] BufferError),
}

/// `vk_call().map_err(vk_step("create_device"))?`
pub fn vk_step(step: &'static str) -> impl Fn(vk::Result) -> InitError {
  move |result| InitError::Vulkan { step, result }
}
