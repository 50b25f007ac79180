mod init_error;
mod vk_ctx;
mod vk_ctx_buffers;
mod vk_ctx_command_buffers;
mod vk_ctx_device;
mod vk_ctx_initialize;
mod vk_ctx_pipelines;
mod vk_ctx_swapchain;

pub use init_error::*;
pub use vk_ctx::*;
pub use vk_ctx_buffers::*;
pub use vk_ctx_command_buffers::*;
pub use vk_ctx_device::*;
pub use vk_ctx_initialize::*;
pub use vk_ctx_pipelines::*;
pub use vk_ctx_swapchain::*;
