// mostly inspired by:
// - https://github.com/zeux/niagara/tree/master/src
// - https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L256
mod create_command_buffers;
mod create_command_pool;
mod create_fences;
mod create_framebuffer;
mod create_image_view;
mod create_semaphores;
mod create_viewport;
mod debug;
mod descriptors;
mod device;
mod load_shader;
mod pipeline;
mod render_pass;
mod swapchain;
mod vk_buffer;

pub use self::create_command_buffers::*;
pub use self::create_command_pool::*;
pub use self::create_fences::*;
pub use self::create_framebuffer::*;
pub use self::create_image_view::*;
pub use self::create_semaphores::*;
pub use self::create_viewport::*;
pub use self::debug::*;
pub use self::descriptors::*;
pub use self::device::*;
pub use self::load_shader::*;
pub use self::pipeline::*;
pub use self::render_pass::*;
pub use self::swapchain::*;
pub use self::vk_buffer::*;
