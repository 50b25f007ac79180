// Frame loop: per-frame slots, swapchain recreation, command recording
// and the scheduler tying them together. Talks to the GPU only through
// the traits in `frame_device`.
mod command_recorder;
mod frame_device;
mod frame_error;
mod frame_scheduler;
mod frame_slot_pool;
mod resize_signal;
mod swapchain_lifecycle;

#[cfg(test)]
pub mod test_device;

pub use self::command_recorder::*;
pub use self::frame_device::*;
pub use self::frame_error::*;
pub use self::frame_scheduler::*;
pub use self::frame_slot_pool::*;
pub use self::resize_signal::*;
pub use self::swapchain_lifecycle::*;
