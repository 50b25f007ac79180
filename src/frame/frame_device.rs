use ash::prelude::VkResult;
use ash::vk;

use super::CommandSequence;

/// Handles of one frame slot that take part in a single submission.
#[derive(Debug, Clone, Copy)]
pub struct FrameSubmitInfo {
  pub command_buffer: vk::CommandBuffer,
  pub wait_semaphore: vk::Semaphore,
  pub wait_stage: vk::PipelineStageFlags,
  pub signal_semaphore: vk::Semaphore,
  pub fence: vk::Fence,
}

/// What the surface currently allows for swapchain creation.
#[derive(Debug, Clone)]
pub struct SurfaceSupport {
  pub capabilities: vk::SurfaceCapabilitiesKHR,
  pub formats: Vec<vk::SurfaceFormatKHR>,
  pub present_modes: Vec<vk::PresentModeKHR>,
}

/// Parameters picked for a new swapchain.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainDesc {
  pub surface_format: vk::SurfaceFormatKHR,
  pub present_mode: vk::PresentModeKHR,
  pub extent: vk::Extent2D,
  pub image_count: u32,
  pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

/// View and framebuffer for a single swapchain image.
#[derive(Debug, Clone, Copy)]
pub struct RenderTarget {
  /// Owned by the swapchain
  pub image: vk::Image,
  pub image_view: vk::ImageView,
  pub framebuffer: vk::Framebuffer,
}

/// Per-image render targets plus the render pass/pipeline they were created for.
/// Indexed by acquired image index, never by frame slot.
#[derive(Debug, Clone)]
pub struct RenderTargetSet {
  pub render_pass: vk::RenderPass,
  pub pipeline: vk::Pipeline,
  pub format: vk::Format,
  pub extent: vk::Extent2D,
  pub targets: Vec<RenderTarget>,
}

impl RenderTargetSet {
  pub fn len(&self) -> usize {
    self.targets.len()
  }
}

/// Synchronization, recording and queue operations used by the frame loop.
pub trait FrameDevice {
  fn create_semaphore(&mut self) -> VkResult<vk::Semaphore>;
  /// Created signaled, so the very first wait on it returns immediately
  fn create_fence(&mut self) -> VkResult<vk::Fence>;
  fn allocate_command_buffer(&mut self) -> VkResult<vk::CommandBuffer>;
  fn destroy_semaphore(&mut self, semaphore: vk::Semaphore);
  fn destroy_fence(&mut self, fence: vk::Fence);
  fn free_command_buffer(&mut self, command_buffer: vk::CommandBuffer);

  fn wait_for_fence(&mut self, fence: vk::Fence, timeout: u64) -> VkResult<()>;
  fn reset_fence(&mut self, fence: vk::Fence) -> VkResult<()>;

  /// `Ok((image_index, suboptimal))`
  fn acquire_next_image(
    &mut self,
    swapchain: vk::SwapchainKHR,
    timeout: u64,
    signal_semaphore: vk::Semaphore,
  ) -> VkResult<(u32, bool)>;

  /// Update per-slot data (uniform buffers) before the slot's commands are recorded.
  /// Slot's fence was already waited on, so nothing on the GPU reads this data.
  fn prepare_frame(&mut self, _slot_index: usize, _extent: vk::Extent2D) -> VkResult<()> {
    Ok(())
  }

  /// Reset `command_buffer` and write `commands` into it
  fn record_commands(
    &mut self,
    command_buffer: vk::CommandBuffer,
    commands: &CommandSequence,
  ) -> VkResult<()>;

  fn queue_submit(&mut self, info: &FrameSubmitInfo) -> VkResult<()>;

  /// `Ok(suboptimal)`
  fn queue_present(
    &mut self,
    swapchain: vk::SwapchainKHR,
    image_index: u32,
    wait_semaphore: vk::Semaphore,
  ) -> VkResult<bool>;

  fn device_wait_idle(&mut self) -> VkResult<()>;
}

/// Surface queries and swapchain dependent resources.
pub trait SwapchainDevice {
  /// Current size of the window's drawable area. Zero if minimized.
  fn drawable_extent(&mut self) -> vk::Extent2D;

  fn surface_support(&mut self) -> VkResult<SurfaceSupport>;

  /// Returns new swapchain and its images
  fn create_swapchain(
    &mut self,
    desc: &SwapchainDesc,
  ) -> VkResult<(vk::SwapchainKHR, Vec<vk::Image>)>;

  /// Also releases swapchain images
  fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR);

  /// Create view and framebuffer for every image. Either all targets are
  /// created or none (partial results are destroyed before returning the error).
  fn create_render_targets(
    &mut self,
    desc: &SwapchainDesc,
    images: &[vk::Image],
  ) -> VkResult<RenderTargetSet>;

  fn destroy_render_targets(&mut self, targets: RenderTargetSet);
}

/// Everything the frame scheduler needs from a device.
pub trait RenderDevice: FrameDevice + SwapchainDevice {}

impl<T: FrameDevice + SwapchainDevice> RenderDevice for T {}
