use log::{debug, info, trace, warn};

use ash;
use ash::extensions::ext::DebugUtils;
use ash::prelude::VkResult;
use ash::vk;
use gpu_allocator::vulkan::Allocator;
use winit::window::Window;

use super::*;
use crate::app_timer::AppTimer;
use crate::config::Config;
use crate::frame::{CommandSequence, FrameDevice, FrameSubmitInfo};
use crate::scene::SceneUniformBuffer;
use crate::vk_utils::{create_command_buffers, create_fence, create_semaphore};

/** Kitchen sink for Vulkan stuff */
pub struct VkCtx {
  pub entry: ash::Entry,
  pub instance: ash::Instance,
  pub swapchain: VkCtxSwapchain,
  pub device: VkCtxDevice,
  pub command_buffers: VkCtxCommandBuffers,
  pub pipelines: VkCtxPipelines,
  pub buffers: VkCtxBuffers,
  /// Always `Some` till drop. Has to go before the device does.
  pub allocator: Option<Allocator>,

  // debug
  pub debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,

  pub timer: AppTimer,
  pub config: Config,
  /// Dropped after all Vulkan objects, surface included
  pub window: Window,
}

impl VkCtx {
  pub fn frames_in_flight(&self) -> usize {
    self.buffers.scene_uniform_buffers.len()
  }

  fn log_frame_time(&self) {
    let frame = self.timer.frame_count();
    let interval = self.config.frame_time_log_interval;
    if interval > 0 && frame % interval == 0 {
      debug!(
        "Frame {}: {:.2}ms average frame time",
        frame,
        self.timer.delta_time_ms()
      );
    }
  }
}

/// Slot indices come from the scheduler and are always below `frames_in_flight`
fn slot_resource<T>(resources: &mut [T], slot_index: usize) -> &mut T {
  let slot_count = resources.len();
  resources.get_mut(slot_index).unwrap_or_else(|| {
    panic!(
      "Requested resource for {}th frame slot, there are only {}",
      slot_index, slot_count
    )
  })
}

impl FrameDevice for VkCtx {
  fn create_semaphore(&mut self) -> VkResult<vk::Semaphore> {
    create_semaphore(&self.device.device)
  }

  fn create_fence(&mut self) -> VkResult<vk::Fence> {
    create_fence(&self.device.device)
  }

  fn allocate_command_buffer(&mut self) -> VkResult<vk::CommandBuffer> {
    let cmd_bufs = create_command_buffers(&self.device.device, self.command_buffers.pool, 1)?;
    cmd_bufs
      .first()
      .copied()
      .ok_or(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY)
  }

  fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
    unsafe { self.device.device.destroy_semaphore(semaphore, None) };
  }

  fn destroy_fence(&mut self, fence: vk::Fence) {
    unsafe { self.device.device.destroy_fence(fence, None) };
  }

  fn free_command_buffer(&mut self, command_buffer: vk::CommandBuffer) {
    unsafe {
      self
        .device
        .device
        .free_command_buffers(self.command_buffers.pool, &[command_buffer])
    };
  }

  fn wait_for_fence(&mut self, fence: vk::Fence, timeout: u64) -> VkResult<()> {
    unsafe { self.device.device.wait_for_fences(&[fence], true, timeout) }
  }

  fn reset_fence(&mut self, fence: vk::Fence) -> VkResult<()> {
    unsafe { self.device.device.reset_fences(&[fence]) }
  }

  fn acquire_next_image(
    &mut self,
    swapchain: vk::SwapchainKHR,
    timeout: u64,
    signal_semaphore: vk::Semaphore,
  ) -> VkResult<(u32, bool)> {
    unsafe {
      self.swapchain.swapchain_loader.acquire_next_image(
        swapchain,
        timeout,
        signal_semaphore,
        vk::Fence::null(),
      )
    }
  }

  /// Writes scene uniforms of this slot
  fn prepare_frame(&mut self, slot_index: usize, extent: vk::Extent2D) -> VkResult<()> {
    self.timer.mark_start_frame();
    self.log_frame_time();

    let ubo = SceneUniformBuffer::new(self.timer.elapsed_secs(), extent, &self.config);
    let buffer = slot_resource(&mut self.buffers.scene_uniform_buffers, slot_index);
    buffer.write_to_mapped(bytemuck::bytes_of(&ubo));
    Ok(())
  }

  fn record_commands(
    &mut self,
    command_buffer: vk::CommandBuffer,
    commands: &CommandSequence,
  ) -> VkResult<()> {
    trace!("Recording {} commands", commands.len());
    record_command_sequence(&self.device.device, command_buffer, commands)
  }

  fn queue_submit(&mut self, info: &FrameSubmitInfo) -> VkResult<()> {
    let wait_semaphores = [info.wait_semaphore];
    let wait_stages = [info.wait_stage];
    let command_buffers = [info.command_buffer];
    let signal_semaphores = [info.signal_semaphore];
    let submit_info = vk::SubmitInfo::builder()
      .wait_semaphores(&wait_semaphores)
      .wait_dst_stage_mask(&wait_stages)
      .command_buffers(&command_buffers)
      .signal_semaphores(&signal_semaphores)
      .build();

    unsafe {
      self
        .device
        .device
        .queue_submit(self.device.graphics_queue, &[submit_info], info.fence)
    }
  }

  fn queue_present(
    &mut self,
    swapchain: vk::SwapchainKHR,
    image_index: u32,
    wait_semaphore: vk::Semaphore,
  ) -> VkResult<bool> {
    let wait_semaphores = [wait_semaphore];
    let swapchains = [swapchain];
    let image_indices = [image_index];
    let present_info = vk::PresentInfoKHR::builder()
      .wait_semaphores(&wait_semaphores)
      .swapchains(&swapchains)
      .image_indices(&image_indices)
      .build();

    unsafe {
      self
        .swapchain
        .swapchain_loader
        .queue_present(self.device.present_queue, &present_info)
    }
  }

  fn device_wait_idle(&mut self) -> VkResult<()> {
    unsafe { self.device.device.device_wait_idle() }
  }
}

impl Drop for VkCtx {
  fn drop(&mut self) {
    info!("VkCtx::destroy()");
    unsafe {
      let device = &self.device.device;
      if let Err(err) = device.device_wait_idle() {
        warn!("device_wait_idle before destroy failed: {}", err);
      }

      if let Some(mut allocator) = self.allocator.take() {
        self.buffers.destroy(device, &mut allocator);
        // frees device memory, needs live device
        drop(allocator);
      }
      self.pipelines.destroy(device);
      self.command_buffers.destroy(device);
      self.device.destroy();

      self.swapchain.destroy_surface();
      if let Some((debug_utils_loader, debug_messenger)) = self.debug_utils.take() {
        debug_utils_loader.destroy_debug_utils_messenger(debug_messenger, None);
      }
      self.instance.destroy_instance(None);
    }
    info!("VkCtx::destroy() finished");
  }
}
