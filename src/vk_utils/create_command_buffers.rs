use ash::prelude::VkResult;
use ash::vk;

pub fn create_command_buffers(
  device: &ash::Device,
  cmd_pool: vk::CommandPool,
  count: u32,
) -> VkResult<Vec<vk::CommandBuffer>> {
  let cmd_buf_create_info = vk::CommandBufferAllocateInfo::builder()
    .command_buffer_count(count)
    .command_pool(cmd_pool)
    .level(vk::CommandBufferLevel::PRIMARY)
    .build();

  unsafe { device.allocate_command_buffers(&cmd_buf_create_info) }
}

/// Prepare command buffer for recording. Also resets command buffer.
pub fn begin_command_buffer_for_one_time_submit(
  device: &ash::Device,
  cmd_buf: vk::CommandBuffer,
) -> VkResult<()> {
  // We will rerecord cmds before next submit
  let cmd_buf_begin_info = vk::CommandBufferBeginInfo::builder()
    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)
    .build();
  unsafe {
    device.reset_command_buffer(cmd_buf, vk::CommandBufferResetFlags::empty())?;
    device.begin_command_buffer(cmd_buf, &cmd_buf_begin_info)
  }
}
