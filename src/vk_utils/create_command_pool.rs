use ash::prelude::VkResult;
use ash::vk;

/// Command buffers from this pool can be reset one by one
pub fn create_command_pool(
  device: &ash::Device,
  queue_family_index: u32,
) -> VkResult<vk::CommandPool> {
  // vk::CommandPoolCreateFlags::TRANSIENT - we are not short lived at all
  let cmd_pool_create_info = vk::CommandPoolCreateInfo::builder()
    .queue_family_index(queue_family_index)
    .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
    .build();

  unsafe { device.create_command_pool(&cmd_pool_create_info, None) }
}
