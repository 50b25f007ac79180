use ash::prelude::VkResult;
use ash::vk;

/// Fence starts signaled, so the first wait for it does not block
pub fn create_fence(device: &ash::Device) -> VkResult<vk::Fence> {
  let create_info = vk::FenceCreateInfo::builder()
    .flags(vk::FenceCreateFlags::SIGNALED)
    .build();
  unsafe { device.create_fence(&create_info, None) }
}
