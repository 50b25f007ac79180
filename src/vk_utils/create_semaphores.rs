use ash::prelude::VkResult;
use ash::vk;

pub fn create_semaphore(device: &ash::Device) -> VkResult<vk::Semaphore> {
  let semaphore_create_info = vk::SemaphoreCreateInfo::builder()
    .flags(vk::SemaphoreCreateFlags::empty())
    .build();
  unsafe { device.create_semaphore(&semaphore_create_info, None) }
}
