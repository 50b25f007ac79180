use ash;
use ash::vk;

use crate::vk_utils::QueueFamilies;

pub struct VkCtxDevice {
  pub phys_device: vk::PhysicalDevice,
  pub queue_families: QueueFamilies,
  pub device: ash::Device,
  pub graphics_queue: vk::Queue,
  pub present_queue: vk::Queue,
}

impl VkCtxDevice {
  /// All objects created from this device have to be destroyed already
  pub unsafe fn destroy(&self) {
    self.device.destroy_device(None);
  }
}
