use ash::vk;
use gpu_allocator::vulkan::Allocator;

use crate::vk_utils::VkBuffer;

pub struct VkCtxBuffers {
  pub quad_vertex_buffer: VkBuffer,
  pub quad_index_buffer: VkBuffer,
  pub index_count: u32,
  /// One per frame slot, persistently mapped
  pub scene_uniform_buffers: Vec<VkBuffer>,
  pub descriptor_pool: vk::DescriptorPool,
  /// One per frame slot, `descriptor_sets[i]` points to `scene_uniform_buffers[i]`
  pub descriptor_sets: Vec<vk::DescriptorSet>,
}

impl VkCtxBuffers {
  pub unsafe fn destroy(&mut self, device: &ash::Device, allocator: &mut Allocator) {
    // also frees descriptor sets
    device.destroy_descriptor_pool(self.descriptor_pool, None);
    self.descriptor_sets.clear();

    self.quad_vertex_buffer.delete(device, allocator);
    self.quad_index_buffer.delete(device, allocator);
    for buffer in &mut self.scene_uniform_buffers {
      buffer.delete(device, allocator);
    }
  }
}
