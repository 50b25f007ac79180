use ash;
use ash::prelude::VkResult;
use ash::vk;

use crate::vk_utils::VkBuffer;

/*
https://vulkan-tutorial.com/Uniform_buffers/Descriptor_layout_and_buffer <3

You cannot bind a single shader resource to a buffer/texture. You can only bind a group
of resources as descriptor sets.

Steps:
  1. Create descriptor pool. Specify how many descriptors will be allocated
  2. Create descriptor set(s). This are connected to each shader. Each descriptor set
     contains some number of uniform buffers/textures, each assigned a `binding`.
  3. Connect the real data buffer to a (descriptor_set, binding) using `vkUpdateDescriptorSets`.
  4. Bind the descriptor sets before draw call: `vkCmdBindDescriptorSets`.

We keep one descriptor set per frame slot. Each points to that slot's uniform buffer,
so CPU can write slot N+1 while GPU still reads slot N.
*/

/// Create layout for a single uniform buffer object.
/// That layout will be one of layouts gathered in DescriptorSetLayout.
pub fn create_ubo_binding(
  binding: u32,
  stage_flags: vk::ShaderStageFlags,
) -> vk::DescriptorSetLayoutBinding {
  vk::DescriptorSetLayoutBinding::builder()
    .binding(binding)
    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
    .descriptor_count(1)
    .stage_flags(stage_flags)
    .build()
}

pub fn create_descriptor_set_layout(
  device: &ash::Device,
  bindings: &[vk::DescriptorSetLayoutBinding],
) -> VkResult<vk::DescriptorSetLayout> {
  let create_info = vk::DescriptorSetLayoutCreateInfo::builder()
    .bindings(bindings)
    .build();
  unsafe { device.create_descriptor_set_layout(&create_info, None) }
}

/// Pool big enough for `set_count` sets with one UBO each
pub fn create_ubo_descriptor_pool(
  device: &ash::Device,
  set_count: u32,
) -> VkResult<vk::DescriptorPool> {
  let pool_sizes = [vk::DescriptorPoolSize {
    ty: vk::DescriptorType::UNIFORM_BUFFER,
    descriptor_count: set_count,
  }];
  let create_info = vk::DescriptorPoolCreateInfo::builder()
    .max_sets(set_count)
    .pool_sizes(&pool_sizes)
    .build();
  unsafe { device.create_descriptor_pool(&create_info, None) }
}

/// Sets are freed together with the pool
pub fn allocate_descriptor_sets(
  device: &ash::Device,
  pool: vk::DescriptorPool,
  layout: vk::DescriptorSetLayout,
  count: usize,
) -> VkResult<Vec<vk::DescriptorSet>> {
  let layouts = vec![layout; count];
  let alloc_info = vk::DescriptorSetAllocateInfo::builder()
    .descriptor_pool(pool)
    .set_layouts(&layouts)
    .build();
  unsafe { device.allocate_descriptor_sets(&alloc_info) }
}

/// Point `(set, binding)` at the whole buffer
pub fn write_ubo_descriptor(
  device: &ash::Device,
  set: vk::DescriptorSet,
  binding: u32,
  buffer: &VkBuffer,
) {
  // vk::WriteDescriptorSet has POINTERS to this, keep it alive till the update
  let buffer_infos = [vk::DescriptorBufferInfo {
    buffer: buffer.buffer,
    offset: 0,
    range: vk::WHOLE_SIZE,
  }];
  let writes = [vk::WriteDescriptorSet::builder()
    .dst_set(set)
    .dst_binding(binding)
    .dst_array_element(0)
    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
    .buffer_info(&buffer_infos)
    .build()];
  unsafe { device.update_descriptor_sets(&writes, &[]) };
}
