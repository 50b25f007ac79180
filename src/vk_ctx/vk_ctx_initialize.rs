use log::{info, trace};

use ash;
use ash::extensions::khr::{Surface, Swapchain};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use gpu_allocator::{AllocationSizes, AllocatorDebugSettings, MemoryLocation};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use winit::window::Window;

use super::*;
use crate::app_timer::AppTimer;
use crate::config::Config;
use crate::frame::{DrawBindings, IndexBinding};
use crate::scene::{SceneUniformBuffer, QUAD_INDICES, QUAD_VERTICES};
use crate::vk_utils::*;

fn load_shaders(config: &Config) -> Result<Vec<ShaderCode>, InitError> {
  let stages = [
    (vk::ShaderStageFlags::VERTEX, &config.shader_vert_path),
    (vk::ShaderStageFlags::FRAGMENT, &config.shader_frag_path),
  ];
  stages
    .iter()
    .map(|(stage, path)| {
      read_shader_code(*stage, path).map_err(|source| InitError::Shader {
        path: path.to_string(),
        source,
      })
    })
    .collect()
}

/// Layouts only. Render pass and pipeline wait for the first swapchain format.
fn create_pipelines(device: &ash::Device, config: &Config) -> Result<VkCtxPipelines, InitError> {
  let shaders = load_shaders(config)?;
  let pipeline_cache = create_pipeline_cache(device).map_err(vk_step("create_pipeline_cache"))?;

  let ubo_bindings = [create_ubo_binding(
    SceneUniformBuffer::BINDING_INDEX,
    vk::ShaderStageFlags::VERTEX,
  )];
  let descriptor_set_layout = create_descriptor_set_layout(device, &ubo_bindings)
    .map_err(vk_step("create_descriptor_set_layout"))?;
  let pipeline_layout = create_pipeline_layout(device, &[descriptor_set_layout], &[])
    .map_err(vk_step("create_pipeline_layout"))?;

  Ok(VkCtxPipelines {
    pipeline_cache,
    descriptor_set_layout,
    pipeline_layout,
    shaders,
    format: None,
    render_pass: vk::RenderPass::null(),
    pipeline_triangle: vk::Pipeline::null(),
  })
}

fn create_buffers(
  device: &ash::Device,
  allocator: &mut Allocator,
  descriptor_set_layout: vk::DescriptorSetLayout,
  frames_in_flight: usize,
) -> Result<VkCtxBuffers, InitError> {
  let vertices_bytes: &[u8] = bytemuck::cast_slice(&QUAD_VERTICES);
  let quad_vertex_buffer = VkBuffer::from_data(
    device,
    allocator,
    "quad_vertices",
    vertices_bytes,
    vk::BufferUsageFlags::VERTEX_BUFFER,
  )?;
  let indices_bytes: &[u8] = bytemuck::cast_slice(&QUAD_INDICES);
  let quad_index_buffer = VkBuffer::from_data(
    device,
    allocator,
    "quad_indices",
    indices_bytes,
    vk::BufferUsageFlags::INDEX_BUFFER,
  )?;
  trace!(
    "Quad buffers: {} vertex bytes, {} index bytes",
    vertices_bytes.len(),
    indices_bytes.len()
  );

  let scene_uniform_buffers = (0..frames_in_flight)
    .map(|i| {
      VkBuffer::empty(
        device,
        allocator,
        &format!("scene_ubo_{}", i),
        SceneUniformBuffer::size_bytes(),
        vk::BufferUsageFlags::UNIFORM_BUFFER,
        MemoryLocation::CpuToGpu,
      )
    })
    .collect::<Result<Vec<_>, _>>()?;

  let descriptor_pool = create_ubo_descriptor_pool(device, frames_in_flight as u32)
    .map_err(vk_step("create_descriptor_pool"))?;
  let descriptor_sets =
    allocate_descriptor_sets(device, descriptor_pool, descriptor_set_layout, frames_in_flight)
      .map_err(vk_step("allocate_descriptor_sets"))?;
  for (set, buffer) in descriptor_sets.iter().zip(scene_uniform_buffers.iter()) {
    write_ubo_descriptor(device, *set, SceneUniformBuffer::BINDING_INDEX, buffer);
  }

  Ok(VkCtxBuffers {
    quad_vertex_buffer,
    quad_index_buffer,
    index_count: QUAD_INDICES.len() as u32,
    scene_uniform_buffers,
    descriptor_pool,
    descriptor_sets,
  })
}

// https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L332
pub fn vk_ctx_initialize(window: Window, config: Config) -> Result<VkCtx, InitError> {
  let entry = unsafe { ash::Entry::load()? };
  let display_handle = window.raw_display_handle();
  let instance = create_instance(&entry, display_handle, config.graphics_debugging)
    .map_err(vk_step("create_instance"))?;
  let debug_utils = if config.graphics_debugging {
    Some(setup_debug_reporting(&entry, &instance).map_err(vk_step("setup_debug_reporting"))?)
  } else {
    None
  };

  // surface data
  let surface_loader = Surface::new(&entry, &instance); // I guess some generic OS-independent thing?
  let surface_khr = unsafe {
    ash_window::create_surface(
      &entry,
      &instance,
      display_handle,
      window.raw_window_handle(),
      None,
    )
  }
  .map_err(vk_step("create_surface"))?; // real OS-backed thing

  // devices
  let (phys_device, queue_families) =
    pick_physical_device_and_queue_families(&instance, &surface_loader, surface_khr)
      .map_err(vk_step("pick_physical_device"))?
      .ok_or(InitError::NoSuitableDevice)?;
  let (device, graphics_queue, present_queue) =
    pick_device_and_queues(&instance, phys_device, &queue_families)
      .map_err(vk_step("create_device"))?;
  let swapchain_loader = Swapchain::new(&instance, &device);

  // command buffers
  let cmd_pool =
    create_command_pool(&device, queue_families.graphics).map_err(vk_step("create_command_pool"))?;

  // gpu memory allocator
  let mut allocator = Allocator::new(&AllocatorCreateDesc {
    instance: instance.clone(),
    device: device.clone(),
    physical_device: phys_device,
    debug_settings: AllocatorDebugSettings::default(),
    buffer_device_address: false,
    allocation_sizes: AllocationSizes::default(),
  })
  .map_err(InitError::Allocator)?;

  let pipelines = create_pipelines(&device, &config)?;
  let buffers = create_buffers(
    &device,
    &mut allocator,
    pipelines.descriptor_set_layout,
    config.frames_in_flight,
  )?;
  info!(
    "Vulkan context ready, {} frames in flight",
    config.frames_in_flight
  );

  Ok(VkCtx {
    entry,
    instance,
    swapchain: VkCtxSwapchain {
      surface_loader,
      surface_khr,
      swapchain_loader,
    },
    device: VkCtxDevice {
      phys_device,
      queue_families,
      device,
      graphics_queue,
      present_queue,
    },
    command_buffers: VkCtxCommandBuffers { pool: cmd_pool },
    pipelines,
    buffers,
    allocator: Some(allocator),
    debug_utils,
    timer: AppTimer::new(),
    config,
    window,
  })
}

impl VkCtx {
  /// Quad geometry and per-slot descriptor sets for `CommandRecorder`
  pub fn draw_bindings(&self) -> DrawBindings {
    DrawBindings {
      pipeline_layout: self.pipelines.pipeline_layout,
      vertex_buffer: self.buffers.quad_vertex_buffer.buffer,
      index_buffer: Some(IndexBinding {
        buffer: self.buffers.quad_index_buffer.buffer,
        index_type: vk::IndexType::UINT16,
      }),
      element_count: self.buffers.index_count,
      descriptor_sets: self.buffers.descriptor_sets.clone(),
      clear_color: self.config.clear_color,
    }
  }
}
