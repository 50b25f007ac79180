use log::trace;

use ash;
use ash::prelude::VkResult;
use ash::vk;

use super::{create_shader_stage, ShaderCode};

pub fn create_pipeline_cache(device: &ash::Device) -> VkResult<vk::PipelineCache> {
  let create_info = vk::PipelineCacheCreateInfo::builder().build();
  unsafe { device.create_pipeline_cache(&create_info, None) }
}

pub fn create_pipeline_layout(
  device: &ash::Device,
  uniform_layouts: &[vk::DescriptorSetLayout],
  push_constant_ranges: &[vk::PushConstantRange],
) -> VkResult<vk::PipelineLayout> {
  let create_info = vk::PipelineLayoutCreateInfo::builder()
    .set_layouts(uniform_layouts)
    .push_constant_ranges(push_constant_ranges)
    .build();
  unsafe { device.create_pipeline_layout(&create_info, None) }
}

/// Vertex layout for `create_graphics_pipeline`
pub struct VertexInputDesc<'a> {
  pub bindings: &'a [vk::VertexInputBindingDescription],
  pub attributes: &'a [vk::VertexInputAttributeDescription],
}

/// Opaque triangles into a single color attachment, viewport and scissor are dynamic.
/// Shader modules only live for the duration of this call.
pub fn create_graphics_pipeline(
  device: &ash::Device,
  pipeline_cache: vk::PipelineCache,
  render_pass: vk::RenderPass,
  pipeline_layout: vk::PipelineLayout,
  shaders: &[ShaderCode],
  vertex_desc: &VertexInputDesc,
) -> VkResult<vk::Pipeline> {
  let mut modules = Vec::with_capacity(shaders.len());
  let mut stages = Vec::with_capacity(shaders.len());
  for shader in shaders {
    match create_shader_stage(device, shader) {
      Ok((module, stage)) => {
        modules.push(module);
        stages.push(stage);
      }
      Err(err) => {
        destroy_shader_modules(device, &modules);
        return Err(err);
      }
    }
  }

  let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::builder()
    .vertex_binding_descriptions(vertex_desc.bindings)
    .vertex_attribute_descriptions(vertex_desc.attributes)
    .build();
  let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
  let dynamic_state = ps_dynamic_state(&dynamic_states);
  let input_assembly_state = ps_ia_triangle_list();
  let viewport_state = ps_viewport_single_dynamic();
  let rasterization_state = ps_raster_polygons(vk::CullModeFlags::NONE);
  let multisample_state = ps_multisample_disabled();
  let depth_stencil_state = ps_depth_always_stencil_always();
  let color_attachments = [ps_color_attachment_write_all()];
  let color_blend_state = vk::PipelineColorBlendStateCreateInfo::builder()
    .attachments(&color_attachments)
    .build();

  let create_info = vk::GraphicsPipelineCreateInfo::builder()
    .stages(&stages)
    .vertex_input_state(&vertex_input_state)
    .input_assembly_state(&input_assembly_state)
    .viewport_state(&viewport_state)
    .rasterization_state(&rasterization_state)
    .multisample_state(&multisample_state)
    .depth_stencil_state(&depth_stencil_state)
    .color_blend_state(&color_blend_state)
    .dynamic_state(&dynamic_state)
    .layout(pipeline_layout)
    .render_pass(render_pass)
    .build();

  let pipelines =
    unsafe { device.create_graphics_pipelines(pipeline_cache, &[create_info], None) };
  destroy_shader_modules(device, &modules);

  match pipelines {
    Ok(ps) => {
      trace!("Graphics pipeline created");
      ps.first()
        .copied()
        .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
    }
    Err((_, err)) => Err(err),
  }
}

fn destroy_shader_modules(device: &ash::Device, modules: &[vk::ShaderModule]) {
  for module in modules {
    unsafe { device.destroy_shader_module(*module, None) };
  }
}

// This file contains presets for `vk::GraphicsPipelineCreateInfo`.
// Most common options, so it's actually manageable and <100LOC every time

/// PipelineInputAssembly-TRIANGLE_LIST
pub fn ps_ia_triangle_list() -> vk::PipelineInputAssemblyStateCreateInfo {
  vk::PipelineInputAssemblyStateCreateInfo::builder()
    .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
    .build()
}

/// Does not specify dimensions during pipeline create, requires PipelineDynamicStateCreateInfo with
/// - vk::DynamicState::VIEWPORT
/// - vk::DynamicState::SCISSOR
pub fn ps_viewport_single_dynamic() -> vk::PipelineViewportStateCreateInfo {
  vk::PipelineViewportStateCreateInfo {
    viewport_count: 1,
    scissor_count: 1,
    ..Default::default()
  }
}

pub fn ps_raster_polygons(
  cull_mode: vk::CullModeFlags,
) -> vk::PipelineRasterizationStateCreateInfo {
  vk::PipelineRasterizationStateCreateInfo::builder()
    .depth_clamp_enable(false)
    .polygon_mode(vk::PolygonMode::FILL)
    .cull_mode(cull_mode)
    .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
    .line_width(1.0) // validation layers: has to be 1.0 if not dynamic
    .build()
}

/// - Depth: test SKIP, write OFF
/// - Stencil: test SKIP
pub fn ps_depth_always_stencil_always() -> vk::PipelineDepthStencilStateCreateInfo {
  vk::PipelineDepthStencilStateCreateInfo::builder()
    .depth_test_enable(false)
    .depth_write_enable(false)
    .depth_compare_op(vk::CompareOp::LESS)
    .depth_bounds_test_enable(false)
    .stencil_test_enable(false)
    .build()
}

pub fn ps_multisample_disabled() -> vk::PipelineMultisampleStateCreateInfo {
  vk::PipelineMultisampleStateCreateInfo::builder()
    .rasterization_samples(vk::SampleCountFlags::TYPE_1)
    .sample_shading_enable(false)
    .build()
}

/// Write result to color attachment, disable blending
pub fn ps_color_attachment_write_all() -> vk::PipelineColorBlendAttachmentState {
  vk::PipelineColorBlendAttachmentState::builder()
    .color_write_mask(vk::ColorComponentFlags::RGBA)
    .blend_enable(false)
    .src_color_blend_factor(vk::BlendFactor::ONE) // shader output
    .dst_color_blend_factor(vk::BlendFactor::ZERO) // existing value on destination attachment
    .src_alpha_blend_factor(vk::BlendFactor::ONE)
    .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
    .build()
}

/// List of things that will be provided as separate command before draw (actuall 'runtime').
/// Used so that we do not have to specify everything during pipeline create
pub fn ps_dynamic_state(states: &[vk::DynamicState]) -> vk::PipelineDynamicStateCreateInfo {
  vk::PipelineDynamicStateCreateInfo::builder()
    .dynamic_states(states)
    .build()
}
