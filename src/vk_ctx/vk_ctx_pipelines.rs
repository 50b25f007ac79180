use log::info;

use ash;
use ash::prelude::VkResult;
use ash::vk;

use crate::scene::TriangleVertex;
use crate::vk_utils::{
  create_graphics_pipeline, create_present_render_pass, ShaderCode, VertexInputDesc,
};

/// Render pass and pipeline depend on the swapchain format only.
/// They survive swapchain rebuilds unless the format changes.
pub struct VkCtxPipelines {
  pub pipeline_cache: vk::PipelineCache,
  pub descriptor_set_layout: vk::DescriptorSetLayout,
  pub pipeline_layout: vk::PipelineLayout,
  pub shaders: Vec<ShaderCode>,
  /// `None` till the first swapchain is created
  pub format: Option<vk::Format>,
  pub render_pass: vk::RenderPass,
  pub pipeline_triangle: vk::Pipeline,
}

impl VkCtxPipelines {
  /// Recreate render pass and pipeline if `format` differs from the current one.
  /// Nothing may still use the old ones.
  pub fn ensure_format(&mut self, device: &ash::Device, format: vk::Format) -> VkResult<()> {
    if self.format == Some(format) {
      return Ok(());
    }

    let render_pass = create_present_render_pass(device, format)?;
    let bindings = TriangleVertex::get_bindings_descriptions();
    let attributes = TriangleVertex::get_attributes_descriptions();
    let vertex_desc = VertexInputDesc {
      bindings: &bindings,
      attributes: &attributes,
    };
    let pipeline = create_graphics_pipeline(
      device,
      self.pipeline_cache,
      render_pass,
      self.pipeline_layout,
      &self.shaders,
      &vertex_desc,
    );
    let pipeline = match pipeline {
      Ok(p) => p,
      Err(err) => {
        unsafe { device.destroy_render_pass(render_pass, None) };
        return Err(err);
      }
    };

    unsafe { self.destroy_format_dependent(device) };
    info!("Render pass and pipeline created for {:?}", format);
    self.render_pass = render_pass;
    self.pipeline_triangle = pipeline;
    self.format = Some(format);
    Ok(())
  }

  unsafe fn destroy_format_dependent(&mut self, device: &ash::Device) {
    // null handles are ignored by vkDestroy*
    device.destroy_pipeline(self.pipeline_triangle, None);
    device.destroy_render_pass(self.render_pass, None);
    self.pipeline_triangle = vk::Pipeline::null();
    self.render_pass = vk::RenderPass::null();
    self.format = None;
  }

  pub unsafe fn destroy(&mut self, device: &ash::Device) {
    self.destroy_format_dependent(device);
    device.destroy_pipeline_layout(self.pipeline_layout, None);
    device.destroy_descriptor_set_layout(self.descriptor_set_layout, None);
    device.destroy_pipeline_cache(self.pipeline_cache, None);
  }
}
