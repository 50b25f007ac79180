use ash::vk;

use super::RenderTargetSet;
use crate::vk_utils::size_to_rect_vk;

/// Single GPU command, in the order it will be written to a command buffer.
/// Encoding to the real `vk::CommandBuffer` is done by the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
  BeginRenderPass {
    render_pass: vk::RenderPass,
    framebuffer: vk::Framebuffer,
    render_area: vk::Rect2D,
    clear_color: [f32; 4],
  },
  BindPipeline(vk::Pipeline),
  /// Y-flipped viewport covering the whole extent
  SetViewport(vk::Extent2D),
  SetScissor(vk::Rect2D),
  BindVertexBuffer {
    buffer: vk::Buffer,
    offset: vk::DeviceSize,
  },
  BindIndexBuffer {
    buffer: vk::Buffer,
    index_type: vk::IndexType,
  },
  BindDescriptorSet {
    layout: vk::PipelineLayout,
    set: vk::DescriptorSet,
  },
  Draw {
    vertex_count: u32,
  },
  DrawIndexed {
    index_count: u32,
  },
  EndRenderPass,
}

/// Commands of a single frame. Owned by a frame slot and cleared (not reallocated)
/// every time the slot is reused.
#[derive(Debug, Default)]
pub struct CommandSequence {
  commands: Vec<RenderCommand>,
}

impl CommandSequence {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn reset(&mut self) {
    self.commands.clear();
  }

  pub fn push(&mut self, cmd: RenderCommand) {
    self.commands.push(cmd);
  }

  pub fn commands(&self) -> &[RenderCommand] {
    &self.commands
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

}

/// Index buffer and its element type
#[derive(Debug, Clone, Copy)]
pub struct IndexBinding {
  pub buffer: vk::Buffer,
  pub index_type: vk::IndexType,
}

/// Everything bound for the draw that does not depend on the swapchain.
/// Pipeline and render pass come from the current `RenderTargetSet`.
#[derive(Debug, Clone)]
pub struct DrawBindings {
  pub pipeline_layout: vk::PipelineLayout,
  pub vertex_buffer: vk::Buffer,
  pub index_buffer: Option<IndexBinding>,
  /// Index count if `index_buffer` is set, vertex count otherwise
  pub element_count: u32,
  /// One per frame slot. Empty if the pipeline uses no descriptors.
  pub descriptor_sets: Vec<vk::DescriptorSet>,
  pub clear_color: [f32; 4],
}

pub struct CommandRecorder {
  bindings: DrawBindings,
}

impl CommandRecorder {
  pub fn new(bindings: DrawBindings) -> Self {
    Self { bindings }
  }

  /// Fill `out` with the commands that draw the scene into swapchain image `image_index`.
  /// Previous content of `out` is discarded, its allocation is kept.
  pub fn record(
    &self,
    slot_index: usize,
    targets: &RenderTargetSet,
    image_index: u32,
    out: &mut CommandSequence,
  ) {
    let target = &targets.targets[image_index as usize];
    let bindings = &self.bindings;
    let render_area = size_to_rect_vk(&targets.extent);
    out.reset();

    out.push(RenderCommand::BeginRenderPass {
      render_pass: targets.render_pass,
      framebuffer: target.framebuffer,
      render_area,
      clear_color: bindings.clear_color,
    });
    out.push(RenderCommand::BindPipeline(targets.pipeline));
    out.push(RenderCommand::SetViewport(targets.extent));
    out.push(RenderCommand::SetScissor(render_area));
    out.push(RenderCommand::BindVertexBuffer {
      buffer: bindings.vertex_buffer,
      offset: 0,
    });
    if let Some(index_buffer) = bindings.index_buffer {
      out.push(RenderCommand::BindIndexBuffer {
        buffer: index_buffer.buffer,
        index_type: index_buffer.index_type,
      });
    }
    if let Some(&set) = bindings.descriptor_sets.get(slot_index) {
      out.push(RenderCommand::BindDescriptorSet {
        layout: bindings.pipeline_layout,
        set,
      });
    }
    match bindings.index_buffer {
      Some(_) => out.push(RenderCommand::DrawIndexed {
        index_count: bindings.element_count,
      }),
      None => out.push(RenderCommand::Draw {
        vertex_count: bindings.element_count,
      }),
    }
    out.push(RenderCommand::EndRenderPass);
  }
}
