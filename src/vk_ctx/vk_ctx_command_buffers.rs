use ash;
use ash::prelude::VkResult;
use ash::vk;

use crate::frame::{CommandSequence, RenderCommand};
use crate::vk_utils::{begin_command_buffer_for_one_time_submit, create_viewport};

pub struct VkCtxCommandBuffers {
  /// Created with RESET_COMMAND_BUFFER, each frame slot resets its own buffer
  pub pool: vk::CommandPool,
}

impl VkCtxCommandBuffers {
  /// Also frees all command buffers allocated from the pool
  pub unsafe fn destroy(&self, device: &ash::Device) {
    device.destroy_command_pool(self.pool, None);
  }
}

/// Reset `cmd_buf` and write `commands` into it
pub fn record_command_sequence(
  device: &ash::Device,
  cmd_buf: vk::CommandBuffer,
  commands: &CommandSequence,
) -> VkResult<()> {
  begin_command_buffer_for_one_time_submit(device, cmd_buf)?;
  for command in commands.commands() {
    unsafe { encode_command(device, cmd_buf, command) };
  }
  unsafe { device.end_command_buffer(cmd_buf) }
}

unsafe fn encode_command(device: &ash::Device, cmd_buf: vk::CommandBuffer, command: &RenderCommand) {
  match *command {
    RenderCommand::BeginRenderPass {
      render_pass,
      framebuffer,
      render_area,
      clear_color,
    } => {
      let clear_values = [vk::ClearValue {
        color: vk::ClearColorValue {
          float32: clear_color,
        },
      }];
      let render_pass_begin_info = vk::RenderPassBeginInfo::builder()
        .render_pass(render_pass)
        .framebuffer(framebuffer)
        .render_area(render_area)
        .clear_values(&clear_values)
        .build();
      device.cmd_begin_render_pass(
        cmd_buf,
        &render_pass_begin_info,
        vk::SubpassContents::INLINE,
      );
    }
    RenderCommand::BindPipeline(pipeline) => {
      device.cmd_bind_pipeline(cmd_buf, vk::PipelineBindPoint::GRAPHICS, pipeline);
    }
    RenderCommand::SetViewport(extent) => {
      device.cmd_set_viewport(cmd_buf, 0, &[create_viewport(&extent)]);
    }
    RenderCommand::SetScissor(rect) => {
      device.cmd_set_scissor(cmd_buf, 0, &[rect]);
    }
    RenderCommand::BindVertexBuffer { buffer, offset } => {
      device.cmd_bind_vertex_buffers(cmd_buf, 0, &[buffer], &[offset]);
    }
    RenderCommand::BindIndexBuffer { buffer, index_type } => {
      device.cmd_bind_index_buffer(cmd_buf, buffer, 0, index_type);
    }
    RenderCommand::BindDescriptorSet { layout, set } => {
      device.cmd_bind_descriptor_sets(
        cmd_buf,
        vk::PipelineBindPoint::GRAPHICS,
        layout,
        0,
        &[set],
        &[],
      );
    }
    RenderCommand::Draw { vertex_count } => {
      device.cmd_draw(cmd_buf, vertex_count, 1, 0, 0);
    }
    RenderCommand::DrawIndexed { index_count } => {
      device.cmd_draw_indexed(cmd_buf, index_count, 1, 0, 0, 0);
    }
    RenderCommand::EndRenderPass => {
      device.cmd_end_render_pass(cmd_buf);
    }
  }
}
