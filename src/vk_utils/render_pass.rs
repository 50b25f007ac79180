use ash;
use ash::prelude::VkResult;
use ash::vk;

/// Raw Vulkan objects used to create vk::RenderPass
pub type AttachmentDefinition = (vk::AttachmentDescription, vk::AttachmentReference);

/// Attachment that is cleared on load and ends up ready for `vkQueuePresentKHR`.
/// Content of previous frame is discarded, so initial layout is UNDEFINED.
pub fn create_present_color_attachment(
  attachment_idx: u32,
  image_format: vk::Format,
) -> AttachmentDefinition {
  let attachment = vk::AttachmentDescription::builder()
    .format(image_format)
    .samples(vk::SampleCountFlags::TYPE_1) // single sampled
    .load_op(vk::AttachmentLoadOp::CLEAR)
    .store_op(vk::AttachmentStoreOp::STORE)
    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
    .initial_layout(vk::ImageLayout::UNDEFINED)
    .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
    .build();

  let attachment_reference = vk::AttachmentReference {
    attachment: attachment_idx,
    layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
  };

  (attachment, attachment_reference)
}

/// Single subpass writing to swapchain image.
pub fn create_present_render_pass(
  device: &ash::Device,
  image_format: vk::Format,
) -> VkResult<vk::RenderPass> {
  let (attachment, attachment_ref) = create_present_color_attachment(0, image_format);
  let attachments = [attachment];
  let color_refs = [attachment_ref];

  let subpasses = [vk::SubpassDescription::builder()
    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
    .color_attachments(&color_refs)
    .build()];

  // Layout transition has to wait till presentation engine released the image.
  // We wait on `image_available` semaphore at COLOR_ATTACHMENT_OUTPUT, so same stage here.
  let dependencies = [vk::SubpassDependency::builder()
    .src_subpass(vk::SUBPASS_EXTERNAL)
    .dst_subpass(0)
    .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .src_access_mask(vk::AccessFlags::empty())
    .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
    .build()];

  let create_info = vk::RenderPassCreateInfo::builder()
    .dependencies(&dependencies)
    .attachments(&attachments)
    .subpasses(&subpasses)
    .build();
  unsafe { device.create_render_pass(&create_info, None) }
}
