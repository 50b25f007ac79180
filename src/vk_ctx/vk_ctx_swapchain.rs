use log::trace;

use ash;
use ash::extensions::khr::{Surface, Swapchain};
use ash::prelude::VkResult;
use ash::vk;

use super::VkCtx;
use crate::frame::{RenderTarget, RenderTargetSet, SurfaceSupport, SwapchainDesc, SwapchainDevice};
use crate::vk_utils::{
  create_framebuffer, create_swapchain_image_view, create_swapchain_khr, get_surface_support,
};

/// Surface and swapchain loaders. The swapchain itself is owned by the frame loop.
pub struct VkCtxSwapchain {
  pub surface_loader: Surface,
  pub surface_khr: vk::SurfaceKHR,
  pub swapchain_loader: Swapchain,
}

impl VkCtxSwapchain {
  pub unsafe fn destroy_surface(&self) {
    self.surface_loader.destroy_surface(self.surface_khr, None);
  }
}

unsafe fn destroy_render_target(device: &ash::Device, target: &RenderTarget) {
  device.destroy_framebuffer(target.framebuffer, None);
  device.destroy_image_view(target.image_view, None);
}

fn create_render_target(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  image: vk::Image,
  desc: &SwapchainDesc,
) -> VkResult<RenderTarget> {
  let image_view = create_swapchain_image_view(device, image, desc.surface_format.format)?;
  match create_framebuffer(device, render_pass, &[image_view], &desc.extent) {
    Ok(framebuffer) => Ok(RenderTarget {
      image,
      image_view,
      framebuffer,
    }),
    Err(err) => {
      unsafe { device.destroy_image_view(image_view, None) };
      Err(err)
    }
  }
}

impl SwapchainDevice for VkCtx {
  fn drawable_extent(&mut self) -> vk::Extent2D {
    let size = self.window.inner_size();
    vk::Extent2D {
      width: size.width,
      height: size.height,
    }
  }

  fn surface_support(&mut self) -> VkResult<SurfaceSupport> {
    get_surface_support(
      &self.swapchain.surface_loader,
      self.swapchain.surface_khr,
      self.device.phys_device,
    )
  }

  fn create_swapchain(
    &mut self,
    desc: &SwapchainDesc,
  ) -> VkResult<(vk::SwapchainKHR, Vec<vk::Image>)> {
    let loader = &self.swapchain.swapchain_loader;
    let queue_family_indices = self.device.queue_families.unique();
    let swapchain = create_swapchain_khr(
      loader,
      self.swapchain.surface_khr,
      desc,
      &queue_family_indices,
    )?;

    // VK_OBJECT_TYPE_IMAGE; is a presentable image and it is controlled by the
    // implementation and is destroyed with vkDestroySwapchainKHR.
    match unsafe { loader.get_swapchain_images(swapchain) } {
      Ok(images) => {
        trace!("Swapchain has {} images", images.len());
        Ok((swapchain, images))
      }
      Err(err) => {
        unsafe { loader.destroy_swapchain(swapchain, None) };
        Err(err)
      }
    }
  }

  fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
    unsafe {
      self
        .swapchain
        .swapchain_loader
        .destroy_swapchain(swapchain, None)
    };
  }

  fn create_render_targets(
    &mut self,
    desc: &SwapchainDesc,
    images: &[vk::Image],
  ) -> VkResult<RenderTargetSet> {
    let device = &self.device.device;
    self
      .pipelines
      .ensure_format(device, desc.surface_format.format)?;
    let render_pass = self.pipelines.render_pass;

    let mut targets = Vec::with_capacity(images.len());
    for &image in images {
      match create_render_target(device, render_pass, image, desc) {
        Ok(target) => targets.push(target),
        Err(err) => {
          for target in &targets {
            unsafe { destroy_render_target(device, target) };
          }
          return Err(err);
        }
      }
    }

    Ok(RenderTargetSet {
      render_pass,
      pipeline: self.pipelines.pipeline_triangle,
      format: desc.surface_format.format,
      extent: desc.extent,
      targets,
    })
  }

  /// Render pass and pipeline stay, they belong to `VkCtxPipelines`
  fn destroy_render_targets(&mut self, targets: RenderTargetSet) {
    let device = &self.device.device;
    for target in &targets.targets {
      unsafe { destroy_render_target(device, target) };
    }
  }
}
