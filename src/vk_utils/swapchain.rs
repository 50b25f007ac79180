use log::trace;

use ash::extensions::khr::{Surface, Swapchain};
use ash::prelude::VkResult;
use ash::vk;

use crate::frame::{SurfaceSupport, SwapchainDesc};

/*
// https://github.com/zeux/niagara/blob/master/src/swapchain.cpp#L78
struct Swapchain
{
  VkSwapchainKHR swapchain;

  std::vector<VkImage> images;

  uint32_t width, height;
  uint32_t imageCount;
};
*/

/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkSurfaceFormatKHR.html
/// 8-bit sRGB if the surface has it, first reported format otherwise.
/// `None` only if the surface reported no formats at all.
pub fn choose_surface_format(
  surface_formats: &[vk::SurfaceFormatKHR],
) -> Option<vk::SurfaceFormatKHR> {
  let srgb = surface_formats.iter().find(|surface_fmt| {
    let fmt_ok = surface_fmt.format == vk::Format::B8G8R8A8_SRGB;
    let color_space_ok = surface_fmt.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR;
    fmt_ok && color_space_ok
  });

  srgb.or_else(|| surface_formats.first()).copied()
}

/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkPresentModeKHR.html
/// MAILBOX (no tearing, does not block) if available, FIFO otherwise.
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
  if present_modes.contains(&vk::PresentModeKHR::MAILBOX) {
    vk::PresentModeKHR::MAILBOX
  } else {
    vk::PresentModeKHR::FIFO // FIFO is guaranteed
  }
}

/// Surface decides the extent, unless it reports `u32::MAX`.
/// Then it's the window size clamped to what the surface allows.
pub fn choose_swap_extent(
  caps: &vk::SurfaceCapabilitiesKHR,
  window_size: vk::Extent2D,
) -> vk::Extent2D {
  if caps.current_extent.width != u32::MAX {
    return caps.current_extent;
  }

  let min = caps.min_image_extent;
  let max = caps.max_image_extent;
  vk::Extent2D {
    width: window_size.width.max(min.width).min(max.width),
    height: window_size.height.max(min.height).min(max.height),
  }
}

/// One more than minimum, so we do not wait on the driver. `max_image_count == 0` means no limit.
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
  let image_count = caps.min_image_count + 1;
  if caps.max_image_count > 0 {
    image_count.min(caps.max_image_count)
  } else {
    image_count
  }
}

pub fn get_pre_transform(caps: &vk::SurfaceCapabilitiesKHR) -> vk::SurfaceTransformFlagsKHR {
  // Check if surface supports SurfaceTransformFlagsKHR::IDENTITY
  let can_identity = caps
    .supported_transforms
    .contains(vk::SurfaceTransformFlagsKHR::IDENTITY);
  if can_identity {
    vk::SurfaceTransformFlagsKHR::IDENTITY
  } else {
    caps.current_transform
  }
}

pub fn get_surface_support(
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
) -> VkResult<SurfaceSupport> {
  unsafe {
    let capabilities =
      surface_loader.get_physical_device_surface_capabilities(phys_device, surface_khr)?;
    trace!("Surface_capabilities {:?}", capabilities);
    Ok(SurfaceSupport {
      capabilities,
      formats: surface_loader.get_physical_device_surface_formats(phys_device, surface_khr)?,
      present_modes: surface_loader
        .get_physical_device_surface_present_modes(phys_device, surface_khr)?,
    })
  }
}

/// Images are shared between queue families only if graphics and present families differ
pub fn create_swapchain_khr(
  swapchain_loader: &Swapchain,
  surface_khr: vk::SurfaceKHR,
  desc: &SwapchainDesc,
  queue_family_indices: &[u32],
) -> VkResult<vk::SwapchainKHR> {
  let sharing_mode = if queue_family_indices.len() > 1 {
    vk::SharingMode::CONCURRENT
  } else {
    vk::SharingMode::EXCLUSIVE
  };

  let create_info = vk::SwapchainCreateInfoKHR::builder()
    .surface(surface_khr)
    .min_image_count(desc.image_count)
    .image_format(desc.surface_format.format)
    .image_color_space(desc.surface_format.color_space)
    .image_extent(desc.extent)
    .image_array_layers(1)
    .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
    .image_sharing_mode(sharing_mode)
    .queue_family_indices(queue_family_indices)
    .present_mode(desc.present_mode)
    .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
    .pre_transform(desc.pre_transform)
    .clipped(true)
    .build();

  let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None)? };
  trace!("Swapchain created");
  Ok(swapchain)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fmt(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
      format,
      color_space,
    }
  }

  fn caps(current: (u32, u32), min_count: u32, max_count: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
      min_image_count: min_count,
      max_image_count: max_count,
      current_extent: vk::Extent2D {
        width: current.0,
        height: current.1,
      },
      min_image_extent: vk::Extent2D {
        width: 100,
        height: 100,
      },
      max_image_extent: vk::Extent2D {
        width: 1920,
        height: 1080,
      },
      ..Default::default()
    }
  }

  #[test]
  fn prefers_srgb_format() {
    let formats = [
      fmt(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      fmt(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    assert_eq!(choose_surface_format(&formats), Some(formats[1]));
  }

  #[test]
  fn falls_back_to_first_format() {
    let formats = [
      fmt(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      // right format, wrong color space
      fmt(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
    ];
    assert_eq!(choose_surface_format(&formats), Some(formats[0]));
    assert_eq!(choose_surface_format(&[]), None);
  }

  #[test]
  fn prefers_mailbox() {
    let modes = [
      vk::PresentModeKHR::FIFO,
      vk::PresentModeKHR::IMMEDIATE,
      vk::PresentModeKHR::MAILBOX,
    ];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
  }

  #[test]
  fn falls_back_to_fifo() {
    let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO_RELAXED];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO);
    assert_eq!(choose_present_mode(&[]), vk::PresentModeKHR::FIFO);
  }

  #[test]
  fn extent_from_surface() {
    let window = vk::Extent2D {
      width: 3000,
      height: 50,
    };
    let extent = choose_swap_extent(&caps((800, 600), 2, 3), window);
    assert_eq!(
      extent,
      vk::Extent2D {
        width: 800,
        height: 600
      }
    );
  }

  #[test]
  fn extent_clamped_when_surface_leaves_it_open() {
    let c = caps((u32::MAX, u32::MAX), 2, 3);
    let clamped = choose_swap_extent(
      &c,
      vk::Extent2D {
        width: 3000,
        height: 50,
      },
    );
    assert_eq!(
      clamped,
      vk::Extent2D {
        width: 1920,
        height: 100
      }
    );

    let inside = vk::Extent2D {
      width: 1024,
      height: 768,
    };
    assert_eq!(choose_swap_extent(&c, inside), inside);
  }

  #[test]
  fn image_count_is_min_plus_one_capped() {
    assert_eq!(choose_image_count(&caps((1, 1), 2, 8)), 3);
    assert_eq!(choose_image_count(&caps((1, 1), 3, 3)), 3);
    // no upper limit
    assert_eq!(choose_image_count(&caps((1, 1), 2, 0)), 3);
  }

  #[test]
  fn identity_transform_when_supported() {
    let mut c = caps((1, 1), 2, 3);
    c.supported_transforms =
      vk::SurfaceTransformFlagsKHR::IDENTITY | vk::SurfaceTransformFlagsKHR::ROTATE_90;
    c.current_transform = vk::SurfaceTransformFlagsKHR::ROTATE_90;
    assert_eq!(get_pre_transform(&c), vk::SurfaceTransformFlagsKHR::IDENTITY);

    c.supported_transforms = vk::SurfaceTransformFlagsKHR::ROTATE_90;
    assert_eq!(get_pre_transform(&c), vk::SurfaceTransformFlagsKHR::ROTATE_90);
  }
}
