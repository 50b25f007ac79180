use log::{info, trace};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use ash::extensions::{ext::DebugUtils, khr::Swapchain};
use ash::prelude::VkResult;
use ash::vk;
use raw_window_handle::RawDisplayHandle;

fn from_c_str<'a>(s: &[c_char]) -> &'a CStr {
  unsafe { CStr::from_ptr(s.as_ptr() as *const c_char) }
}

fn get_app_version() -> u32 {
  let to_u32 = |s: &str| s.parse::<u32>().unwrap_or(0);

  vk::make_api_version(
    0,
    to_u32(env!("CARGO_PKG_VERSION_MAJOR")),
    to_u32(env!("CARGO_PKG_VERSION_MINOR")),
    to_u32(env!("CARGO_PKG_VERSION_PATCH")),
  )
}

const VALIDATION_LAYER: &[u8] = b"VK_LAYER_KHRONOS_validation\0";

fn get_layer_names(graphics_debugging: bool) -> Vec<*const c_char> {
  let mut layer_names = Vec::new();
  if graphics_debugging {
    layer_names.push(VALIDATION_LAYER.as_ptr() as *const c_char);
  }
  layer_names
}

/// Surface extensions for this platform's windowing system, plus debug utils
fn get_extension_names(
  display_handle: RawDisplayHandle,
  graphics_debugging: bool,
) -> VkResult<Vec<*const c_char>> {
  let mut names = ash_window::enumerate_required_extensions(display_handle)?.to_vec();
  if graphics_debugging {
    names.push(DebugUtils::name().as_ptr());
  }
  Ok(names)
}

pub fn create_instance(
  entry: &ash::Entry,
  display_handle: RawDisplayHandle,
  graphics_debugging: bool,
) -> VkResult<ash::Instance> {
  let app_name = CString::new(env!("CARGO_PKG_NAME")).unwrap_or_default();

  let app_info = vk::ApplicationInfo::builder()
    .application_name(&app_name)
    .application_version(get_app_version())
    .api_version(vk::make_api_version(0, 1, 1, 0))
    .build();

  // https://github.com/EmbarkStudios/kajiya/blob/main/crates/lib/kajiya-backend/src/vulkan/instance.rs#L52
  let layers_names_raw = get_layer_names(graphics_debugging);
  let extension_names_raw = get_extension_names(display_handle, graphics_debugging)?;

  let create_info = vk::InstanceCreateInfo::builder()
    .application_info(&app_info)
    .enabled_layer_names(&layers_names_raw)
    .enabled_extension_names(&extension_names_raw)
    .build();

  let instance = unsafe { entry.create_instance(&create_info, None)? };
  trace!("Ash instance created");
  Ok(instance)
}

/// Graphics and present queue family. Often the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
  pub graphics: u32,
  pub present: u32,
}

impl QueueFamilies {
  /// Distinct family indices, for queue creation and swapchain sharing
  pub fn unique(&self) -> Vec<u32> {
    if self.graphics == self.present {
      vec![self.graphics]
    } else {
      vec![self.graphics, self.present]
    }
  }
}

/// Prefer one family that can do both. Otherwise first graphics family and first present family.
pub fn find_queue_families(
  queue_props: &[vk::QueueFamilyProperties],
  mut can_present: impl FnMut(u32) -> VkResult<bool>,
) -> VkResult<Option<QueueFamilies>> {
  let mut graphics = None;
  let mut present = None;

  for (index, props) in queue_props.iter().enumerate() {
    let index = index as u32;
    let is_gfx = props.queue_count > 0 && props.queue_flags.contains(vk::QueueFlags::GRAPHICS);
    let is_present = can_present(index)?;

    if is_gfx && is_present {
      return Ok(Some(QueueFamilies {
        graphics: index,
        present: index,
      }));
    }
    if is_gfx && graphics.is_none() {
      graphics = Some(index);
    }
    if is_present && present.is_none() {
      present = Some(index);
    }
  }

  Ok(match (graphics, present) {
    (Some(graphics), Some(present)) => Some(QueueFamilies { graphics, present }),
    _ => None,
  })
}

fn supports_swapchain(instance: &ash::Instance, phys_device: vk::PhysicalDevice) -> VkResult<bool> {
  let extensions = unsafe { instance.enumerate_device_extension_properties(phys_device)? };
  Ok(
    extensions
      .iter()
      .any(|ext| from_c_str(&ext.extension_name) == Swapchain::name()),
  )
}

/// Picks physical device e.g. "GeForce GTX 1050 Ti" with queue families that can
/// render and present to our surface. Discrete GPUs go first.
pub fn pick_physical_device_and_queue_families(
  instance: &ash::Instance,
  surface_loader: &ash::extensions::khr::Surface,
  surface_khr: vk::SurfaceKHR,
) -> VkResult<Option<(vk::PhysicalDevice, QueueFamilies)>> {
  let mut phys_devices = unsafe { instance.enumerate_physical_devices()? };
  trace!("Found {} physical devices", phys_devices.len());
  phys_devices.sort_by_key(|&phys_device| {
    let props = unsafe { instance.get_physical_device_properties(phys_device) };
    props.device_type != vk::PhysicalDeviceType::DISCRETE_GPU
  });

  for phys_device in phys_devices {
    if !supports_swapchain(instance, phys_device)? {
      continue;
    }
    let q_props = unsafe { instance.get_physical_device_queue_family_properties(phys_device) };
    let families = find_queue_families(&q_props, |index| unsafe {
      surface_loader.get_physical_device_surface_support(phys_device, index, surface_khr)
    })?;

    if let Some(families) = families {
      let props = unsafe { instance.get_physical_device_properties(phys_device) };
      info!(
        "Using physical device: {:?} ({:?})",
        from_c_str(&props.device_name),
        families
      );
      return Ok(Some((phys_device, families)));
    }
  }

  Ok(None)
}

/// Pick logical device, returns (device, graphics queue, present queue)
pub fn pick_device_and_queues(
  instance: &ash::Instance,
  phys_device: vk::PhysicalDevice,
  queue_families: &QueueFamilies,
) -> VkResult<(ash::Device, vk::Queue, vk::Queue)> {
  trace!("Will pick logical device");
  let queue_prio = [1.0f32]; // only one queue per family
  let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = queue_families
    .unique()
    .into_iter()
    .map(|family| {
      vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(family)
        .queue_priorities(&queue_prio)
        .build()
    })
    .collect();

  let device_extension_names_raw = [Swapchain::name().as_ptr()];
  let features = vk::PhysicalDeviceFeatures::default();
  let device_create_info = vk::DeviceCreateInfo::builder()
    .queue_create_infos(&queue_create_infos)
    .enabled_extension_names(&device_extension_names_raw)
    .enabled_features(&features)
    .build();

  let device: ash::Device = unsafe { instance.create_device(phys_device, &device_create_info, None)? };
  trace!("Logical device selected");

  let graphics_queue = unsafe { device.get_device_queue(queue_families.graphics, 0) };
  let present_queue = unsafe { device.get_device_queue(queue_families.present, 0) };
  trace!("Queues on logical device selected");

  Ok((device, graphics_queue, present_queue))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
    vk::QueueFamilyProperties {
      queue_flags: flags,
      queue_count: 1,
      ..Default::default()
    }
  }

  #[test]
  fn prefers_family_that_does_both() {
    let props = [
      family(vk::QueueFlags::GRAPHICS),
      family(vk::QueueFlags::COMPUTE),
      family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE),
    ];
    let families = find_queue_families(&props, |i| Ok(i != 0)).unwrap();
    assert_eq!(
      families,
      Some(QueueFamilies {
        graphics: 2,
        present: 2
      })
    );
    assert_eq!(families.unwrap().unique(), vec![2]);
  }

  #[test]
  fn separate_present_family() {
    let props = [
      family(vk::QueueFlags::GRAPHICS),
      family(vk::QueueFlags::TRANSFER),
    ];
    let families = find_queue_families(&props, |i| Ok(i == 1)).unwrap().unwrap();
    assert_eq!(
      families,
      QueueFamilies {
        graphics: 0,
        present: 1
      }
    );
    assert_eq!(families.unique(), vec![0, 1]);
  }

  #[test]
  fn no_present_support() {
    let props = [family(vk::QueueFlags::GRAPHICS)];
    assert_eq!(find_queue_families(&props, |_| Ok(false)).unwrap(), None);
  }

  #[test]
  fn present_query_error_propagates() {
    let props = [family(vk::QueueFlags::GRAPHICS)];
    let result = find_queue_families(&props, |_| Err(vk::Result::ERROR_SURFACE_LOST_KHR));
    assert_eq!(result, Err(vk::Result::ERROR_SURFACE_LOST_KHR));
  }
}
