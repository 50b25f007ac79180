use log::{debug, error, info, warn};
use std::ffi::CStr;

use ash::extensions::ext::DebugUtils;
use ash::prelude::VkResult;
use ash::vk;

// called on validation layer message
extern "system" fn vulkan_debug_callback(
  message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
  message_type: vk::DebugUtilsMessageTypeFlagsEXT,
  p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
  _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
  if p_callback_data.is_null() {
    return vk::FALSE;
  }
  let callback_data = unsafe { *p_callback_data };
  if callback_data.p_message.is_null() {
    return vk::FALSE;
  }
  let message = unsafe { CStr::from_ptr(callback_data.p_message).to_string_lossy() };

  let message_str = format!(
    "[VK_dbg_callback, {:?}]: {}",
    message_type, message,
  );

  match message_severity {
    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => error!("{}", message_str),
    vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => warn!("{}", message_str),
    vk::DebugUtilsMessageSeverityFlagsEXT::INFO => info!("{}", message_str),
    _ => debug!("{}", message_str),
  }

  vk::FALSE
}

/// Routes validation layer messages into `log`. Destroy the messenger before the instance.
pub fn setup_debug_reporting(
  entry: &ash::Entry,
  instance: &ash::Instance,
) -> VkResult<(DebugUtils, vk::DebugUtilsMessengerEXT)> {
  let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
    .message_severity(
      vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
      // | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE // will cause spam about extensions
    )
    .message_type(
      vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
    )
    .pfn_user_callback(Some(vulkan_debug_callback))
    .build();

  let debug_utils_loader = DebugUtils::new(entry, instance);

  let debug_messenger =
    unsafe { debug_utils_loader.create_debug_utils_messenger(&debug_info, None)? };

  Ok((debug_utils_loader, debug_messenger))
}
