use log::trace;
use std::ffi::CStr;
use std::path::Path;

use ash;
use ash::prelude::VkResult;
use ash::vk;

// https://github.com/zeux/niagara/blob/master/src/shaders.cpp

const SHADER_ENTRY_POINT: &[u8] = b"main\0";

/// SPIR-V words of a compiled shader, kept around so the pipeline
/// can be recreated (e.g. after surface format change) without touching the disk.
#[derive(Debug, Clone)]
pub struct ShaderCode {
  pub stage: vk::ShaderStageFlags,
  pub path: String,
  pub code: Vec<u32>,
}

pub fn read_shader_code(stage: vk::ShaderStageFlags, path: &str) -> std::io::Result<ShaderCode> {
  trace!("Loading shader from {}", path);
  let mut file = std::fs::File::open(Path::new(path))?;
  let code = ash::util::read_spv(&mut file)?;
  Ok(ShaderCode {
    stage,
    path: path.to_string(),
    code,
  })
}

fn create_shader_module(device: &ash::Device, code: &[u32]) -> VkResult<vk::ShaderModule> {
  let create_info = vk::ShaderModuleCreateInfo::builder().code(code).build();
  unsafe { device.create_shader_module(&create_info, None) }
}

/// Module has to outlive pipeline creation. Destroy it afterwards.
pub fn create_shader_stage(
  device: &ash::Device,
  shader: &ShaderCode,
) -> VkResult<(vk::ShaderModule, vk::PipelineShaderStageCreateInfo)> {
  let shader_fn_name = unsafe { CStr::from_bytes_with_nul_unchecked(SHADER_ENTRY_POINT) };

  let shader_module = create_shader_module(device, &shader.code)?;

  let stage = vk::PipelineShaderStageCreateInfo::builder()
    .stage(shader.stage)
    .module(shader_module)
    .name(shader_fn_name)
    .build();
  trace!("Shader {:?} created from {}", shader.stage, shader.path);

  Ok((shader_module, stage))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_shader_file() {
    let result = read_shader_code(vk::ShaderStageFlags::VERTEX, "./no/such/shader.spv");
    assert!(result.is_err());
  }
}
