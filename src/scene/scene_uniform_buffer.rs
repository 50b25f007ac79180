use ash::vk;
use bytemuck;
use glam::Mat4;

use super::Camera;
use crate::config::Config;

/// Rewritten every frame, one buffer per frame slot.
#[derive(Copy, Clone, Debug)] // , bytemuck::Zeroable, bytemuck::Pod
#[repr(C)]
pub struct SceneUniformBuffer {
  pub model: Mat4,
  pub view: Mat4,
  pub projection: Mat4,
}

unsafe impl bytemuck::Zeroable for SceneUniformBuffer {}
unsafe impl bytemuck::Pod for SceneUniformBuffer {}

impl SceneUniformBuffer {
  // must be same as in shader!
  pub const BINDING_INDEX: u32 = 0;

  pub fn new(elapsed_secs: f32, extent: vk::Extent2D, config: &Config) -> Self {
    let angle = (elapsed_secs * config.rotation_speed_dgr).to_radians();
    let camera = Camera::new(&config.camera, aspect_ratio(extent));

    Self {
      model: Mat4::from_rotation_z(angle),
      view: *camera.view_matrix(),
      projection: *camera.perspective_matrix(),
    }
  }

  pub fn size_bytes() -> usize {
    std::mem::size_of::<SceneUniformBuffer>()
  }
}

fn aspect_ratio(extent: vk::Extent2D) -> f32 {
  if extent.height == 0 {
    1.0
  } else {
    extent.width as f32 / extent.height as f32
  }
}
