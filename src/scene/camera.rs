use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Model is drawn in XY plane, so +Z is up
const SCENE_UP: Vec3 = Vec3::Z;

/// Static camera. Only the aspect ratio changes, together with the swapchain extent.
pub struct Camera {
  view_matrix: Mat4,
  perspective_matrix: Mat4,
}

impl Camera {
  pub fn new(cfg: &CameraConfig, aspect_ratio: f32) -> Camera {
    Camera {
      view_matrix: Mat4::look_at_rh(cfg.position, cfg.look_at, SCENE_UP),
      // glam's `perspective_rh` already maps depth to [0, 1].
      // Y is flipped through negative viewport height, not here:
      // https://www.saschawillems.de/blog/2019/03/29/flipping-the-vulkan-viewport/
      perspective_matrix: Mat4::perspective_rh(
        cfg.fov_dgr.to_radians(),
        aspect_ratio,
        cfg.z_near,
        cfg.z_far,
      ),
    }
  }

  pub fn view_matrix(&self) -> &Mat4 {
    &self.view_matrix
  }

  pub fn perspective_matrix(&self) -> &Mat4 {
    &self.perspective_matrix
  }
}
