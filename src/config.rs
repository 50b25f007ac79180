use glam::{vec3, Vec3};
use log::LevelFilter;

pub struct CameraConfig {
  pub position: Vec3,
  pub look_at: Vec3,
  pub fov_dgr: f32,
  pub z_near: f32,
  pub z_far: f32,
}

impl Default for CameraConfig {
  fn default() -> Self {
    Self {
      position: vec3(2.0, 2.0, 2.0),
      look_at: Vec3::ZERO,
      fov_dgr: 45.0,
      z_near: 0.1,
      z_far: 10.0,
    }
  }
}

pub struct Config {
  // window
  pub window_title: String,
  pub window_width: f64,
  pub window_height: f64,
  pub window_resizable: bool,
  // vulkan
  /// Frames that can be recorded/in-flight at the same time
  pub frames_in_flight: usize,
  /// Validation layers and debug messenger
  pub graphics_debugging: bool,
  pub log_level: LevelFilter,
  // scene-related
  pub clear_color: [f32; 4],
  pub rotation_speed_dgr: f32,
  pub camera: CameraConfig,
  /// Print average frame time every _this many_ frames
  pub frame_time_log_interval: u64,
  // shaders
  pub shader_vert_path: String,
  pub shader_frag_path: String,
}

impl Config {
  pub fn new() -> Self {
    Self {
      window_title: String::from("Rust Vulkan frame loop"),
      window_width: 800f64,
      window_height: 600f64,
      window_resizable: true,
      frames_in_flight: 2,
      graphics_debugging: cfg!(debug_assertions),
      log_level: if cfg!(debug_assertions) {
        LevelFilter::Debug
      } else {
        LevelFilter::Info
      },
      clear_color: [0.0, 0.0, 0.0, 1.0],
      rotation_speed_dgr: 90.0,
      camera: CameraConfig::default(),
      frame_time_log_interval: 600,
      // glslangValidator -V src/shaders/triangle.vert.glsl -o src/shaders-compiled/triangle.vert.spv
      shader_vert_path: String::from("./src/shaders-compiled/triangle.vert.spv"),
      shader_frag_path: String::from("./src/shaders-compiled/triangle.frag.spv"),
    }
  }
}
