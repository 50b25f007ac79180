mod camera;
mod scene_uniform_buffer;
mod triangle_vertex;

pub use self::camera::*;
pub use self::scene_uniform_buffer::*;
pub use self::triangle_vertex::*;
