use ash::vk;
use bytemuck;
use glam::{Vec2, Vec3};

/// Vertex layout of the quad. Must match `triangle.vert.glsl`.
#[derive(Copy, Clone, Debug)] // , bytemuck::Zeroable, bytemuck::Pod
#[repr(C)]
pub struct TriangleVertex {
  pub pos: Vec2,
  pub color: Vec3,
}
unsafe impl bytemuck::Zeroable for TriangleVertex {}
unsafe impl bytemuck::Pod for TriangleVertex {}

impl TriangleVertex {
  pub const fn new(pos: (f32, f32), col: (f32, f32, f32)) -> TriangleVertex {
    TriangleVertex {
      pos: Vec2::new(pos.0, pos.1),
      color: Vec3::new(col.0, col.1, col.2),
    }
  }

  pub fn get_bindings_descriptions() -> [vk::VertexInputBindingDescription; 1] {
    [vk::VertexInputBindingDescription {
      binding: 0,
      input_rate: vk::VertexInputRate::VERTEX,
      stride: std::mem::size_of::<TriangleVertex>() as u32,
    }]
  }

  pub fn get_attributes_descriptions() -> [vk::VertexInputAttributeDescription; 2] {
    [
      vk::VertexInputAttributeDescription {
        binding: 0,
        location: 0,
        format: vk::Format::R32G32_SFLOAT,
        offset: 0, // offsetof(TriangleVertex, pos),
      },
      vk::VertexInputAttributeDescription {
        binding: 0,
        location: 1,
        format: vk::Format::R32G32B32_SFLOAT,
        offset: std::mem::size_of::<Vec2>() as u32, // offsetted by 'position' from beginning of structure
      },
    ]
  }
}

pub const QUAD_VERTICES: [TriangleVertex; 4] = [
  TriangleVertex::new((-0.5, -0.5), (1.0, 0.0, 0.0)),
  TriangleVertex::new((0.5, -0.5), (0.0, 1.0, 0.0)),
  TriangleVertex::new((0.5, 0.5), (0.0, 0.0, 1.0)),
  TriangleVertex::new((-0.5, 0.5), (1.0, 1.0, 1.0)),
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];
