use ash::vk;
use gpu_allocator::vulkan::{AllocationCreateDesc, AllocationScheme, Allocator};
use gpu_allocator::{AllocationError, MemoryLocation};
use log::{error, trace};

// https://github.com/Traverse-Research/gpu-allocator/blob/main/examples/vulkan-buffer.rs
// https://github.com/expenses/vulkan-base/blob/main/ash-helpers/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum BufferError {
  #[error("{name}: {result}")]
  Vulkan { name: String, result: vk::Result },
  #[error("{name}: {source}")]
  Allocation {
    name: String,
    #[source]
    source: AllocationError,
  },
}

pub struct VkBuffer {
  // For debugging
  pub name: String,
  /// Size in bytes
  pub size: usize,
  /// Native Vulkan buffer
  pub buffer: vk::Buffer,
  /// `None` after `delete`
  allocation: Option<gpu_allocator::vulkan::Allocation>,
}

fn fmt_buf_name(name: &str, size: usize) -> String {
  format!("Buffer '{}' ({} bytes)", name, size)
}

impl VkBuffer {
  /// Allocate empty vulkan buffer. `CpuToGpu` memory stays mapped for the whole life of the buffer.
  pub fn empty(
    device: &ash::Device,
    allocator: &mut Allocator,
    name: &str,
    size: usize,
    usage: vk::BufferUsageFlags,
    location: MemoryLocation,
  ) -> Result<Self, BufferError> {
    let vk_err = |result| BufferError::Vulkan {
      name: fmt_buf_name(name, size),
      result,
    };

    let buffer_info = vk::BufferCreateInfo::builder()
      .size(size as u64)
      .usage(usage)
      .sharing_mode(vk::SharingMode::EXCLUSIVE)
      .build();
    let buffer = unsafe { device.create_buffer(&buffer_info, None) }.map_err(vk_err)?;
    let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };

    let allocation = allocator.allocate(&AllocationCreateDesc {
      name,
      requirements,
      location,
      linear: true,
      allocation_scheme: AllocationScheme::GpuAllocatorManaged,
    });
    let allocation = match allocation {
      Ok(a) => a,
      Err(source) => {
        unsafe { device.destroy_buffer(buffer, None) };
        return Err(BufferError::Allocation {
          name: fmt_buf_name(name, size),
          source,
        });
      }
    };

    let bind_result =
      unsafe { device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) };
    if let Err(result) = bind_result {
      unsafe { device.destroy_buffer(buffer, None) };
      if let Err(err) = allocator.free(allocation) {
        error!("Could not free memory of {}: {}", fmt_buf_name(name, size), err);
      }
      return Err(vk_err(result));
    }

    trace!("Allocated {}", fmt_buf_name(name, size));
    Ok(Self {
      name: name.to_string(),
      size,
      buffer,
      allocation: Some(allocation),
    })
  }

  /// Allocate vulkan buffer and fill it with data
  pub fn from_data(
    device: &ash::Device,
    allocator: &mut Allocator,
    name: &str,
    bytes: &[u8],
    usage: vk::BufferUsageFlags,
  ) -> Result<Self, BufferError> {
    let mut buffer = VkBuffer::empty(
      device,
      allocator,
      name,
      bytes.len(),
      usage,
      MemoryLocation::CpuToGpu,
    )?;

    // TODO staging buffer with `vk::BufferUsageFlags::TRANSFER_SRC` and GpuOnly memory
    // once there is a setup command buffer to `cmd_copy_buffer` with
    buffer.write_to_mapped(bytes);

    Ok(buffer)
  }

  pub fn write_to_mapped(&mut self, bytes: &[u8]) {
    let size = bytes.len();
    let name = self.name();

    match self.allocation.as_mut().and_then(|a| a.mapped_slice_mut()) {
      Some(slice) if slice.len() >= size => slice[..size].copy_from_slice(bytes),
      Some(slice) => panic!(
        "Tried to write {} bytes to {}, mapped range is {}",
        size,
        name,
        slice.len()
      ),
      None => panic!("Tried to write {} bytes to unmapped {}", size, name),
    }
  }

  pub fn name(&self) -> String {
    fmt_buf_name(&self.name, self.size)
  }

  /// GPU must not use the buffer anymore
  pub unsafe fn delete(&mut self, device: &ash::Device, allocator: &mut Allocator) {
    if let Some(allocation) = self.allocation.take() {
      device.destroy_buffer(self.buffer, None);
      if let Err(err) = allocator.free(allocation) {
        error!("Could not free memory of {}: {}", self.name(), err);
      }
      self.buffer = vk::Buffer::null();
    }
  }
}
