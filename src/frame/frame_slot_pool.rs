use ash::vk;
use log::trace;

use super::{CommandSequence, FrameDevice, FrameError, FrameResult};

/// Slot fence is waited on without a timeout. Caps frames in flight at slot count.
pub const FENCE_TIMEOUT: u64 = u64::MAX;

/// Handles of a frame slot. All `Copy`, so they can be kept while the pool is borrowed again.
#[derive(Debug, Clone, Copy)]
pub struct FrameSlotSync {
  pub command_buffer: vk::CommandBuffer,
  /// Signaled by acquire, waited on by submit
  pub image_available: vk::Semaphore,
  /// Signaled by submit, waited on by present
  pub render_finished: vk::Semaphore,
  /// Signaled when the GPU finished the slot's last submission
  pub in_flight_fence: vk::Fence,
}

/// https://www.khronos.org/assets/uploads/developers/library/2016-vulkan-devday-uk/7-Keeping-your-GPU-fed.pdf
pub struct FrameSlot {
  pub index: usize,
  pub sync: FrameSlotSync,
  pub commands: CommandSequence,
}

/// Ring of per-frame resources. Everything is allocated in `new`,
/// `acquire` only waits.
pub struct FrameSlotPool {
  slots: Vec<FrameSlot>,
}

impl FrameSlotPool {
  pub fn new<D: FrameDevice>(device: &mut D, slot_count: usize) -> FrameResult<Self> {
    assert!(slot_count > 0, "Frame slot pool needs at least one slot");

    let mut pool = Self {
      slots: Vec::with_capacity(slot_count),
    };
    for index in 0..slot_count {
      match create_slot_sync(device) {
        Ok(sync) => pool.slots.push(FrameSlot {
          index,
          sync,
          commands: CommandSequence::new(),
        }),
        Err(err) => {
          pool.release(device);
          return Err(FrameError::CreateFrameSlot(err));
        }
      }
    }

    trace!("Created {} frame slots", slot_count);
    Ok(pool)
  }

  pub fn slot_index(&self, tick: u64) -> usize {
    (tick % self.slots.len() as u64) as usize
  }

  /// Slot for `tick`, after the GPU finished the previous submission that used it.
  pub fn acquire<D: FrameDevice>(&mut self, device: &mut D, tick: u64) -> FrameResult<&mut FrameSlot> {
    let index = self.slot_index(tick);
    let slot = &mut self.slots[index];

    device
      .wait_for_fence(slot.sync.in_flight_fence, FENCE_TIMEOUT)
      .map_err(|result| FrameError::DeviceLost {
        slot_index: index,
        result,
      })?;

    Ok(slot)
  }

  pub fn slot_mut(&mut self, index: usize) -> &mut FrameSlot {
    &mut self.slots[index]
  }

  pub fn slots(&self) -> &[FrameSlot] {
    &self.slots
  }

  /// Destroy all slots. Device has to be idle.
  pub fn release<D: FrameDevice>(&mut self, device: &mut D) {
    for slot in self.slots.drain(..) {
      destroy_slot_sync(device, &slot.sync);
    }
  }
}

fn create_slot_sync<D: FrameDevice>(device: &mut D) -> ash::prelude::VkResult<FrameSlotSync> {
  let command_buffer = device.allocate_command_buffer()?;
  let image_available = match device.create_semaphore() {
    Ok(s) => s,
    Err(err) => {
      device.free_command_buffer(command_buffer);
      return Err(err);
    }
  };
  let render_finished = match device.create_semaphore() {
    Ok(s) => s,
    Err(err) => {
      device.destroy_semaphore(image_available);
      device.free_command_buffer(command_buffer);
      return Err(err);
    }
  };
  let in_flight_fence = match device.create_fence() {
    Ok(f) => f,
    Err(err) => {
      device.destroy_semaphore(render_finished);
      device.destroy_semaphore(image_available);
      device.free_command_buffer(command_buffer);
      return Err(err);
    }
  };

  Ok(FrameSlotSync {
    command_buffer,
    image_available,
    render_finished,
    in_flight_fence,
  })
}

fn destroy_slot_sync<D: FrameDevice>(device: &mut D, sync: &FrameSlotSync) {
  device.destroy_fence(sync.in_flight_fence);
  device.destroy_semaphore(sync.render_finished);
  device.destroy_semaphore(sync.image_available);
  device.free_command_buffer(sync.command_buffer);
}
