use ash::vk;
use log::{debug, error, info, trace};

use super::{
  is_zero_area, AcquireStatus, CommandRecorder, DrawBindings, FrameError, FrameResult,
  FrameSlotPool, FrameSubmitInfo, PresentStatus, RebuildOutcome, RenderDevice, ResizeSignal,
  SwapchainBundle, SwapchainLifecycle,
};

/// Acquire is waited on without a timeout
pub const ACQUIRE_TIMEOUT: u64 = u64::MAX;

/// Only the color writes wait for the acquired image, vertex work can start earlier
const SUBMIT_WAIT_STAGE: vk::PipelineStageFlags = vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
  Running,
  /// Drawable area is zero, ticks do nothing
  Suspended,
  /// Shut down, all resources released
  Drained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
  Presented { slot_index: usize, image_index: u32 },
  /// Swapchain was out of date on acquire, frame counter not advanced
  Skipped,
  /// Zero-area drawable, nothing was done
  Suspended,
}

/// Drives acquire, record, submit, present for one frame per `tick()`.
pub struct FrameScheduler<D: RenderDevice> {
  device: D,
  slots: FrameSlotPool,
  swapchain: SwapchainLifecycle,
  recorder: CommandRecorder,
  resize_signal: ResizeSignal,
  frame_counter: u64,
  /// Acquire reported suboptimal, rebuild after present
  rebuild_owed: bool,
  state: SchedulerState,
}

impl<D: RenderDevice> FrameScheduler<D> {
  /// Takes ownership of the device and of the initial swapchain.
  /// On error everything passed in is released.
  pub fn initialize(
    mut device: D,
    slot_count: usize,
    bindings: DrawBindings,
    initial_swapchain: Option<SwapchainBundle>,
    resize_signal: ResizeSignal,
  ) -> FrameResult<Self> {
    assert!(
      bindings.descriptor_sets.is_empty() || bindings.descriptor_sets.len() == slot_count,
      "Expected one descriptor set per frame slot ({}), got {}",
      slot_count,
      bindings.descriptor_sets.len()
    );

    let mut swapchain = SwapchainLifecycle::new(initial_swapchain);
    let slots = match FrameSlotPool::new(&mut device, slot_count) {
      Ok(slots) => slots,
      Err(err) => {
        swapchain.release(&mut device);
        return Err(err);
      }
    };
    info!("Frame scheduler initialized with {} frame slots", slot_count);

    Ok(Self {
      device,
      slots,
      swapchain,
      recorder: CommandRecorder::new(bindings),
      resize_signal,
      frame_counter: 0,
      rebuild_owed: false,
      state: SchedulerState::Running,
    })
  }

  pub fn state(&self) -> SchedulerState {
    self.state
  }

  pub fn frame_counter(&self) -> u64 {
    self.frame_counter
  }

  pub fn swapchain(&self) -> &SwapchainLifecycle {
    &self.swapchain
  }

  pub fn device(&self) -> &D {
    &self.device
  }

  pub fn device_mut(&mut self) -> &mut D {
    &mut self.device
  }

  /// Render and present a single frame.
  pub fn tick(&mut self) -> FrameResult<TickOutcome> {
    if self.state == SchedulerState::Drained {
      return Err(FrameError::Drained);
    }

    // checked before acquire, a zero-area swapchain cannot exist
    if is_zero_area(self.device.drawable_extent()) {
      self.suspend();
      return Ok(TickOutcome::Suspended);
    }
    if self.state == SchedulerState::Suspended {
      info!("Drawable area is back, resuming frame scheduler");
      self.state = SchedulerState::Running;
      self.swapchain.mark_stale();
    }
    if self.swapchain.is_stale() {
      if !self.rebuild_swapchain()? {
        return Ok(TickOutcome::Suspended);
      }
      // new swapchain already has the current drawable size, this covers
      // resizes reported through out-of-date or while suspended
      self.resize_signal.take();
    }

    // 1. wait until GPU is done with this slot
    let slot = self.slots.acquire(&mut self.device, self.frame_counter)?;
    let slot_index = slot.index;
    let sync = slot.sync;

    // 2. acquire image
    let (swapchain_khr, extent) = match self.swapchain.current() {
      Some(bundle) => (bundle.swapchain, bundle.desc.extent),
      None => unreachable!("Swapchain is ready after rebuild"),
    };
    let acquired =
      self
        .device
        .acquire_next_image(swapchain_khr, ACQUIRE_TIMEOUT, sync.image_available);
    let image_index = match AcquireStatus::classify(acquired)? {
      AcquireStatus::OutOfDate => {
        debug!("Swapchain out of date on acquire, skipping frame");
        self.swapchain.mark_stale();
        return Ok(TickOutcome::Skipped);
      }
      AcquireStatus::Acquired {
        image_index,
        suboptimal,
      } => {
        if suboptimal {
          debug!("Swapchain suboptimal on acquire, will rebuild after present");
          self.rebuild_owed = true;
        }
        image_index
      }
    };
    trace!(
      "Frame {}: slot {}, image {}",
      self.frame_counter,
      slot_index,
      image_index
    );

    // 3. fence is unsignaled from now until the submit below completes
    self
      .device
      .reset_fence(sync.in_flight_fence)
      .map_err(|result| FrameError::ResetFence { slot_index, result })?;
    self
      .device
      .prepare_frame(slot_index, extent)
      .map_err(|result| FrameError::PrepareFrame { slot_index, result })?;

    // 4. record
    let targets = match self.swapchain.current() {
      Some(bundle) => &bundle.render_targets,
      None => unreachable!("Swapchain is ready after rebuild"),
    };
    let commands = &mut self.slots.slot_mut(slot_index).commands;
    self
      .recorder
      .record(slot_index, targets, image_index, commands);
    self
      .device
      .record_commands(sync.command_buffer, commands)
      .map_err(|result| FrameError::Record { slot_index, result })?;

    // 5. submit
    let submit_info = FrameSubmitInfo {
      command_buffer: sync.command_buffer,
      wait_semaphore: sync.image_available,
      wait_stage: SUBMIT_WAIT_STAGE,
      signal_semaphore: sync.render_finished,
      fence: sync.in_flight_fence,
    };
    self
      .device
      .queue_submit(&submit_info)
      .map_err(|result| FrameError::Submit { slot_index, result })?;

    // 6. present
    let presented = self
      .device
      .queue_present(swapchain_khr, image_index, sync.render_finished);
    let present_status = PresentStatus::classify(presented, image_index)?;
    let resized = self.resize_signal.take();
    if present_status.is_stale() || self.rebuild_owed || resized {
      debug!(
        "Swapchain needs rebuild after present (status: {:?}, owed: {}, resized: {})",
        present_status, self.rebuild_owed, resized
      );
      self.rebuild_owed = false;
      self.swapchain.mark_stale();
      self.rebuild_swapchain()?;
    }

    // 7. advance
    self.frame_counter += 1;
    Ok(TickOutcome::Presented {
      slot_index,
      image_index,
    })
  }

  /// Wait for the GPU and release slots and swapchain. Further ticks fail.
  pub fn shutdown(&mut self) -> FrameResult<()> {
    if self.state == SchedulerState::Drained {
      return Ok(());
    }
    info!("Frame scheduler shutting down after {} frames", self.frame_counter);

    // release even if the device is lost, destroying objects is still allowed then
    let idle = self.device.device_wait_idle().map_err(FrameError::WaitIdle);
    self.slots.release(&mut self.device);
    self.swapchain.release(&mut self.device);
    self.state = SchedulerState::Drained;
    idle
  }

  /// Returns `false` if drawable area is zero and scheduler got suspended
  fn rebuild_swapchain(&mut self) -> FrameResult<bool> {
    match self.swapchain.rebuild(&mut self.device)? {
      RebuildOutcome::Rebuilt => Ok(true),
      RebuildOutcome::ZeroArea => {
        self.suspend();
        Ok(false)
      }
    }
  }

  fn suspend(&mut self) {
    if self.state == SchedulerState::Running {
      info!("Drawable area is zero, suspending frame scheduler");
      self.state = SchedulerState::Suspended;
    }
  }
}

impl<D: RenderDevice> Drop for FrameScheduler<D> {
  fn drop(&mut self) {
    if let Err(err) = self.shutdown() {
      error!("Frame scheduler shutdown failed: {}", err);
    }
  }
}
