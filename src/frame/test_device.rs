//! In-memory device for frame loop tests. Hands out fake handles, tracks fence and
//! semaphore states, and panics on anything the Vulkan validation layers would report.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use ash::prelude::VkResult;
use ash::vk;
use ash::vk::Handle;

use super::{
  CommandSequence, DrawBindings, FrameDevice, FrameSubmitInfo, IndexBinding, RenderTarget,
  RenderTargetSet, ResizeSignal, SurfaceSupport, SwapchainDesc, SwapchainDevice,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
  WaitFence {
    fence: vk::Fence,
    /// Fence was pending, so a real device would block here
    blocked: bool,
  },
  ResetFence {
    fence: vk::Fence,
  },
  Acquire {
    swapchain: vk::SwapchainKHR,
    signal_semaphore: vk::Semaphore,
  },
  PrepareFrame {
    slot_index: usize,
  },
  Record {
    command_buffer: vk::CommandBuffer,
  },
  Submit {
    command_buffer: vk::CommandBuffer,
    wait_semaphore: vk::Semaphore,
    wait_stage: vk::PipelineStageFlags,
    signal_semaphore: vk::Semaphore,
    fence: vk::Fence,
  },
  Present {
    swapchain: vk::SwapchainKHR,
    image_index: u32,
    wait_semaphore: vk::Semaphore,
  },
  WaitIdle,
  CreateSwapchain {
    swapchain: vk::SwapchainKHR,
  },
  Destroy {
    handle: u64,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceState {
  Signaled,
  Unsignaled,
  Pending,
}

#[derive(Default)]
struct LiveObjects {
  sync_objects: HashSet<u64>,
  swapchains: HashSet<u64>,
  framebuffers: HashSet<u64>,
}

/// Shared view of live objects, still readable after the device was moved or dropped.
#[derive(Clone, Default)]
pub struct DeviceTracker(Rc<RefCell<LiveObjects>>);

impl DeviceTracker {
  /// Semaphores, fences and command buffers
  pub fn live_object_count(&self) -> usize {
    self.0.borrow().sync_objects.len()
  }

  pub fn live_swapchain_count(&self) -> usize {
    self.0.borrow().swapchains.len()
  }

  pub fn live_render_target_count(&self) -> usize {
    self.0.borrow().framebuffers.len()
  }
}

pub struct TestDevice {
  next_handle: u64,
  live: DeviceTracker,
  events: Vec<DeviceEvent>,
  // sync
  fences: HashMap<vk::Fence, FenceState>,
  signaled_semaphores: HashSet<vk::Semaphore>,
  in_flight_command_buffers: HashMap<vk::CommandBuffer, vk::Fence>,
  max_pending: usize,
  // surface
  window_extent: vk::Extent2D,
  scripted_extents: VecDeque<vk::Extent2D>,
  surface_formats: Vec<vk::SurfaceFormatKHR>,
  present_modes: Vec<vk::PresentModeKHR>,
  image_count: u32,
  /// Image count and next image to hand out, per live swapchain
  swapchain_images: HashMap<vk::SwapchainKHR, (u32, u32)>,
  resize_signal: ResizeSignal,
  notify_resize_on_present: bool,
  // scripted results
  acquire_results: VecDeque<VkResult<(u32, bool)>>,
  present_results: VecDeque<VkResult<bool>>,
  creation_calls: u64,
  fail_creation: Option<(u64, vk::Result)>,
  fail_fence_wait: Option<vk::Result>,
  fail_submit: Option<vk::Result>,
  fail_render_targets: Option<vk::Result>,
}

impl TestDevice {
  pub fn new() -> Self {
    Self {
      next_handle: 1,
      live: DeviceTracker::default(),
      events: Vec::new(),
      fences: HashMap::new(),
      signaled_semaphores: HashSet::new(),
      in_flight_command_buffers: HashMap::new(),
      max_pending: 0,
      window_extent: vk::Extent2D {
        width: 800,
        height: 600,
      },
      scripted_extents: VecDeque::new(),
      surface_formats: vec![
        vk::SurfaceFormatKHR {
          format: vk::Format::B8G8R8A8_UNORM,
          color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
          format: vk::Format::B8G8R8A8_SRGB,
          color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
      ],
      present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
      image_count: 3,
      swapchain_images: HashMap::new(),
      resize_signal: ResizeSignal::new(),
      notify_resize_on_present: false,
      acquire_results: VecDeque::new(),
      present_results: VecDeque::new(),
      creation_calls: 0,
      fail_creation: None,
      fail_fence_wait: None,
      fail_submit: None,
      fail_render_targets: None,
    }
  }

  ///////////////////////////
  // scripting

  pub fn set_window_extent(&mut self, extent: vk::Extent2D) {
    self.window_extent = extent;
  }

  /// Returned by the next `drawable_extent` calls, before falling back to window extent
  pub fn push_extents(&mut self, extents: &[vk::Extent2D]) {
    self.scripted_extents.extend(extents.iter().copied());
  }

  pub fn set_surface_formats(&mut self, formats: Vec<vk::SurfaceFormatKHR>) {
    self.surface_formats = formats;
  }

  /// Images in swapchains created from now on
  pub fn set_image_count(&mut self, count: u32) {
    self.image_count = count;
  }

  pub fn push_acquire_result(&mut self, result: VkResult<(u32, bool)>) {
    self.acquire_results.push_back(result);
  }

  pub fn push_present_result(&mut self, result: VkResult<bool>) {
    self.present_results.push_back(result);
  }

  /// Counted from now, the `n`-th (1-based) semaphore/fence/command buffer creation fails
  pub fn fail_nth_creation(&mut self, n: u64, result: vk::Result) {
    self.fail_creation = Some((self.creation_calls + n, result));
  }

  pub fn fail_next_fence_wait(&mut self, result: vk::Result) {
    self.fail_fence_wait = Some(result);
  }

  pub fn fail_next_submit(&mut self, result: vk::Result) {
    self.fail_submit = Some(result);
  }

  pub fn fail_next_render_targets(&mut self, result: vk::Result) {
    self.fail_render_targets = Some(result);
  }

  /// Shares the flag raised by `notify_resize_on_next_present`
  pub fn resize_signal(&self) -> ResizeSignal {
    self.resize_signal.clone()
  }

  pub fn notify_resize_on_next_present(&mut self) {
    self.notify_resize_on_present = true;
  }

  pub fn draw_bindings(&mut self, slot_count: usize) -> DrawBindings {
    DrawBindings {
      pipeline_layout: vk::PipelineLayout::from_raw(self.new_handle()),
      vertex_buffer: vk::Buffer::from_raw(self.new_handle()),
      index_buffer: Some(IndexBinding {
        buffer: vk::Buffer::from_raw(self.new_handle()),
        index_type: vk::IndexType::UINT16,
      }),
      element_count: 6,
      descriptor_sets: (0..slot_count)
        .map(|_| vk::DescriptorSet::from_raw(self.new_handle()))
        .collect(),
      clear_color: [0.0, 0.0, 0.0, 1.0],
    }
  }

  ///////////////////////////
  // inspection

  pub fn tracker(&self) -> DeviceTracker {
    self.live.clone()
  }

  pub fn events(&self) -> &[DeviceEvent] {
    &self.events
  }

  pub fn fence_waits(&self) -> Vec<(vk::Fence, bool)> {
    self
      .events
      .iter()
      .filter_map(|e| match e {
        DeviceEvent::WaitFence { fence, blocked } => Some((*fence, *blocked)),
        _ => None,
      })
      .collect()
  }

  fn count_events(&self, pred: impl Fn(&DeviceEvent) -> bool) -> usize {
    self.events.iter().filter(|e| pred(e)).count()
  }

  pub fn acquire_count(&self) -> usize {
    self.count_events(|e| matches!(e, DeviceEvent::Acquire { .. }))
  }

  pub fn submit_count(&self) -> usize {
    self.count_events(|e| matches!(e, DeviceEvent::Submit { .. }))
  }

  pub fn present_count(&self) -> usize {
    self.count_events(|e| matches!(e, DeviceEvent::Present { .. }))
  }

  pub fn wait_idle_count(&self) -> usize {
    self.count_events(|e| matches!(e, DeviceEvent::WaitIdle))
  }

  pub fn pending_submission_count(&self) -> usize {
    self
      .fences
      .values()
      .filter(|s| **s == FenceState::Pending)
      .count()
  }

  pub fn max_pending_submissions(&self) -> usize {
    self.max_pending
  }

  pub fn live_object_count(&self) -> usize {
    self.live.live_object_count()
  }

  pub fn live_swapchain_count(&self) -> usize {
    self.live.live_swapchain_count()
  }

  pub fn live_render_target_count(&self) -> usize {
    self.live.live_render_target_count()
  }

  ///////////////////////////
  // internals

  fn new_handle(&mut self) -> u64 {
    let handle = self.next_handle;
    self.next_handle += 1;
    handle
  }

  fn new_sync_object(&mut self) -> VkResult<u64> {
    self.creation_calls += 1;
    if let Some((n, result)) = self.fail_creation {
      if n == self.creation_calls {
        self.fail_creation = None;
        return Err(result);
      }
    }
    let handle = self.new_handle();
    self.live.0.borrow_mut().sync_objects.insert(handle);
    Ok(handle)
  }

  fn destroy_sync_object(&mut self, handle: u64) {
    let removed = self.live.0.borrow_mut().sync_objects.remove(&handle);
    assert!(removed, "Destroyed unknown or already destroyed object {}", handle);
    self.events.push(DeviceEvent::Destroy { handle });
  }

  fn assert_idle(&self, what: &str) {
    assert_eq!(
      self.pending_submission_count(),
      0,
      "Destroying {} while GPU work is in flight",
      what
    );
  }

  fn complete_fence(&mut self, fence: vk::Fence) {
    self.fences.insert(fence, FenceState::Signaled);
    self.in_flight_command_buffers.retain(|_, f| *f != fence);
  }
}

impl FrameDevice for TestDevice {
  fn create_semaphore(&mut self) -> VkResult<vk::Semaphore> {
    self.new_sync_object().map(vk::Semaphore::from_raw)
  }

  fn create_fence(&mut self) -> VkResult<vk::Fence> {
    let fence = vk::Fence::from_raw(self.new_sync_object()?);
    self.fences.insert(fence, FenceState::Signaled);
    Ok(fence)
  }

  fn allocate_command_buffer(&mut self) -> VkResult<vk::CommandBuffer> {
    self.new_sync_object().map(vk::CommandBuffer::from_raw)
  }

  fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
    self.signaled_semaphores.remove(&semaphore);
    self.destroy_sync_object(semaphore.as_raw());
  }

  fn destroy_fence(&mut self, fence: vk::Fence) {
    let state = self.fences.remove(&fence);
    assert_ne!(state, Some(FenceState::Pending), "Destroyed fence in use");
    self.destroy_sync_object(fence.as_raw());
  }

  fn free_command_buffer(&mut self, command_buffer: vk::CommandBuffer) {
    assert!(
      !self.in_flight_command_buffers.contains_key(&command_buffer),
      "Freed command buffer in use"
    );
    self.destroy_sync_object(command_buffer.as_raw());
  }

  fn wait_for_fence(&mut self, fence: vk::Fence, _timeout: u64) -> VkResult<()> {
    if let Some(result) = self.fail_fence_wait.take() {
      return Err(result);
    }
    let blocked = match self.fences.get(&fence) {
      Some(FenceState::Pending) => true,
      Some(FenceState::Signaled) => false,
      Some(FenceState::Unsignaled) => panic!("Waiting on fence {:?} that was never submitted", fence),
      None => panic!("Waiting on unknown fence {:?}", fence),
    };
    self.complete_fence(fence);
    self.events.push(DeviceEvent::WaitFence { fence, blocked });
    Ok(())
  }

  fn reset_fence(&mut self, fence: vk::Fence) -> VkResult<()> {
    match self.fences.get(&fence) {
      Some(FenceState::Pending) => panic!("Reset of fence {:?} that is in use", fence),
      None => panic!("Reset of unknown fence {:?}", fence),
      _ => (),
    }
    self.fences.insert(fence, FenceState::Unsignaled);
    self.events.push(DeviceEvent::ResetFence { fence });
    Ok(())
  }

  fn acquire_next_image(
    &mut self,
    swapchain: vk::SwapchainKHR,
    _timeout: u64,
    signal_semaphore: vk::Semaphore,
  ) -> VkResult<(u32, bool)> {
    assert!(
      self.live.0.borrow().swapchains.contains(&swapchain.as_raw()),
      "Acquire from destroyed swapchain"
    );
    let result = match self.acquire_results.pop_front() {
      Some(result) => result,
      None => {
        let (count, next) = self
          .swapchain_images
          .get_mut(&swapchain)
          .expect("Acquire from swapchain with no images");
        let index = *next % *count;
        *next += 1;
        Ok((index, false))
      }
    };
    self.events.push(DeviceEvent::Acquire {
      swapchain,
      signal_semaphore,
    });
    if result.is_ok() {
      let fresh = self.signaled_semaphores.insert(signal_semaphore);
      assert!(fresh, "Acquire signals semaphore that is already signaled");
    }
    result
  }

  fn prepare_frame(&mut self, slot_index: usize, _extent: vk::Extent2D) -> VkResult<()> {
    self.events.push(DeviceEvent::PrepareFrame { slot_index });
    Ok(())
  }

  fn record_commands(
    &mut self,
    command_buffer: vk::CommandBuffer,
    commands: &CommandSequence,
  ) -> VkResult<()> {
    assert!(
      !self.in_flight_command_buffers.contains_key(&command_buffer),
      "Recording command buffer that is still in flight"
    );
    assert!(!commands.commands().is_empty(), "Recorded empty command sequence");
    self.events.push(DeviceEvent::Record { command_buffer });
    Ok(())
  }

  fn queue_submit(&mut self, info: &FrameSubmitInfo) -> VkResult<()> {
    if let Some(result) = self.fail_submit.take() {
      return Err(result);
    }
    assert!(
      self.signaled_semaphores.remove(&info.wait_semaphore),
      "Submit waits on semaphore nothing signaled"
    );
    assert_eq!(
      self.fences.get(&info.fence),
      Some(&FenceState::Unsignaled),
      "Submit with fence that was not reset"
    );
    assert!(
      !self
        .in_flight_command_buffers
        .contains_key(&info.command_buffer),
      "Submit of command buffer that is still in flight"
    );
    let fresh = self.signaled_semaphores.insert(info.signal_semaphore);
    assert!(fresh, "Submit signals semaphore that is already signaled");

    self.fences.insert(info.fence, FenceState::Pending);
    self
      .in_flight_command_buffers
      .insert(info.command_buffer, info.fence);
    self.max_pending = self.max_pending.max(self.pending_submission_count());
    self.events.push(DeviceEvent::Submit {
      command_buffer: info.command_buffer,
      wait_semaphore: info.wait_semaphore,
      wait_stage: info.wait_stage,
      signal_semaphore: info.signal_semaphore,
      fence: info.fence,
    });
    Ok(())
  }

  fn queue_present(
    &mut self,
    swapchain: vk::SwapchainKHR,
    image_index: u32,
    wait_semaphore: vk::Semaphore,
  ) -> VkResult<bool> {
    assert!(
      self.signaled_semaphores.remove(&wait_semaphore),
      "Present waits on semaphore nothing signaled"
    );
    self.events.push(DeviceEvent::Present {
      swapchain,
      image_index,
      wait_semaphore,
    });
    if self.notify_resize_on_present {
      self.notify_resize_on_present = false;
      self.resize_signal.notify();
    }
    self.present_results.pop_front().unwrap_or(Ok(false))
  }

  fn device_wait_idle(&mut self) -> VkResult<()> {
    let pending: Vec<vk::Fence> = self
      .fences
      .iter()
      .filter(|(_, s)| **s == FenceState::Pending)
      .map(|(f, _)| *f)
      .collect();
    for fence in pending {
      self.complete_fence(fence);
    }
    self.events.push(DeviceEvent::WaitIdle);
    Ok(())
  }
}

impl SwapchainDevice for TestDevice {
  fn drawable_extent(&mut self) -> vk::Extent2D {
    self
      .scripted_extents
      .pop_front()
      .unwrap_or(self.window_extent)
  }

  fn surface_support(&mut self) -> VkResult<SurfaceSupport> {
    Ok(SurfaceSupport {
      capabilities: vk::SurfaceCapabilitiesKHR {
        min_image_count: 2,
        max_image_count: 8,
        // extent is decided by the swapchain
        current_extent: vk::Extent2D {
          width: u32::MAX,
          height: u32::MAX,
        },
        min_image_extent: vk::Extent2D {
          width: 1,
          height: 1,
        },
        max_image_extent: vk::Extent2D {
          width: 4096,
          height: 4096,
        },
        max_image_array_layers: 1,
        supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        supported_composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
        supported_usage_flags: vk::ImageUsageFlags::COLOR_ATTACHMENT,
      },
      formats: self.surface_formats.clone(),
      present_modes: self.present_modes.clone(),
    })
  }

  fn create_swapchain(
    &mut self,
    _desc: &SwapchainDesc,
  ) -> VkResult<(vk::SwapchainKHR, Vec<vk::Image>)> {
    let swapchain = vk::SwapchainKHR::from_raw(self.new_handle());
    let images = (0..self.image_count)
      .map(|_| vk::Image::from_raw(self.new_handle()))
      .collect();
    self
      .live
      .0
      .borrow_mut()
      .swapchains
      .insert(swapchain.as_raw());
    self
      .swapchain_images
      .insert(swapchain, (self.image_count, 0));
    self.events.push(DeviceEvent::CreateSwapchain { swapchain });
    Ok((swapchain, images))
  }

  fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
    self.assert_idle("swapchain");
    let removed = self
      .live
      .0
      .borrow_mut()
      .swapchains
      .remove(&swapchain.as_raw());
    assert!(removed, "Destroyed unknown swapchain");
    self.swapchain_images.remove(&swapchain);
    self.events.push(DeviceEvent::Destroy {
      handle: swapchain.as_raw(),
    });
  }

  fn create_render_targets(
    &mut self,
    desc: &SwapchainDesc,
    images: &[vk::Image],
  ) -> VkResult<RenderTargetSet> {
    if let Some(result) = self.fail_render_targets.take() {
      return Err(result);
    }
    let targets: Vec<RenderTarget> = images
      .iter()
      .map(|&image| RenderTarget {
        image,
        image_view: vk::ImageView::from_raw(self.new_handle()),
        framebuffer: vk::Framebuffer::from_raw(self.new_handle()),
      })
      .collect();
    {
      let mut live = self.live.0.borrow_mut();
      for target in &targets {
        live.framebuffers.insert(target.framebuffer.as_raw());
      }
    }
    Ok(RenderTargetSet {
      render_pass: vk::RenderPass::from_raw(self.new_handle()),
      pipeline: vk::Pipeline::from_raw(self.new_handle()),
      format: desc.surface_format.format,
      extent: desc.extent,
      targets,
    })
  }

  fn destroy_render_targets(&mut self, targets: RenderTargetSet) {
    self.assert_idle("render targets");
    for target in targets.targets {
      let handle = target.framebuffer.as_raw();
      let removed = self.live.0.borrow_mut().framebuffers.remove(&handle);
      assert!(removed, "Destroyed unknown framebuffer");
      self.events.push(DeviceEvent::Destroy { handle });
    }
  }
}
