use ash::vk;
use log::{debug, info, trace};

use super::{
  FrameError, FrameResult, FrameDevice, RenderTargetSet, SurfaceSupport, SwapchainDesc,
  SwapchainDevice,
};
use crate::vk_utils::{
  choose_image_count, choose_present_mode, choose_surface_format, choose_swap_extent,
  get_pre_transform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainState {
  Ready,
  /// No longer matches the surface, rebuilt before next use
  Stale,
  Rebuilding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
  Rebuilt,
  /// Drawable area is zero, nothing was rebuilt. Still `Stale`.
  ZeroArea,
}

/// Swapchain, its images, and the render targets created for them.
/// Always created and destroyed together.
#[derive(Debug)]
pub struct SwapchainBundle {
  pub swapchain: vk::SwapchainKHR,
  pub images: Vec<vk::Image>,
  pub desc: SwapchainDesc,
  pub render_targets: RenderTargetSet,
}

pub fn is_zero_area(extent: vk::Extent2D) -> bool {
  extent.width == 0 || extent.height == 0
}

/// Apply format/present mode/extent policies to what the surface supports.
pub fn describe_swapchain(
  support: &SurfaceSupport,
  window_extent: vk::Extent2D,
) -> FrameResult<SwapchainDesc> {
  let surface_format = choose_surface_format(&support.formats).ok_or(FrameError::NoSurfaceFormat)?;
  let caps = &support.capabilities;

  Ok(SwapchainDesc {
    surface_format,
    present_mode: choose_present_mode(&support.present_modes),
    extent: choose_swap_extent(caps, window_extent),
    image_count: choose_image_count(caps),
    pre_transform: get_pre_transform(caps),
  })
}

/// Query the surface and create a swapchain with render targets for each of its images.
/// Returns `None` if the drawable area is zero.
pub fn build_swapchain<D: SwapchainDevice>(device: &mut D) -> FrameResult<Option<SwapchainBundle>> {
  let window_extent = device.drawable_extent();
  if is_zero_area(window_extent) {
    return Ok(None);
  }

  let support = device
    .surface_support()
    .map_err(FrameError::SurfaceQuery)?;
  let desc = describe_swapchain(&support, window_extent)?;
  if is_zero_area(desc.extent) {
    return Ok(None);
  }
  trace!("Creating swapchain {:?}", desc);

  let (swapchain, images) = device
    .create_swapchain(&desc)
    .map_err(FrameError::CreateSwapchain)?;
  let render_targets = match device.create_render_targets(&desc, &images) {
    Ok(targets) => targets,
    Err(err) => {
      device.destroy_swapchain(swapchain);
      return Err(FrameError::CreateRenderTargets(err));
    }
  };
  debug_assert_eq!(render_targets.len(), images.len());

  Ok(Some(SwapchainBundle {
    swapchain,
    images,
    desc,
    render_targets,
  }))
}

/// Owns the current swapchain and rebuilds it when it goes stale.
/// Holds no per-frame state.
pub struct SwapchainLifecycle {
  state: SwapchainState,
  current: Option<SwapchainBundle>,
  generation: u64,
}

impl SwapchainLifecycle {
  /// `None` (e.g. window was minimized during setup) starts in `Stale`
  pub fn new(initial: Option<SwapchainBundle>) -> Self {
    let state = match initial {
      Some(_) => SwapchainState::Ready,
      None => SwapchainState::Stale,
    };
    let generation = if initial.is_some() { 1 } else { 0 };
    Self {
      state,
      current: initial,
      generation,
    }
  }

  pub fn state(&self) -> SwapchainState {
    self.state
  }

  pub fn is_stale(&self) -> bool {
    self.state != SwapchainState::Ready
  }

  /// Number of swapchains created so far
  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Current swapchain, only when `Ready`
  pub fn current(&self) -> Option<&SwapchainBundle> {
    match self.state {
      SwapchainState::Ready => self.current.as_ref(),
      _ => None,
    }
  }

  pub fn mark_stale(&mut self) {
    if self.state == SwapchainState::Ready {
      debug!("Swapchain marked as stale");
      self.state = SwapchainState::Stale;
    }
  }

  /// Recreate swapchain and its render targets. Waits for device idle first,
  /// as this is the only point where per-image resources can be destroyed.
  pub fn rebuild<D: FrameDevice + SwapchainDevice>(
    &mut self,
    device: &mut D,
  ) -> FrameResult<RebuildOutcome> {
    if is_zero_area(device.drawable_extent()) {
      return Ok(RebuildOutcome::ZeroArea);
    }

    self.state = SwapchainState::Rebuilding;
    if let Err(result) = device.device_wait_idle() {
      self.state = SwapchainState::Stale;
      return Err(FrameError::WaitIdle(result));
    }
    self.destroy_current(device);

    match build_swapchain(device) {
      Ok(Some(bundle)) => {
        self.generation += 1;
        info!(
          "Swapchain rebuilt (generation {}): {} images, {:?}/{:?}, {:?}, {}x{}",
          self.generation,
          bundle.images.len(),
          bundle.desc.surface_format.format,
          bundle.desc.surface_format.color_space,
          bundle.desc.present_mode,
          bundle.desc.extent.width,
          bundle.desc.extent.height,
        );
        self.current = Some(bundle);
        self.state = SwapchainState::Ready;
        Ok(RebuildOutcome::Rebuilt)
      }
      Ok(None) => {
        self.state = SwapchainState::Stale;
        Ok(RebuildOutcome::ZeroArea)
      }
      Err(err) => {
        self.state = SwapchainState::Stale;
        Err(err)
      }
    }
  }

  /// Destroy current swapchain. Device has to be idle.
  pub fn release<D: SwapchainDevice>(&mut self, device: &mut D) {
    self.destroy_current(device);
    self.state = SwapchainState::Stale;
  }

  fn destroy_current<D: SwapchainDevice>(&mut self, device: &mut D) {
    if let Some(bundle) = self.current.take() {
      device.destroy_render_targets(bundle.render_targets);
      device.destroy_swapchain(bundle.swapchain);
    }
  }
}
