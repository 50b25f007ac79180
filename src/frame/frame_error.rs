use ash::prelude::VkResult;
use ash::vk;
use thiserror::Error;

/// Failures that end the frame loop. Out-of-date and suboptimal surfaces are
/// never reported here, see `AcquireStatus` and `PresentStatus`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
  #[error("Device lost while waiting for frame slot {slot_index} fence: {result}")]
  DeviceLost { slot_index: usize, result: vk::Result },
  #[error("Failed to reset fence of frame slot {slot_index}: {result}")]
  ResetFence { slot_index: usize, result: vk::Result },
  #[error("Failed to acquire next swapchain image: {0}")]
  AcquireImage(vk::Result),
  #[error("Failed to update per-frame data of frame slot {slot_index}: {result}")]
  PrepareFrame { slot_index: usize, result: vk::Result },
  #[error("Failed to record commands for frame slot {slot_index}: {result}")]
  Record { slot_index: usize, result: vk::Result },
  #[error("Failed to submit commands of frame slot {slot_index}: {result}")]
  Submit { slot_index: usize, result: vk::Result },
  #[error("Failed to present swapchain image {image_index}: {result}")]
  Present { image_index: u32, result: vk::Result },
  #[error("Failed waiting for device idle: {0}")]
  WaitIdle(vk::Result),
  #[error("Failed to create frame slot resources: {0}")]
  CreateFrameSlot(vk::Result),
  #[error("Failed to query surface support: {0}")]
  SurfaceQuery(vk::Result),
  #[error("Surface reported no formats")]
  NoSurfaceFormat,
  #[error("Failed to create swapchain: {0}")]
  CreateSwapchain(vk::Result),
  #[error("Failed to create render targets for swapchain images: {0}")]
  CreateRenderTargets(vk::Result),
  #[error("Frame scheduler was already shut down")]
  Drained,
}

pub type FrameResult<T> = Result<T, FrameError>;

/// Outcome of asking the presentation engine for the next image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireStatus {
  Acquired { image_index: u32, suboptimal: bool },
  OutOfDate,
}

impl AcquireStatus {
  pub fn classify(result: VkResult<(u32, bool)>) -> FrameResult<Self> {
    match result {
      Ok((image_index, suboptimal)) => Ok(AcquireStatus::Acquired {
        image_index,
        suboptimal,
      }),
      Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireStatus::OutOfDate),
      Err(err) => Err(FrameError::AcquireImage(err)),
    }
  }
}

/// Outcome of queueing an image for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentStatus {
  Presented,
  Suboptimal,
  OutOfDate,
}

impl PresentStatus {
  pub fn classify(result: VkResult<bool>, image_index: u32) -> FrameResult<Self> {
    match result {
      Ok(false) => Ok(PresentStatus::Presented),
      Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(PresentStatus::Suboptimal),
      Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentStatus::OutOfDate),
      Err(result) => Err(FrameError::Present {
        image_index,
        result,
      }),
    }
  }

  /// Swapchain no longer matches the surface and has to be rebuilt
  pub fn is_stale(&self) -> bool {
    *self != PresentStatus::Presented
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn acquire_out_of_date_is_a_status() {
    let status = AcquireStatus::classify(Err(vk::Result::ERROR_OUT_OF_DATE_KHR));
    assert_eq!(status, Ok(AcquireStatus::OutOfDate));
  }

  #[test]
  fn acquire_suboptimal_keeps_image_index() {
    let status = AcquireStatus::classify(Ok((2, true)));
    assert_eq!(
      status,
      Ok(AcquireStatus::Acquired {
        image_index: 2,
        suboptimal: true
      })
    );
  }

  #[test]
  fn acquire_other_errors_are_fatal() {
    let status = AcquireStatus::classify(Err(vk::Result::ERROR_DEVICE_LOST));
    assert_eq!(
      status,
      Err(FrameError::AcquireImage(vk::Result::ERROR_DEVICE_LOST))
    );
    let status = AcquireStatus::classify(Err(vk::Result::ERROR_SURFACE_LOST_KHR));
    assert!(status.is_err());
  }

  #[test]
  fn present_statuses() {
    assert_eq!(
      PresentStatus::classify(Ok(false), 0),
      Ok(PresentStatus::Presented)
    );
    assert_eq!(
      PresentStatus::classify(Ok(true), 0),
      Ok(PresentStatus::Suboptimal)
    );
    assert_eq!(
      PresentStatus::classify(Err(vk::Result::ERROR_OUT_OF_DATE_KHR), 0),
      Ok(PresentStatus::OutOfDate)
    );
    assert!(!PresentStatus::Presented.is_stale());
    assert!(PresentStatus::Suboptimal.is_stale());
    assert!(PresentStatus::OutOfDate.is_stale());
  }

  #[test]
  fn present_failure_names_the_image() {
    let err = PresentStatus::classify(Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY), 3);
    assert_eq!(
      err,
      Err(FrameError::Present {
        image_index: 3,
        result: vk::Result::ERROR_OUT_OF_HOST_MEMORY
      })
    );
  }
}
