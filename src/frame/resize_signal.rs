use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag raised by the window layer when the drawable area changed.
/// Cloned handles share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ResizeSignal {
  pending: Arc<AtomicBool>,
}

impl ResizeSignal {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn notify(&self) {
    self.pending.store(true, Ordering::Release);
  }

  pub fn is_pending(&self) -> bool {
    self.pending.load(Ordering::Acquire)
  }

  /// Returns `true` if a resize was signaled since the last call, and clears it
  pub fn take(&self) -> bool {
    self.pending.swap(false, Ordering::AcqRel)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn take_clears_flag() {
    let signal = ResizeSignal::new();
    assert!(!signal.take());

    signal.notify();
    signal.notify();
    assert!(signal.is_pending());
    assert!(signal.take());
    assert!(!signal.is_pending());
    assert!(!signal.take());
  }

  #[test]
  fn clones_share_flag() {
    let window_side = ResizeSignal::new();
    let scheduler_side = window_side.clone();
    window_side.notify();
    assert!(scheduler_side.take());
    assert!(!window_side.is_pending());
  }
}
