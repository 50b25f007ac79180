use std::{collections::VecDeque, time::Instant};

// Delta times are filtered over _this many_ frames.
const DT_FILTER_WIDTH: usize = 20;

pub type FrameIdx = u64;

/// Heavily inspired by:
/// - https://github.com/EmbarkStudios/kajiya/blob/main/crates/lib/kajiya-simple/src/main_loop.rs#L329
/// - https://github.com/kayru/imgv/blob/main/src/main.rs#L918
pub struct AppTimer {
  frame_idx: FrameIdx,
  /// Provide fake `delta time` for  _this many_ initial frames.
  /// Smooths out simulation etc. at the start.
  fake_dt_for_initial_frames: i32,
  app_start: Instant,
  last_frame_start: Instant,
  delta_time: f32,
  /// Circular buffer for delta times
  dt_queue: VecDeque<f32>,
}

impl AppTimer {
  pub fn new() -> Self {
    let now = Instant::now();
    Self {
      frame_idx: 0,
      fake_dt_for_initial_frames: 2 * (DT_FILTER_WIDTH as i32),
      app_start: now,
      last_frame_start: now,
      delta_time: 0.0,
      dt_queue: VecDeque::with_capacity(DT_FILTER_WIDTH),
    }
  }

  /// Frames marked so far
  pub fn frame_count(&self) -> FrameIdx {
    self.frame_idx
  }

  /// @return delta time in seconds
  pub fn mark_start_frame(&mut self) -> f32 {
    let now = Instant::now();
    let dt_duration = now - self.last_frame_start;
    self.last_frame_start = now;

    self.push_frame_duration(dt_duration.as_secs_f32())
  }

  fn push_frame_duration(&mut self, dt_raw: f32) -> f32 {
    self.frame_idx = self.frame_idx.saturating_add(1);

    let delta_time = if self.fake_dt_for_initial_frames >= 0 {
      self.fake_dt_for_initial_frames -= 1;
      dt_raw.min(1.0 / 60.0)
    } else {
      while self.dt_queue.len() >= DT_FILTER_WIDTH {
        self.dt_queue.pop_front();
      }
      self.dt_queue.push_back(dt_raw);

      self.calc_average_frame_time()
    };

    self.delta_time = delta_time;
    self.delta_time
  }

  fn calc_average_frame_time(&self) -> f32 {
    let sum = self.dt_queue.iter().copied().sum::<f32>();
    let count = self.dt_queue.len();
    sum / (count as f32)
  }

  pub fn delta_time_ms(&self) -> f32 {
    self.delta_time * 1000.0
  }

  /// Seconds since the timer was created
  pub fn elapsed_secs(&self) -> f32 {
    self.app_start.elapsed().as_secs_f32()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn initial_frames_are_capped() {
    let mut timer = AppTimer::new();
    let dt = timer.push_frame_duration(0.5);
    assert_eq!(dt, 1.0 / 60.0);
    assert_eq!(timer.frame_count(), 1);
  }

  #[test]
  fn delta_time_is_averaged_after_warmup() {
    let mut timer = AppTimer::new();
    for _ in 0..(2 * DT_FILTER_WIDTH + 1) {
      timer.push_frame_duration(0.001);
    }
    // warmup frames never enter the filter
    for _ in 0..DT_FILTER_WIDTH {
      timer.push_frame_duration(0.010);
    }
    assert!((timer.delta_time_ms() - 10.0).abs() < 1e-3);

    // single spike is smoothed out
    let dt = timer.push_frame_duration(0.210);
    assert!((dt - 0.020).abs() < 1e-5);
  }

  #[test]
  fn elapsed_is_monotonic() {
    let timer = AppTimer::new();
    let a = timer.elapsed_secs();
    let b = timer.elapsed_secs();
    assert!(b >= a);
  }
}
