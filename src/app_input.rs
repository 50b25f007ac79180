use log::{debug, info};
use winit::event::{Event, VirtualKeyCode, WindowEvent};

use crate::frame::ResizeSignal;

/// Other implementations:
/// * https://github.com/rukai/winit_input_helper/blob/main/src/current_input.rs
pub struct AppInput {
  pub close_requested: bool,
  pub is_minimized: bool,
  resize_signal: ResizeSignal,
}

impl AppInput {
  pub fn new(resize_signal: ResizeSignal) -> Self {
    Self {
      close_requested: false,
      is_minimized: false,
      resize_signal,
    }
  }

  pub fn handle_event<T>(&mut self, event: &Event<T>) {
    if let Event::WindowEvent { event, .. } = &event {
      self.handle_window_event(event);
    }
  }

  fn handle_window_event(&mut self, event: &WindowEvent) {
    match event {
      // on clicked 'x'
      WindowEvent::CloseRequested => {
        self.close_requested = true;
      }
      // keyboard
      WindowEvent::KeyboardInput { input, .. } => {
        if input.virtual_keycode == Some(VirtualKeyCode::Escape) {
          self.close_requested = true;
        }
      }
      WindowEvent::Resized(next_size) => {
        self.on_resize(next_size.width, next_size.height);
      }
      WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
        self.on_resize(new_inner_size.width, new_inner_size.height);
      }
      WindowEvent::Focused(is_focused) => {
        debug!("Window focus change. Are we in focus: {:?}", is_focused);
      }
      _ => {}
    }
  }

  fn on_resize(&mut self, width: u32, height: u32) {
    let was_minimized = self.is_minimized;
    self.is_minimized = width == 0 || height == 0;
    if was_minimized != self.is_minimized {
      info!("Window minimized: {}", self.is_minimized);
    }
    debug!("Window resized. New size: {}x{}", width, height);
    self.resize_signal.notify();
  }
}
