use anyhow::Context;
use log::{error, info};
use winit::{
  dpi::LogicalSize,
  event::Event,
  event_loop::{ControlFlow, EventLoop},
  window::WindowBuilder,
};

use crate::app_input::AppInput;
use crate::config::Config;
use crate::frame::{build_swapchain, FrameScheduler, ResizeSignal};
use crate::vk_ctx::{vk_ctx_initialize, VkCtx};

mod app_input;
mod app_timer;
mod config;
mod frame;
mod scene;
mod vk_ctx;
mod vk_utils;

// glslangValidator -V src/shaders/triangle.vert.glsl -o src/shaders-compiled/triangle.vert.spv
// glslangValidator -V src/shaders/triangle.frag.glsl -o src/shaders-compiled/triangle.frag.spv
// spirv-dis src/shaders-compiled/triangle.vert.spv

/// Drain the GPU, release frame resources, then the whole Vulkan context
fn shutdown_scheduler(scheduler: Option<FrameScheduler<VkCtx>>) {
  if let Some(mut scheduler) = scheduler {
    if let Err(err) = scheduler.shutdown() {
      error!("Shutdown failed: {}", err);
    }
    info!("Rendered {} frames", scheduler.frame_counter());
  }
}

fn main() -> anyhow::Result<()> {
  let config = Config::new();
  simple_logger::SimpleLogger::new()
    .with_level(config.log_level)
    .init()
    .context("Failed to init logger")?;
  info!("-- Start --");

  // init window
  let event_loop = EventLoop::new();
  let window = WindowBuilder::new()
    .with_title(&config.window_title)
    .with_resizable(config.window_resizable)
    .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
    .build(&event_loop)
    .context("Failed to create window")?;

  // init renderer
  let mut vk_ctx = vk_ctx_initialize(window, config).context("Vulkan init failed")?;
  let initial_swapchain =
    build_swapchain(&mut vk_ctx).context("Failed to create initial swapchain")?;
  let frames_in_flight = vk_ctx.frames_in_flight();
  let bindings = vk_ctx.draw_bindings();
  let resize_signal = ResizeSignal::new();
  let scheduler = FrameScheduler::initialize(
    vk_ctx,
    frames_in_flight,
    bindings,
    initial_swapchain,
    resize_signal.clone(),
  )
  .context("Failed to create frame scheduler")?;
  info!("Render init went OK!");

  // last pre-run ops
  let mut app_input = AppInput::new(resize_signal);
  // `run` never returns, teardown happens in `LoopDestroyed`
  let mut scheduler = Some(scheduler);
  info!("Starting event loop");

  // start event loop
  event_loop.run(move |event, _, control_flow| {
    app_input.handle_event(&event);
    *control_flow = if app_input.is_minimized {
      ControlFlow::Wait
    } else {
      ControlFlow::Poll
    };

    match event {
      Event::MainEventsCleared => {
        if app_input.close_requested {
          *control_flow = ControlFlow::Exit;
          return;
        }
        if let Some(s) = scheduler.as_mut() {
          if let Err(err) = s.tick() {
            error!("Fatal frame error: {}", err);
            shutdown_scheduler(scheduler.take());
            *control_flow = ControlFlow::ExitWithCode(1);
          }
        }
      }

      // before destroy
      Event::LoopDestroyed => {
        info!("EventLoop is shutting down");
        shutdown_scheduler(scheduler.take());
      }

      // default
      _ => (),
    }
  });
}
