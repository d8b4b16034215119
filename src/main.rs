mod camera_controller;
mod renderer;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use camera_controller::{CameraController, InputOutcome};
use renderer::State;
use terrain_viewer::sim::TICK_INTERVAL;
use terrain_viewer::{FixedClock, Viewer, ViewerConfig};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

const INSTRUCTIONS: &str = "Move the camera with W/S/A/D and mouse. \
    F cycles filled/wire/doubled rendering, H toggles Gouraud shading, \
    L toggles lighting, M swaps quad and triangle meshes, R generates new terrain, \
    Q or Escape quits.";

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    state: Option<State>,
    viewer: Viewer,
    controller: CameraController,
    clock: FixedClock,
}

impl App {
    fn new(config: ViewerConfig, seed: u64) -> Self {
        Self {
            viewer: Viewer::new(config.grid, seed),
            config,
            window: None,
            state: None,
            controller: CameraController::new(),
            clock: FixedClock::new(TICK_INTERVAL, Instant::now()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
            .is_err()
        {
            log::warn!("cursor grab unavailable, pointer may leave the window");
        }
        window.set_cursor_visible(false);
        self.window = Some(window.clone());

        match pollster::block_on(State::new(window, &self.viewer)) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("failed to create renderer: {e:#}");
                event_loop.exit();
            }
        }
        self.clock = FixedClock::new(TICK_INTERVAL, Instant::now());
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.controller.process_mouse_motion(delta.0, delta.1);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let window = match self.window.as_ref() {
            Some(w) => w,
            None => return,
        };
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        if id != window.id() {
            return;
        }

        match self.controller.process_events(&event, &mut self.viewer) {
            InputOutcome::Quit => {
                event_loop.exit();
                return;
            }
            InputOutcome::Handled => {
                window.request_redraw();
                return;
            }
            InputOutcome::Ignored => {}
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            // Key releases are not delivered everywhere once focus is gone.
            WindowEvent::Focused(false) => self.viewer.release_movement(),
            WindowEvent::Resized(physical_size) => {
                state.resize(physical_size);
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => match state.render(&self.viewer) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                Err(e) => log::warn!("{e:?}"),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.controller.update_camera(&mut self.viewer);

        let ticks = self.clock.advance(Instant::now());
        for _ in 0..ticks {
            self.viewer.tick();
        }

        if ticks > 0 {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.next_deadline()));
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let config = ViewerConfig::from_env()?;
    let seed = config.seed.unwrap_or_else(rand::random);

    log::info!("{INSTRUCTIONS}");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, seed);
    event_loop.run_app(&mut app)?;
    Ok(())
}
