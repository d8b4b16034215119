use terrain_viewer::{MoveDirection, Viewer};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// What the app loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Handled,
    Quit,
}

/// Maps window events onto the viewer's movement flags, rotation and toggles.
#[derive(Default)]
pub struct CameraController {
    mouse_delta_x: f32,
    mouse_delta_y: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_events(&mut self, event: &WindowEvent, viewer: &mut Viewer) -> InputOutcome {
        let WindowEvent::KeyboardInput { event: key_event, .. } = event else {
            return InputOutcome::Ignored;
        };
        let pressed = key_event.state == ElementState::Pressed;

        if let Some(direction) = movement_key(key_event) {
            viewer.set_movement(direction, pressed);
            return InputOutcome::Handled;
        }
        if !pressed || key_event.repeat {
            return InputOutcome::Ignored;
        }

        match &key_event.logical_key {
            Key::Named(NamedKey::Escape) => InputOutcome::Quit,
            Key::Character(c) => match c.to_lowercase().as_str() {
                "q" => InputOutcome::Quit,
                "r" => {
                    viewer.regenerate();
                    InputOutcome::Handled
                }
                "f" => {
                    viewer.display.cycle_render_mode();
                    log_status(viewer);
                    InputOutcome::Handled
                }
                "h" => {
                    viewer.display.toggle_shading();
                    log_status(viewer);
                    InputOutcome::Handled
                }
                "l" => {
                    viewer.display.toggle_lighting();
                    log_status(viewer);
                    InputOutcome::Handled
                }
                "m" => {
                    viewer.display.toggle_mesh_mode();
                    log_status(viewer);
                    InputOutcome::Handled
                }
                _ => InputOutcome::Ignored,
            },
            _ => InputOutcome::Ignored,
        }
    }

    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.mouse_delta_x += delta_x as f32;
        self.mouse_delta_y += delta_y as f32;
    }

    /// Hands the pointer motion gathered since the last call to the camera.
    pub fn update_camera(&mut self, viewer: &mut Viewer) {
        if self.mouse_delta_x != 0.0 || self.mouse_delta_y != 0.0 {
            viewer.pointer_motion(self.mouse_delta_x, self.mouse_delta_y);
        }
        self.mouse_delta_x = 0.0;
        self.mouse_delta_y = 0.0;
    }
}

fn movement_key(key_event: &KeyEvent) -> Option<MoveDirection> {
    let Key::Character(c) = &key_event.logical_key else {
        return None;
    };
    match c.to_lowercase().as_str() {
        "w" => Some(MoveDirection::Forward),
        "s" => Some(MoveDirection::Backward),
        "a" => Some(MoveDirection::StrafeLeft),
        "d" => Some(MoveDirection::StrafeRight),
        _ => None,
    }
}

fn log_status(viewer: &Viewer) {
    log::info!("{}", viewer.status_lines().join(" | "));
}
