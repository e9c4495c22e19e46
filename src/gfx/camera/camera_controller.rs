use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Pixels of a touchpad scroll that count as one wheel notch
const PIXELS_PER_LINE: f32 = 50.0;

/// Residual motion below this is dropped so damping settles
const SETTLE_EPSILON: f32 = 1e-6;

/// Mouse-driven orbit controller with optional damping
///
/// Input events only accumulate deltas. [`update`](Self::update) is called
/// once per frame and moves the camera by `damping_factor` of the pending
/// rotation and pan, decaying the remainder, so motion glides to a stop.
/// Zoom is applied in full on the next update.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    is_shift_held: bool,
    is_mouse_pressed: bool,
    yaw_delta: f32,
    pitch_delta: f32,
    pan_delta: (f32, f32),
    zoom_scale: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            enable_damping: false,
            damping_factor: 0.05,
            is_shift_held: false,
            is_mouse_pressed: false,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            pan_delta: (0.0, 0.0),
            zoom_scale: 1.0,
        }
    }

    /// Builder pattern: Enable damping with the given factor in (0, 1]
    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = damping_factor.clamp(f32::EPSILON, 1.0);
        self
    }

    /// Tracks the left button from window events
    ///
    /// Raw `DeviceEvent::Button` ids differ between platforms and Wayland
    /// never sends them, so the press state comes from the window instead.
    pub fn process_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.is_mouse_pressed = state == ElementState::Pressed;
        }
    }

    /// Raw motion and wheel input; motion only counts while the left button is down
    pub fn process_events(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / PIXELS_PER_LINE
                    }
                };
                self.zoom(notches);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    self.drag(delta.0 as f32, delta.1 as f32);
                }
            }
            _ => (),
        }
    }

    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut OrbitCamera) {
        match event {
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::ShiftLeft | KeyCode::ShiftRight),
                state,
                ..
            } => {
                self.is_shift_held = *state == ElementState::Pressed;
            }
            KeyEvent {
                physical_key: PhysicalKey::Code(KeyCode::KeyC),
                state: ElementState::Pressed,
                ..
            } => {
                // Reset camera when Shift+C is pressed
                if self.is_shift_held {
                    log::info!("Resetting camera to default position");
                    self.stop();
                    camera.reset_to_default();
                }
            }
            _ => (),
        }
    }

    /// Positive notches zoom in
    pub fn zoom(&mut self, notches: f32) {
        self.zoom_scale *= 0.95f32.powf(notches * self.zoom_speed);
    }

    /// Drag by a mouse delta in pixels; pans while Shift is held, orbits otherwise
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if self.is_shift_held {
            self.pan_delta.0 += -dx * self.pan_speed;
            self.pan_delta.1 += dy * self.pan_speed;
        } else {
            self.yaw_delta += -dx * self.rotate_speed;
            self.pitch_delta += dy * self.rotate_speed;
        }
    }

    /// Drops all pending motion
    pub fn stop(&mut self) {
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
        self.pan_delta = (0.0, 0.0);
        self.zoom_scale = 1.0;
    }

    /// Moves the camera toward the accumulated input target
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        if self.yaw_delta != 0.0 {
            camera.add_yaw(self.yaw_delta * step);
        }
        if self.pitch_delta != 0.0 {
            camera.add_pitch(self.pitch_delta * step);
        }
        if self.pan_delta != (0.0, 0.0) {
            camera.pan((self.pan_delta.0 * step, self.pan_delta.1 * step));
        }
        if self.zoom_scale != 1.0 {
            camera.scale_distance(self.zoom_scale);
            self.zoom_scale = 1.0;
        }

        let keep = 1.0 - step;
        self.yaw_delta = settle(self.yaw_delta * keep);
        self.pitch_delta = settle(self.pitch_delta * keep);
        self.pan_delta = (
            settle(self.pan_delta.0 * keep),
            settle(self.pan_delta.1 * keep),
        );
    }

    /// Whether any damped motion is still pending
    pub fn is_moving(&self) -> bool {
        self.yaw_delta != 0.0 || self.pitch_delta != 0.0 || self.pan_delta != (0.0, 0.0)
    }
}

fn settle(value: f32) -> f32 {
    if value.abs() < SETTLE_EPSILON {
        0.0
    } else {
        value
    }
}
