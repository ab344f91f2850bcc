//! Orbit-style camera controls.
//!
//! Input events only accumulate motion. The motion is applied to the camera in
//! [`InputController::update`], which the frame loop calls once per tick. With
//! damping enabled every update applies a fraction of the pending motion and
//! decays the rest, so the camera keeps gliding for a few frames after the
//! pointer stops.

use std::f32::consts::PI;

use cgmath::{Angle, EuclideanSpace, InnerSpace, Rad, Vector2, Vector3, Zero};
use winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{camera::PerspectiveCamera, data_structures::instance::Transform};

const EPS: f32 = 1e-6;

/// Translates user input into camera motion.
pub trait InputController {
    /// Feed one window event. Events the controller doesn't use are ignored.
    fn handle_window_event(&mut self, event: &WindowEvent);

    /// Apply pending motion to the camera. Returns `true` if the camera moved.
    fn update(&mut self, transform: &mut Transform, camera: &mut PerspectiveCamera) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Pixels panned per arrow key press.
    pub key_pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    // pending motion
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_pixels: Vector2<f32>,
    pan_offset: Vector3<f32>,
    // pointer state
    drag: Option<Drag>,
    cursor: Option<Vector2<f32>>,
    viewport_height: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            key_pan_speed: 7.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_pixels: Vector2::zero(),
            pan_offset: Vector3::zero(),
            drag: None,
            cursor: None,
            viewport_height: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new(enable_damping: bool, damping_factor: f32) -> Self {
        Self {
            enable_damping,
            damping_factor,
            ..Default::default()
        }
    }

    /// Height of the drawing surface in the same unit as cursor positions.
    /// Drag distances are measured relative to it.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(1.0);
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// `factor < 1` moves the camera towards the target.
    pub fn dolly(&mut self, factor: f32) {
        if factor > 0.0 && factor.is_finite() {
            self.scale *= factor;
        }
    }

    /// Screen-space pan in pixels, resolved against the camera on update.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan_pixels += Vector2::new(dx, dy) * self.pan_speed;
    }

    pub fn has_pending_motion(&self) -> bool {
        self.delta_theta.abs() > EPS
            || self.delta_phi.abs() > EPS
            || (self.scale - 1.0).abs() > EPS
            || self.pan_pixels.magnitude2() > EPS
            || self.pan_offset.magnitude2() > EPS * EPS
    }

    fn zoom_scale(&self, delta: f32) -> f32 {
        0.95f32.powf(self.zoom_speed * delta.abs())
    }

    fn on_cursor_moved(&mut self, x: f32, y: f32) {
        let position = Vector2::new(x, y);
        if let (Some(drag), Some(last)) = (self.drag, self.cursor) {
            let delta = position - last;
            match drag {
                Drag::Rotate => {
                    let per_pixel = 2.0 * PI * self.rotate_speed / self.viewport_height;
                    self.rotate_left(delta.x * per_pixel);
                    self.rotate_up(delta.y * per_pixel);
                }
                Drag::Pan => self.pan(delta.x, delta.y),
            }
        }
        self.cursor = Some(position);
    }

    fn on_wheel(&mut self, delta: &MouseScrollDelta) {
        // Lines are scrolled upwards with positive values, pixels likewise
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 100.0,
        };
        if lines > 0.0 {
            self.dolly(self.zoom_scale(lines));
        } else if lines < 0.0 {
            self.dolly(1.0 / self.zoom_scale(lines));
        }
    }

    fn resolve_pan(&mut self, offset: Vector3<f32>, camera: &PerspectiveCamera) {
        if self.pan_pixels.magnitude2() <= EPS {
            return;
        }
        let target_distance = offset.magnitude() * Rad::from(camera.fov / 2.0).tan();
        let left = 2.0 * self.pan_pixels.x * target_distance / self.viewport_height;
        let up = 2.0 * self.pan_pixels.y * target_distance / self.viewport_height;

        let forward = -offset.normalize();
        let mut right = forward.cross(Vector3::unit_y());
        if right.magnitude2() <= EPS {
            right = Vector3::unit_x();
        }
        let right = right.normalize();
        let camera_up = right.cross(forward);

        self.pan_offset += -right * left + camera_up * up;
        self.pan_pixels = Vector2::zero();
    }
}

impl InputController for OrbitControls {
    fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.set_viewport_height(size.height as f32),
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => Some(Drag::Rotate),
                    (MouseButton::Right, ElementState::Pressed) => Some(Drag::Pan),
                    (_, ElementState::Released) => None,
                    _ => self.drag,
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::CursorLeft { .. } => {
                self.drag = None;
                self.cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(delta),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                let step = self.key_pan_speed;
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::ArrowUp) => self.pan(0.0, step),
                    PhysicalKey::Code(KeyCode::ArrowDown) => self.pan(0.0, -step),
                    PhysicalKey::Code(KeyCode::ArrowLeft) => self.pan(step, 0.0),
                    PhysicalKey::Code(KeyCode::ArrowRight) => self.pan(-step, 0.0),
                    _ => (),
                }
            }
            _ => (),
        }
    }

    fn update(&mut self, transform: &mut Transform, camera: &mut PerspectiveCamera) -> bool {
        if !self.has_pending_motion() {
            return false;
        }
        let target = camera.target.to_vec();
        let offset = transform.position - target;
        self.resolve_pan(offset, camera);

        // y-up spherical coordinates around the target
        let radius = offset.magnitude();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > EPS {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.delta_theta * step;
        phi += self.delta_phi * step;
        let phi = phi.clamp(self.min_polar_angle.max(EPS), self.max_polar_angle.min(PI - EPS));
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let target = target + self.pan_offset * step;
        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let position = target + offset;
        let moved = (position - transform.position).magnitude2() > EPS * EPS;

        transform.position = position;
        camera.target = cgmath::Point3::from_vec(target);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;
        moved
    }
}
