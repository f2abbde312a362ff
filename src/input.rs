use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use tracer_shared::{Camera, RaytracerConfig, Vec3};

/// Pixels of trackpad scroll counted as one wheel line
const PIXELS_PER_LINE: f64 = 20.0;

/// Input handling state
pub struct InputState {
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            mouse_pressed: false,
            last_mouse_pos: None,
        }
    }

    /// Handle mouse input events
    pub fn handle_mouse_input(&mut self, button: MouseButton, button_state: ElementState) {
        if button == MouseButton::Left {
            self.mouse_pressed = button_state == ElementState::Pressed;
        }
    }

    /// Handle cursor movement and return the drag delta if the left button is held
    pub fn handle_cursor_moved(&mut self, position: winit::dpi::PhysicalPosition<f64>) -> Option<(f64, f64)> {
        let mut delta = None;

        if self.mouse_pressed {
            if let Some(last_pos) = self.last_mouse_pos {
                delta = Some((position.x - last_pos.0, position.y - last_pos.1));
            }
        }

        self.last_mouse_pos = Some((position.x, position.y));
        delta
    }

    /// Scroll amount in wheel lines, positive away from the user
    pub fn handle_mouse_wheel(delta: MouseScrollDelta) -> f32 {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
        }
    }
}

/// Spherical camera rig around a fixed target. Angles are in degrees;
/// `phi` is measured from +Y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrbitController {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    pub target: Vec3,
}

impl OrbitController {
    pub fn new() -> Self {
        Self {
            radius: RaytracerConfig::ORBIT_RADIUS,
            theta: RaytracerConfig::ORBIT_THETA,
            phi: RaytracerConfig::ORBIT_PHI,
            target: Vec3::ZERO,
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            target: self.target,
            ..Self::new()
        };
    }

    /// Apply a mouse drag in pixels
    pub fn rotate(&mut self, delta_x: f64, delta_y: f64) {
        let sensitivity = RaytracerConfig::ORBIT_SENSITIVITY;
        self.theta = (self.theta + delta_x as f32 * sensitivity).rem_euclid(360.0);
        self.phi = (self.phi - delta_y as f32 * sensitivity)
            .clamp(RaytracerConfig::ORBIT_MIN_PHI, RaytracerConfig::ORBIT_MAX_PHI);
    }

    pub fn zoom(&mut self, lines: f32) {
        self.radius = (self.radius - lines * RaytracerConfig::ORBIT_ZOOM_STEP)
            .clamp(RaytracerConfig::ORBIT_MIN_RADIUS, RaytracerConfig::ORBIT_MAX_RADIUS);
    }

    pub fn position(&self) -> Vec3 {
        let theta = self.theta.to_radians();
        let phi = self.phi.to_radians();
        self.target
            + self.radius * Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
    }

    /// Build the look-at camera for the current orbit
    pub fn camera(&self, aspect_ratio: f32) -> Camera {
        Camera::look_at(self.position(), self.target, RaytracerConfig::CAMERA_VFOV, aspect_ratio)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_drag_only_while_pressed() {
        let mut input = InputState::new();
        let at = |x, y| winit::dpi::PhysicalPosition::new(x, y);

        assert_eq!(input.handle_cursor_moved(at(10.0, 10.0)), None);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        assert_eq!(input.handle_cursor_moved(at(14.0, 7.0)), Some((4.0, -3.0)));
        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        assert_eq!(input.handle_cursor_moved(at(20.0, 20.0)), None);
    }

    #[test]
    fn test_wheel_pixel_delta_converts_to_lines() {
        let lines = InputState::handle_mouse_wheel(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 40.0),
        ));
        assert_eq!(lines, 2.0);
        assert_eq!(InputState::handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, -1.0)), -1.0);
    }

    #[test]
    fn test_phi_clamped() {
        let mut orbit = OrbitController::new();
        orbit.rotate(0.0, 10_000.0);
        assert_eq!(orbit.phi, RaytracerConfig::ORBIT_MIN_PHI);
        orbit.rotate(0.0, -10_000.0);
        assert_eq!(orbit.phi, RaytracerConfig::ORBIT_MAX_PHI);
    }

    #[test]
    fn test_theta_wraps() {
        let mut orbit = OrbitController::new();
        orbit.rotate(-20.0, 0.0);
        assert_eq!(orbit.theta, 350.0);
        orbit.rotate(40.0, 0.0);
        assert_eq!(orbit.theta, 10.0);
    }

    #[test]
    fn test_radius_clamped() {
        let mut orbit = OrbitController::new();
        orbit.zoom(100.0);
        assert_eq!(orbit.radius, RaytracerConfig::ORBIT_MIN_RADIUS);
        orbit.zoom(-100.0);
        assert_eq!(orbit.radius, RaytracerConfig::ORBIT_MAX_RADIUS);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut orbit = OrbitController::new();
        orbit.rotate(33.0, 12.0);
        orbit.zoom(3.0);
        orbit.reset();
        assert_eq!(orbit, OrbitController::new());
    }

    #[test]
    fn test_default_position() {
        // theta 0, phi 60, radius 5
        let position = OrbitController::new().position();
        let expected = Vec3::new(5.0 * 60f32.to_radians().sin(), 2.5, 0.0);
        assert!(position.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_camera_looks_at_target() {
        let orbit = OrbitController::new();
        let camera = orbit.camera(16.0 / 9.0);
        let ray = camera.get_ray(0.5, 0.5);
        let to_target = (orbit.target - orbit.position()).normalize();
        assert!(ray.direction.abs_diff_eq(to_target, 1e-5));
    }
}
