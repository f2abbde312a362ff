use crate::math::{normalize, Vec3};
use crate::ray::Ray;

const WORLD_UP: Vec3 = Vec3::Y;
/// Used when the view direction is (anti)parallel to `WORLD_UP`
const FALLBACK_UP: Vec3 = Vec3::Z;
const DEGENERATE_LENGTH: f32 = 1e-6;

/// Pinhole camera described by its projection plane.
///
/// `(u, v)` in `[0,1]^2` maps to `lower_left_corner + u * horizontal + v * vertical`.
/// A camera is never edited in place; view changes build a new one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub lower_left_corner: Vec3,
    pub horizontal: Vec3,
    pub vertical: Vec3,
}

impl Camera {
    /// 16:9 camera at the origin looking down -Z with a viewport height of 2
    /// and unit focal length.
    pub fn new() -> Self {
        let aspect_ratio = 16.0 / 9.0;
        let viewport_height = 2.0;
        let viewport_width = aspect_ratio * viewport_height;
        let focal_length = 1.0;

        let position = Vec3::ZERO;
        let horizontal = Vec3::new(viewport_width, 0.0, 0.0);
        let vertical = Vec3::new(0.0, viewport_height, 0.0);
        let lower_left_corner =
            position - horizontal / 2.0 - vertical / 2.0 - Vec3::new(0.0, 0.0, focal_length);

        Self {
            position,
            lower_left_corner,
            horizontal,
            vertical,
        }
    }

    /// Camera at `position` aimed at `look_at`.
    ///
    /// `vfov` is the vertical field of view in degrees. Looking straight up or
    /// down swaps the world up axis for +Z, and a target equal to the position
    /// looks down -Z, so the basis is always finite.
    pub fn look_at(position: Vec3, look_at: Vec3, vfov: f32, aspect_ratio: f32) -> Self {
        let half_height = (vfov.to_radians() / 2.0).tan();
        let half_width = aspect_ratio * half_height;

        let mut w = normalize(look_at - position);
        if w.length() < DEGENERATE_LENGTH {
            w = Vec3::NEG_Z;
        }

        let mut right = w.cross(WORLD_UP);
        if right.length() < DEGENERATE_LENGTH {
            right = w.cross(FALLBACK_UP);
        }
        let u = normalize(right);
        let v = u.cross(w);

        Self {
            position,
            lower_left_corner: position - u * half_width - v * half_height + w,
            horizontal: u * (2.0 * half_width),
            vertical: v * (2.0 * half_height),
        }
    }

    /// Ray through the normalized screen coordinate `(u, v)`; `(0, 0)` is the
    /// bottom-left corner.
    pub fn get_ray(&self, u: f32, v: f32) -> Ray {
        Ray::new(
            self.position,
            self.lower_left_corner + self.horizontal * u + self.vertical * v - self.position,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
