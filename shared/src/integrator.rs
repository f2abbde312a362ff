//! CPU execution of the ray-trace pipeline.
//!
//! The WGSL shaders under `shaders/` run the same steps per fragment and per
//! compute invocation. Keep them in sync with this file.

use rayon::prelude::*;

use crate::camera::Camera;
use crate::math::{gamma_correct, normalize, Vec3};
use crate::ray::Ray;
use crate::scene::Scene;
use crate::shading::phong;
use crate::RaytracerConfig;

/// Linear color of a ray; past [`RaytracerConfig::MAX_DEPTH`] the background
/// is returned.
pub fn trace_ray(ray: &Ray, scene: &Scene, depth: u32) -> Vec3 {
    if depth > RaytracerConfig::MAX_DEPTH {
        return scene.background_color;
    }

    let hit = scene.intersect_scene(ray);
    if !hit.hit {
        return scene.background_color;
    }

    let view_dir = normalize(ray.origin - hit.point);
    match scene.primary_light() {
        Some(light) => phong(scene, &hit, light, view_dir),
        None => hit.material.color * hit.material.ambient,
    }
}

/// Display color for normalized screen coordinates: gamma corrected and
/// clamped to `[0, 1]`.
pub fn shade_pixel(scene: &Scene, camera: &Camera, u: f32, v: f32) -> Vec3 {
    let ray = camera.get_ray(u, v);
    let color = trace_ray(&ray, scene, 0);
    gamma_correct(color, RaytracerConfig::GAMMA).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Truncating conversion of a `[0, 1]` channel to a byte
#[inline]
pub fn quantize(channel: f32) -> u8 {
    (channel * 255.0) as u8
}

/// Normalized coordinates of pixel `(x, y)` where row 0 is the top row.
#[inline]
pub fn pixel_uv(x: u32, y: u32, width: u32, height: u32) -> (f32, f32) {
    let u = x as f32 / width as f32;
    let v = (height - 1 - y) as f32 / height as f32;
    (u, v)
}

/// Render to packed RGB bytes, rows top to bottom.
pub fn render_cpu(scene: &Scene, camera: &Camera, width: u32, height: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    if width == 0 || height == 0 {
        return pixels;
    }

    pixels
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, rgb) in row.chunks_exact_mut(3).enumerate() {
                let (u, v) = pixel_uv(x as u32, y as u32, width, height);
                let color = shade_pixel(scene, camera, u, v);
                rgb[0] = quantize(color.x);
                rgb[1] = quantize(color.y);
                rgb[2] = quantize(color.z);
            }
        });

    pixels
}

/// Render to float RGBA (alpha 1), rows top to bottom. Same layout the GPU
/// paths produce in their `Rgba32Float` targets.
pub fn render_cpu_rgba32f(scene: &Scene, camera: &Camera, width: u32, height: u32) -> Vec<f32> {
    let mut pixels = vec![0.0f32; width as usize * height as usize * 4];
    if width == 0 || height == 0 {
        return pixels;
    }

    pixels
        .par_chunks_mut(width as usize * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, rgba) in row.chunks_exact_mut(4).enumerate() {
                let (u, v) = pixel_uv(x as u32, y as u32, width, height);
                let color = shade_pixel(scene, camera, u, v);
                rgba.copy_from_slice(&[color.x, color.y, color.z, 1.0]);
            }
        });

    pixels
}
