pub mod camera;
pub mod geometry;
pub mod gpu;
pub mod integrator;
pub mod math;
pub mod ray;
pub mod scene;
pub mod shading;

pub use camera::Camera;
pub use geometry::{Geometry, Hittable, Material, Sphere, NO_HIT};
pub use gpu::{FrameUniforms, GpuCamera, GpuLight, GpuSphere};
pub use integrator::{render_cpu, render_cpu_rgba32f, shade_pixel, trace_ray, quantize};
pub use math::Vec3;
pub use ray::Ray;
pub use scene::{HitRecord, Light, Scene, SceneBuilder};
pub use shading::phong;

/// Configuration constants for the raytracer
pub struct RaytracerConfig;

impl RaytracerConfig {
    /// Self-intersection threshold for ray parameters and shadow offsets
    pub const EPSILON: f32 = 0.001;
    pub const T_MIN: f32 = 0.001;
    pub const T_MAX: f32 = 1000.0;
    /// Recursion cap for `trace_ray`, reserved for reflection bounces
    pub const MAX_DEPTH: u32 = 3;
    pub const GAMMA: f32 = 2.2;

    // GPU configuration constants
    pub const WORKGROUP_SIZE: (u32, u32) = (8, 8);
    pub const MAX_GPU_SPHERES: usize = 16;

    // Orbit camera
    pub const CAMERA_VFOV: f32 = 45.0;
    pub const ORBIT_RADIUS: f32 = 5.0;
    pub const ORBIT_THETA: f32 = 0.0;
    pub const ORBIT_PHI: f32 = 60.0;
    pub const ORBIT_SENSITIVITY: f32 = 0.5;
    pub const ORBIT_ZOOM_STEP: f32 = 0.5;
    pub const ORBIT_MIN_PHI: f32 = 5.0;
    pub const ORBIT_MAX_PHI: f32 = 175.0;
    pub const ORBIT_MIN_RADIUS: f32 = 1.5;
    pub const ORBIT_MAX_RADIUS: f32 = 15.0;

    // Window
    pub const WINDOW_WIDTH: u32 = 1280;
    pub const WINDOW_HEIGHT: u32 = 720;
    pub const WINDOW_TITLE: &'static str = "GPU Ray Tracer";
    pub const PERFORMANCE_STATS_INTERVAL: u64 = 60; // frames
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_epsilon_matches_scene_t_min() {
        assert_eq!(RaytracerConfig::EPSILON, RaytracerConfig::T_MIN);
    }

    #[test]
    fn test_orbit_defaults_inside_limits() {
        assert!(RaytracerConfig::ORBIT_PHI >= RaytracerConfig::ORBIT_MIN_PHI);
        assert!(RaytracerConfig::ORBIT_PHI <= RaytracerConfig::ORBIT_MAX_PHI);
        assert!(RaytracerConfig::ORBIT_RADIUS >= RaytracerConfig::ORBIT_MIN_RADIUS);
        assert!(RaytracerConfig::ORBIT_RADIUS <= RaytracerConfig::ORBIT_MAX_RADIUS);
    }
}
