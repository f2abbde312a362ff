//! Uniform data uploaded to the WGSL ray tracer once per frame.
//!
//! Layouts follow WGSL uniform rules: every `vec3<f32>` starts on a 16 byte
//! boundary, so each one is followed by a scalar or explicit padding.

use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;
use crate::geometry::Sphere;
use crate::scene::{Light, Scene};
use crate::RaytracerConfig;

#[derive(Copy, Clone, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct GpuCamera {
    pub position: [f32; 3],
    pub _padding0: f32,
    pub lower_left_corner: [f32; 3],
    pub _padding1: f32,
    pub horizontal: [f32; 3],
    pub _padding2: f32,
    pub vertical: [f32; 3],
    pub _padding3: f32,
}

#[derive(Copy, Clone, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct GpuLight {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}

/// Sphere with its material inlined (48 bytes)
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct GpuSphere {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub shininess: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub _padding: f32,
}

/// Everything one frame needs (896 bytes)
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct FrameUniforms {
    pub camera: GpuCamera,
    pub light: GpuLight,
    pub background: [f32; 3],
    pub sphere_count: u32,
    pub light_count: u32,
    pub width: u32,
    pub height: u32,
    pub _padding: u32,
    pub spheres: [GpuSphere; RaytracerConfig::MAX_GPU_SPHERES],
}

impl From<&Camera> for GpuCamera {
    fn from(camera: &Camera) -> Self {
        Self {
            position: camera.position.to_array(),
            _padding0: 0.0,
            lower_left_corner: camera.lower_left_corner.to_array(),
            _padding1: 0.0,
            horizontal: camera.horizontal.to_array(),
            _padding2: 0.0,
            vertical: camera.vertical.to_array(),
            _padding3: 0.0,
        }
    }
}

impl From<&Light> for GpuLight {
    fn from(light: &Light) -> Self {
        Self {
            position: light.position.to_array(),
            intensity: light.intensity,
            color: light.color.to_array(),
            _padding: 0.0,
        }
    }
}

impl From<&Sphere> for GpuSphere {
    fn from(sphere: &Sphere) -> Self {
        let material = &sphere.material;
        Self {
            center: sphere.center.to_array(),
            radius: sphere.radius,
            color: material.color.to_array(),
            shininess: material.shininess,
            ambient: material.ambient,
            diffuse: material.diffuse,
            specular: material.specular,
            _padding: 0.0,
        }
    }
}

impl FrameUniforms {
    /// Pack a frame. Spheres past [`RaytracerConfig::MAX_GPU_SPHERES`] are
    /// dropped, so callers validate the scene first. Only the first light is
    /// uploaded; `light_count` tells the shader whether it exists.
    pub fn new(scene: &Scene, camera: &Camera, width: u32, height: u32) -> Self {
        let mut spheres = [GpuSphere::zeroed(); RaytracerConfig::MAX_GPU_SPHERES];
        let mut sphere_count = 0;
        for (slot, sphere) in spheres.iter_mut().zip(scene.spheres()) {
            *slot = GpuSphere::from(sphere);
            sphere_count += 1;
        }

        Self {
            camera: GpuCamera::from(camera),
            light: scene.primary_light().map(GpuLight::from).unwrap_or_else(GpuLight::zeroed),
            background: scene.background_color.to_array(),
            sphere_count,
            light_count: scene.lights.len().min(1) as u32,
            width,
            height,
            _padding: 0,
            spheres,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Vec3;
    use crate::scene::SceneBuilder;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_uniform_layout_sizes() {
        assert_eq!(size_of::<GpuCamera>(), 64);
        assert_eq!(size_of::<GpuLight>(), 32);
        assert_eq!(size_of::<GpuSphere>(), 48);
        assert_eq!(size_of::<FrameUniforms>(), 896);
    }

    #[test]
    fn test_uniform_layout_offsets() {
        assert_eq!(offset_of!(FrameUniforms, light), 64);
        assert_eq!(offset_of!(FrameUniforms, background), 96);
        assert_eq!(offset_of!(FrameUniforms, sphere_count), 108);
        assert_eq!(offset_of!(FrameUniforms, width), 116);
        assert_eq!(offset_of!(FrameUniforms, spheres), 128);
    }

    #[test]
    fn test_frame_uniforms_from_default_scene() {
        let scene = SceneBuilder::build_default_scene();
        let camera = Camera::new();
        let frame = FrameUniforms::new(&scene, &camera, 1280, 720);

        assert_eq!(frame.sphere_count, 5);
        assert_eq!(frame.light_count, 1);
        assert_eq!(frame.light.position, [3.0, 4.0, 2.0]);
        assert_eq!(frame.background, [0.5, 0.7, 1.0]);
        assert_eq!(frame.spheres[0].radius, 100.0);
        assert_eq!(frame.spheres[4].shininess, 128.0);
        assert_eq!(frame.spheres[5].radius, 0.0);
        assert_eq!((frame.width, frame.height), (1280, 720));
        assert_eq!(frame.camera.vertical, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_frame_uniforms_without_lights() {
        let scene = SceneBuilder::new()
            .add_sphere(Vec3::ZERO, 1.0, Default::default())
            .build();
        let frame = FrameUniforms::new(&scene, &Camera::new(), 4, 4);
        assert_eq!(frame.light_count, 0);
        assert_eq!(frame.sphere_count, 1);
    }
}
