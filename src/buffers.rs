use tracer_shared::{Camera, FrameUniforms, RaytracerConfig, Scene};

use crate::error::RenderError;

/// Uniform buffer holding the per-frame scene and camera snapshot
pub struct BufferManager {
    pub frame_buffer: wgpu::Buffer,
}

impl BufferManager {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { frame_buffer }
    }

    /// Reject scenes the fixed-size uniform array cannot hold
    pub fn check_scene(scene: &Scene) -> Result<(), RenderError> {
        let count = scene.objects.len();
        if count > RaytracerConfig::MAX_GPU_SPHERES {
            return Err(RenderError::TooManySpheres {
                count,
                max: RaytracerConfig::MAX_GPU_SPHERES,
            });
        }
        Ok(())
    }

    /// Pack and upload the frame snapshot
    pub fn update_frame(&self, queue: &wgpu::Queue, scene: &Scene, camera: &Camera, width: u32, height: u32) {
        let frame = FrameUniforms::new(scene, camera, width, height);
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tracer_shared::{Material, SceneBuilder, Vec3};

    #[test]
    fn test_check_scene_accepts_default() {
        assert!(BufferManager::check_scene(&SceneBuilder::build_default_scene()).is_ok());
    }

    #[test]
    fn test_check_scene_rejects_overflow() {
        let mut builder = SceneBuilder::new();
        for i in 0..=RaytracerConfig::MAX_GPU_SPHERES {
            builder = builder.add_sphere(Vec3::new(i as f32, 0.0, -5.0), 0.25, Material::default());
        }
        match BufferManager::check_scene(&builder.build()) {
            Err(RenderError::TooManySpheres { count, max }) => {
                assert_eq!(count, RaytracerConfig::MAX_GPU_SPHERES + 1);
                assert_eq!(max, RaytracerConfig::MAX_GPU_SPHERES);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
