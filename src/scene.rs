use tracer_shared::{Camera, Scene, SceneBuilder};

use crate::input::OrbitController;

/// Scene geometry and the orbit camera looking at it
pub struct SceneState {
    pub scene: Scene,
    pub orbit: OrbitController,
    pub camera: Camera,
    aspect_ratio: f32,
}

impl SceneState {
    pub fn new(aspect_ratio: f32) -> Self {
        let orbit = OrbitController::new();
        Self {
            scene: SceneBuilder::build_default_scene(),
            camera: orbit.camera(aspect_ratio),
            orbit,
            aspect_ratio,
        }
    }

    /// Rebuild the camera from the orbit; the previous value is replaced, not edited
    pub fn update_camera(&mut self) {
        self.camera = self.orbit.camera(self.aspect_ratio);
    }

    pub fn reset_camera(&mut self) {
        self.orbit.reset();
        self.update_camera();
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
        self.update_camera();
    }
}
