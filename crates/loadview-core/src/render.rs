//! Boundary to the rendering engine

use crate::camera::CameraRig;
use crate::scene::Scene;

/// Draws a scene from a camera
///
/// Called once per frame with whatever scene is active. Implementations
/// must only read the scene.
pub trait SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &CameraRig);
}

/// Counts frames without drawing anything
#[derive(Debug, Default)]
pub struct FrameCounter {
    pub frames: usize,
    pub last_object_count: usize,
}

impl SceneRenderer for FrameCounter {
    fn render(&mut self, scene: &Scene, _camera: &CameraRig) {
        self.frames += 1;
        self.last_object_count = scene.object_count();
    }
}
