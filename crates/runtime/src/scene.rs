//! Scene proxy and the gaze marker it holds.

use std::collections::HashMap;
use std::sync::Arc;

use eyestream_common::error::{EyestreamError, EyestreamResult};
use eyestream_event_model::{GazeSample, Vec3};
use parking_lot::RwLock;

/// Name-addressed access to positions of externally owned scene objects.
pub trait SceneProxy: Send {
    fn position(&self, name: &str) -> EyestreamResult<Vec3>;

    fn set_position(&mut self, name: &str, position: Vec3) -> EyestreamResult<()>;
}

/// Scene held in process memory. Clones share the same objects, so a test
/// or host can watch the marker while a session owns another handle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScene {
    objects: Arc<RwLock<HashMap<String, Vec3>>>,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, replacing any previous object of the same name.
    pub fn create(&self, name: impl Into<String>, position: Vec3) {
        self.objects.write().insert(name.into(), position);
    }

    pub fn get(&self, name: &str) -> Option<Vec3> {
        self.objects.read().get(name).copied()
    }
}

impl SceneProxy for InMemoryScene {
    fn position(&self, name: &str) -> EyestreamResult<Vec3> {
        self.get(name)
            .ok_or_else(|| EyestreamError::scene(format!("no scene object named {name:?}")))
    }

    fn set_position(&mut self, name: &str, position: Vec3) -> EyestreamResult<()> {
        match self.objects.write().get_mut(name) {
            Some(slot) => {
                *slot = position;
                Ok(())
            }
            None => Err(EyestreamError::scene(format!(
                "no scene object named {name:?}"
            ))),
        }
    }
}

/// The one marker the engine reads and moves each frame.
pub struct GazeMarker {
    scene: Box<dyn SceneProxy>,
    name: String,
}

impl GazeMarker {
    pub fn new(scene: Box<dyn SceneProxy>, name: impl Into<String>) -> Self {
        Self {
            scene,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read(&self) -> EyestreamResult<Vec3> {
        self.scene.position(&self.name)
    }

    /// Move the marker onto the gaze coordinate at `z = 0`.
    pub fn follow(&mut self, gaze: GazeSample) -> EyestreamResult<()> {
        self.scene.set_position(&self.name, Vec3::from_gaze(gaze))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_follows_gaze_on_the_ground_plane() {
        let scene = InMemoryScene::new();
        scene.create("Gaze", Vec3::new(5.0, 5.0, 2.0));

        let mut marker = GazeMarker::new(Box::new(scene.clone()), "Gaze");
        assert_eq!(marker.read().unwrap(), Vec3::new(5.0, 5.0, 2.0));

        marker.follow(GazeSample::new(100.0, 300.0)).unwrap();
        assert_eq!(scene.get("Gaze"), Some(Vec3::new(100.0, 300.0, 0.0)));
    }

    #[test]
    fn missing_marker_is_scene_error() {
        let mut marker = GazeMarker::new(Box::new(InMemoryScene::new()), "Gaze");
        assert!(matches!(marker.read(), Err(EyestreamError::Scene { .. })));
        assert!(marker.follow(GazeSample::new(0.0, 0.0)).is_err());
    }
}
