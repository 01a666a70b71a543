// Frustum-gated playback. Videos play only while their bounding sphere is in view.

use crate::camera::Frustum;
use crate::scene::{Playback, Scene};
use crate::types::HostCommand;

#[derive(Debug, Clone, Default)]
pub struct VideoGate;

impl VideoGate {
    pub fn new() -> Self {
        VideoGate
    }

    /// One activation pass. Flips playback state in `scene` and returns the host commands
    /// needed to match it.
    pub fn evaluate(&self, frustum: &Frustum, scene: &mut Scene, depth: f32) -> Vec<HostCommand> {
        let mut commands = Vec::new();
        for index in 0..scene.items.len() {
            let item = &scene.items[index];
            if !item.is_video() {
                continue;
            }
            let Some(center) = scene.item_world(item.id, depth) else {
                continue;
            };
            // Faded-out items count as off screen.
            let visible =
                item.opacity > 0.0 && frustum.intersects_sphere(center, item.bounding_radius());
            let id = item.id;

            let item = &mut scene.items[index];
            match (visible, item.playback) {
                (true, Playback::Paused) => {
                    item.playback = Playback::Playing;
                    tracing::debug!(item = %item.key, "video play");
                    commands.push(HostCommand::PlayVideo { item: id });
                }
                (false, Playback::Playing) => {
                    item.playback = Playback::Paused;
                    tracing::debug!(item = %item.key, "video pause");
                    commands.push(HostCommand::PauseVideo { item: id });
                }
                _ => {}
            }
        }
        commands
    }

    /// Pause everything that is playing.
    pub fn pause_all(&self, scene: &mut Scene) -> Vec<HostCommand> {
        scene
            .items
            .iter_mut()
            .filter(|item| item.playback == Playback::Playing)
            .map(|item| {
                item.playback = Playback::Paused;
                HostCommand::PauseVideo { item: item.id }
            })
            .collect()
    }
}
