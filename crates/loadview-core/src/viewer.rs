//! Packing viewer control surface
//!
//! Owns the loaded snapshot, the scenes built from it, the navigation state
//! and the camera. UI and automation layers drive it through method calls
//! and observe it through accessors and the drained event queue.

use glam::DVec3;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::camera::CameraRig;
use crate::composer::{ComposerSettings, SceneComposer};
use crate::geometry;
use crate::model::{Item, SimulationSnapshot, SnapshotError};
use crate::navigation::{Affordances, NavigationState, View};
use crate::render::SceneRenderer;
use crate::scene::Scene;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("Camera coordinates must be finite")]
    InvalidCamera,
}

/// Issued when a load starts; only the newest ticket may apply its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { truck_count: usize },
    /// A newer load was started after this one; the snapshot was dropped
    Superseded,
}

/// Notifications for the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    SimulationLoaded {
        truck_count: usize,
        unplaced_count: usize,
        skipped_items: usize,
    },
    /// The active scene changed and must be re-rendered
    ActiveSceneChanged { view: View, affordances: Affordances },
    DimensionsToggled { visible: bool },
    CameraMoved { position: DVec3, target: DVec3 },
}

#[derive(Default)]
pub struct PackingViewer {
    composer: SceneComposer,
    snapshot: Option<SimulationSnapshot>,
    truck_scenes: Vec<Scene>,
    unplaced_scene: Option<Scene>,
    navigation: Option<NavigationState>,
    camera: CameraRig,
    generation: u64,
    ready: bool,
    events: Vec<ViewerEvent>,
}

impl PackingViewer {
    pub fn new(settings: ComposerSettings) -> Self {
        Self {
            composer: SceneComposer::new(settings),
            ..Default::default()
        }
    }

    /// Start a load; the returned ticket supersedes every earlier one
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        debug!(generation = self.generation, "Load started");
        LoadTicket(self.generation)
    }

    /// Replace every scene with ones built from `snapshot`
    ///
    /// A stale ticket discards the snapshot. An invalid snapshot is
    /// rejected and the current scenes stay active.
    pub fn apply_snapshot(
        &mut self,
        ticket: LoadTicket,
        snapshot: SimulationSnapshot,
    ) -> Result<LoadOutcome, ViewerError> {
        if ticket.0 != self.generation {
            warn!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding superseded simulation load"
            );
            return Ok(LoadOutcome::Superseded);
        }
        snapshot.validate()?;

        let truck_scenes: Vec<Scene> = snapshot
            .trucks
            .iter()
            .enumerate()
            .map(|(i, truck)| self.composer.build_truck_scene(i, truck))
            .collect();
        let skipped_items = truck_scenes.iter().map(|s| s.skipped().len()).sum();
        let truck_count = truck_scenes.len();
        let first_truck = geometry::truck_pose(&snapshot.trucks[0].dimensions).translation;

        let unplaced_count = snapshot.unplaced_items.len();
        self.truck_scenes = truck_scenes;
        self.unplaced_scene = None;
        self.snapshot = Some(snapshot);
        let navigation = NavigationState::new(truck_count);
        self.navigation = Some(navigation);
        self.ready = true;

        info!(
            trucks = truck_count,
            unplaced = unplaced_count,
            skipped = skipped_items,
            "Simulation loaded"
        );
        self.events.push(ViewerEvent::SimulationLoaded {
            truck_count,
            unplaced_count,
            skipped_items,
        });
        self.emit_active_scene(navigation);

        self.camera.focus_on(first_truck);
        self.emit_camera();

        Ok(LoadOutcome::Applied { truck_count })
    }

    /// Load a snapshot that is already in hand
    pub fn load_simulation(
        &mut self,
        snapshot: SimulationSnapshot,
    ) -> Result<LoadOutcome, ViewerError> {
        let ticket = self.begin_load();
        self.apply_snapshot(ticket, snapshot)
    }

    pub fn next_truck(&mut self) -> bool {
        self.transition(NavigationState::next)
    }

    pub fn previous_truck(&mut self) -> bool {
        self.transition(NavigationState::previous)
    }

    /// Open the unplaced view for the loaded snapshot's unplaced items
    pub fn view_unplaced(&mut self) -> bool {
        let items = match &self.snapshot {
            Some(snapshot) => snapshot.unplaced_items.clone(),
            None => return false,
        };
        self.create_unplaced_items_scene(&items)
    }

    /// Build a scene from `items` and make it active
    ///
    /// Refused before the first load and while the unplaced view is already
    /// open; the existing unplaced scene is not rebuilt.
    pub fn create_unplaced_items_scene(&mut self, items: &[Item]) -> bool {
        let Some(mut navigation) = self.navigation else {
            return false;
        };
        if !navigation.enter_unplaced() {
            return false;
        }

        self.unplaced_scene = Some(self.composer.build_unplaced_scene(items));
        self.navigation = Some(navigation);
        info!(items = items.len(), "Entered unplaced items view");
        self.emit_active_scene(navigation);
        true
    }

    /// Drop the unplaced scene and return to the first truck
    ///
    /// Returns whether the view changed. The first truck scene is re-rendered
    /// either way once a simulation is loaded.
    pub fn show_truck_scenes(&mut self) -> bool {
        let Some(mut navigation) = self.navigation else {
            return false;
        };
        let changed = navigation.show_trucks();
        self.unplaced_scene = None;
        self.navigation = Some(navigation);
        self.emit_active_scene(navigation);
        changed
    }

    /// Flip dimension label visibility on every scene, including ones built later
    pub fn toggle_dimensions(&mut self) -> bool {
        let visible = !self.composer.labels_visible();
        self.composer.set_labels_visible(visible);
        for scene in self.truck_scenes.iter_mut().chain(self.unplaced_scene.as_mut()) {
            scene.set_labels_visible(visible);
        }
        debug!(visible, "Dimension labels toggled");
        self.events.push(ViewerEvent::DimensionsToggled { visible });
        visible
    }

    pub fn set_camera_position(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        look_at_x: f64,
        look_at_y: f64,
        look_at_z: f64,
    ) -> Result<(), ViewerError> {
        let position = DVec3::new(x, y, z);
        let target = DVec3::new(look_at_x, look_at_y, look_at_z);
        if !position.is_finite() || !target.is_finite() {
            return Err(ViewerError::InvalidCamera);
        }
        self.camera.set_pose(position, target);
        self.emit_camera();
        Ok(())
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// True once a snapshot has been fully composed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn navigation(&self) -> Option<&NavigationState> {
        self.navigation.as_ref()
    }

    pub fn view(&self) -> Option<View> {
        self.navigation.map(|n| n.view())
    }

    pub fn affordances(&self) -> Affordances {
        self.navigation
            .map(|n| n.affordances())
            .unwrap_or_default()
    }

    pub fn truck_count(&self) -> usize {
        self.truck_scenes.len()
    }

    /// Truck scenes plus the unplaced scene when it is open
    pub fn scene_count(&self) -> usize {
        self.truck_scenes.len() + usize::from(self.unplaced_scene.is_some())
    }

    pub fn truck_scenes(&self) -> &[Scene] {
        &self.truck_scenes
    }

    pub fn unplaced_scene(&self) -> Option<&Scene> {
        self.unplaced_scene.as_ref()
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        match self.navigation?.view() {
            View::Truck(i) => self.truck_scenes.get(i),
            View::Unplaced => self.unplaced_scene.as_ref(),
        }
    }

    pub fn snapshot(&self) -> Option<&SimulationSnapshot> {
        self.snapshot.as_ref()
    }

    /// Hand the active scene to `renderer`; draws nothing before a load
    pub fn render_frame(&self, renderer: &mut dyn SceneRenderer) -> bool {
        match self.active_scene() {
            Some(scene) => {
                renderer.render(scene, &self.camera);
                true
            }
            None => false,
        }
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    fn transition(&mut self, step: fn(&mut NavigationState) -> bool) -> bool {
        let Some(mut navigation) = self.navigation else {
            return false;
        };
        if !step(&mut navigation) {
            debug!(view = %navigation.view(), "Navigation refused");
            return false;
        }
        self.navigation = Some(navigation);
        info!(view = %navigation.view(), "Active scene changed");
        self.emit_active_scene(navigation);
        true
    }

    fn emit_active_scene(&mut self, navigation: NavigationState) {
        self.events.push(ViewerEvent::ActiveSceneChanged {
            view: navigation.view(),
            affordances: navigation.affordances(),
        });
    }

    fn emit_camera(&mut self) {
        self.events.push(ViewerEvent::CameraMoved {
            position: self.camera.position,
            target: self.camera.target,
        });
    }
}
