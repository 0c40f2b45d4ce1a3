//! Loadview Core - Simulation model, scene composition and navigation
//!
//! This crate turns a truck-loading simulation snapshot into render-ready
//! scenes:
//! - Snapshot data model (trucks, boxes, cylinders, compound items)
//! - Geometry translation from corner-anchored simulation space to
//!   centroid-anchored render space
//! - Scene graph construction, one scene per truck plus an unplaced-items scene
//! - Navigation between scenes and the UI affordances derived from it

pub mod camera;
pub mod composer;
pub mod geometry;
pub mod model;
pub mod navigation;
pub mod render;
pub mod scene;
pub mod viewer;

pub use camera::{CameraRig, CameraView};
pub use composer::{ComposerSettings, SceneComposer};
pub use geometry::{Axis, AxisSpan, Pose};
pub use glam::DVec3;
pub use model::{
    BoxItem, CompoundItem, CylinderItem, Dimensions, EulerAxes, Item, Placement, PlacementError,
    PlacementRequest, Rotation, SimulationSnapshot, SnapshotError, Truck, UnsupportedItem,
};
pub use navigation::{Affordances, NavigationState, View};
pub use render::{FrameCounter, SceneRenderer};
pub use scene::{Material, NodeId, NodeKind, Scene, SceneKind, SceneNode, Shape, SkippedItem};
pub use viewer::{LoadOutcome, LoadTicket, PackingViewer, ViewerError, ViewerEvent};
