//! Scene composition
//!
//! Builds one scene per truck and, on request, a scene laying out the items
//! that were not placed. Items that cannot be understood are left out and
//! recorded on the scene; they never abort the build.

use glam::DVec3;
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, info, warn};

use crate::geometry::{self, Pose};
use crate::model::{Dimensions, Item, Truck};
use crate::scene::{Material, NodeId, NodeKind, Scene, SceneKind, SceneNode, Shape, SkippedItem};

/// Appearance and layout constants
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerSettings {
    /// Gap between consecutive items in the unplaced layout
    pub unplaced_gap: f64,
    pub floor_size: f64,
    pub background: u32,
    pub truck_color: u32,
    pub truck_opacity: f32,
    pub floor_color: u32,
    pub floor_opacity: f32,
    pub outline_color: u32,
    pub cylinder_segments: u32,
    /// Item colours, cycled in composition order
    pub palette: Vec<u32>,
}

impl ComposerSettings {
    pub const DEFAULT_UNPLACED_GAP: f64 = 3.0;
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            unplaced_gap: Self::DEFAULT_UNPLACED_GAP,
            floor_size: 2000.0,
            background: 0xf0f0f0,
            truck_color: 0x808080,
            truck_opacity: 0.3,
            floor_color: 0xcccccc,
            floor_opacity: 0.5,
            outline_color: 0x000000,
            cylinder_segments: 32,
            palette: vec![
                0x4e79a7, 0xf28e2b, 0xe15759, 0x76b7b2, 0x59a14f, 0xedc948, 0xb07aa1,
                0xff9da7, 0x9c755f, 0xbab0ac,
            ],
        }
    }
}

/// Cycles through the palette as items are composed
struct ColorCursor<'a> {
    palette: &'a [u32],
    next: usize,
}

impl ColorCursor<'_> {
    fn next_color(&mut self) -> u32 {
        if self.palette.is_empty() {
            return 0xcccccc;
        }
        let color = self.palette[self.next % self.palette.len()];
        self.next += 1;
        color
    }
}

/// Where an item goes relative to its parent
#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// Minimum corner in simulation coordinates
    Corner([f64; 3]),
    /// Render-space translation of the item node itself
    Centroid(DVec3),
}

pub struct SceneComposer {
    settings: ComposerSettings,
    labels_visible: bool,
}

impl Default for SceneComposer {
    fn default() -> Self {
        Self::new(ComposerSettings::default())
    }
}

impl SceneComposer {
    pub fn new(settings: ComposerSettings) -> Self {
        Self {
            settings,
            labels_visible: false,
        }
    }

    /// Visibility given to dimension labels on scenes built from now on
    pub fn set_labels_visible(&mut self, visible: bool) {
        self.labels_visible = visible;
    }

    pub fn labels_visible(&self) -> bool {
        self.labels_visible
    }

    /// Build the scene for truck `index`: shell plus every loaded item
    pub fn build_truck_scene(&self, index: usize, truck: &Truck) -> Scene {
        let mut scene = self.base_scene(SceneKind::Truck(index), true);
        let root = scene.root();
        self.add_truck(&mut scene, &truck.dimensions);

        let mut colors = self.colors();
        for (i, item) in truck.loaded_items.iter().enumerate() {
            let path = format!("trucks[{}].loaded_items[{}]", index, i);
            let corner = item.placement().map(|p| p.corner()).unwrap_or([0.0; 3]);
            self.add_item(&mut scene, root, item, Anchor::Corner(corner), &path, &mut colors);
        }

        info!(
            truck = index,
            items = scene.items().len(),
            skipped = scene.skipped().len(),
            "Composed truck scene"
        );
        scene
    }

    /// Lay unplaced items out left to right along render X
    ///
    /// Supplied positions are discarded. Each item is spaced by its
    /// reference extent plus the configured gap and rests on the floor plane.
    pub fn build_unplaced_scene(&self, items: &[Item]) -> Scene {
        let mut scene = self.base_scene(SceneKind::Unplaced, false);
        let root = scene.root();
        let mut colors = self.colors();
        let mut cursor = 0.0;

        for (i, item) in items.iter().enumerate() {
            let item = item.without_position();
            let path = format!("unplaced_items[{}]", i);
            let Some(extent) = geometry::reference_extent(&item) else {
                self.skip(&mut scene, &path, &item);
                continue;
            };

            let centroid = DVec3::new(
                cursor + extent.length / 2.0,
                extent.height / 2.0,
                extent.width / 2.0,
            );
            self.add_item(&mut scene, root, &item, Anchor::Centroid(centroid), &path, &mut colors);
            cursor += extent.length + self.settings.unplaced_gap;
        }

        info!(
            items = scene.items().len(),
            skipped = scene.skipped().len(),
            width = cursor,
            "Composed unplaced items scene"
        );
        scene
    }

    fn colors(&self) -> ColorCursor<'_> {
        ColorCursor {
            palette: &self.settings.palette,
            next: 0,
        }
    }

    fn base_scene(&self, kind: SceneKind, with_floor: bool) -> Scene {
        let mut scene = Scene::new(kind, self.settings.background);
        let root = scene.root();

        scene.add(
            root,
            SceneNode::new(NodeKind::AmbientLight { color: 0x404040 }, Pose::IDENTITY),
        );
        for position in [DVec3::new(-10.0, 10.0, -10.0), DVec3::new(10.0, 10.0, 10.0)] {
            scene.add(
                root,
                SceneNode::new(
                    NodeKind::DirectionalLight {
                        color: 0xffffff,
                        intensity: 1.0,
                    },
                    Pose::from_translation(position),
                ),
            );
        }

        if with_floor {
            scene.add(
                root,
                SceneNode::new(
                    NodeKind::Floor {
                        size: self.settings.floor_size,
                    },
                    Pose::from_euler(DVec3::ZERO, DVec3::new(-FRAC_PI_2, 0.0, 0.0)),
                )
                .with_material(Material::translucent(
                    self.settings.floor_color,
                    self.settings.floor_opacity,
                )),
            );
        }
        scene
    }

    fn add_truck(&self, scene: &mut Scene, dims: &Dimensions) -> NodeId {
        let root = scene.root();
        let truck = scene.add(
            root,
            SceneNode::new(
                NodeKind::Truck {
                    shape: Shape::Cuboid {
                        size: geometry::render_size(dims),
                    },
                },
                geometry::truck_pose(dims),
            )
            .with_material(Material::translucent(
                self.settings.truck_color,
                self.settings.truck_opacity,
            )),
        );
        self.add_outline(scene, truck);
        truck
    }

    fn add_item(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        item: &Item,
        anchor: Anchor,
        path: &str,
        colors: &mut ColorCursor<'_>,
    ) -> Option<NodeId> {
        let corner = match anchor {
            Anchor::Corner(corner) => corner,
            Anchor::Centroid(_) => [0.0; 3],
        };
        let Some(mut pose) = geometry::item_pose(item, corner) else {
            self.skip(scene, path, item);
            return None;
        };
        if let Anchor::Centroid(translation) = anchor {
            pose.translation = translation;
        }

        match item {
            Item::Box(b) => {
                let shape = Shape::Cuboid {
                    size: geometry::render_size(&b.dimensions),
                };
                Some(self.add_primitive(scene, parent, item.kind(), shape, pose, colors))
            }
            Item::Cylinder(c) => {
                let shape = Shape::Cylinder {
                    radius: c.diameter / 2.0,
                    height: c.height,
                    segments: self.settings.cylinder_segments,
                };
                Some(self.add_primitive(scene, parent, item.kind(), shape, pose, colors))
            }
            Item::Compound(c) => {
                let group = scene.add(parent, SceneNode::new(NodeKind::Group, Pose::IDENTITY));
                for (i, (child, relative)) in c.items.iter().zip(&c.relative_positions).enumerate() {
                    let child_path = format!("{}.items[{}]", path, i);
                    self.add_item(scene, group, child, Anchor::Corner(*relative), &child_path, colors);
                }

                // The group transform is applied once, after every child sits
                // at its local anchored pose.
                scene.node_mut(group).pose = pose;
                debug!(path = %path, children = scene.node(group).children().len(), "Composed compound item");
                Some(group)
            }
            Item::Unsupported(_) => None,
        }
    }

    fn add_primitive(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        kind: &str,
        shape: Shape,
        pose: Pose,
        colors: &mut ColorCursor<'_>,
    ) -> NodeId {
        let node = scene.add(
            parent,
            SceneNode::new(
                NodeKind::Item {
                    shape,
                    kind: kind.to_string(),
                },
                pose,
            )
            .with_material(Material::opaque(colors.next_color())),
        );
        self.add_outline(scene, node);

        let size = shape.size();
        for span in geometry::axis_spans(pose.translation, size) {
            scene.add(
                node,
                SceneNode::new(
                    NodeKind::DimensionLabel {
                        axis: span.axis,
                        text: span.label(),
                    },
                    Pose::from_translation(span.offset(size)),
                )
                .with_visibility(self.labels_visible),
            );
        }

        debug!(kind = %kind, position = ?pose.translation, "Composed item");
        node
    }

    fn add_outline(&self, scene: &mut Scene, parent: NodeId) {
        scene.add(
            parent,
            SceneNode::new(
                NodeKind::Outline {
                    color: self.settings.outline_color,
                },
                Pose::IDENTITY,
            ),
        );
    }

    fn skip(&self, scene: &mut Scene, path: &str, item: &Item) {
        let reason = match item {
            Item::Unsupported(u) => u.reason.clone(),
            _ => "item cannot be placed".to_string(),
        };
        warn!(path = %path, kind = %item.kind(), reason = %reason, "Skipping item");
        scene.record_skipped(SkippedItem {
            path: path.to_string(),
            kind: item.kind().to_string(),
            reason,
        });
    }
}
