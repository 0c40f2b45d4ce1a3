//! Geometry and anchor translation
//!
//! Simulation space: X = length, Y = width (depth), Z = height (up).
//! Render space: X = length, Y = up, Z = depth.
//!
//! Simulation objects are anchored at their minimum corner; render objects
//! are placed by centroid. Everything here is pure.

use glam::{DQuat, DVec3, EulerRot};
use std::fmt;

use crate::model::{Dimensions, Item};

/// Render-space translation and rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Build from XYZ-order Euler angles in radians
    pub fn from_euler(translation: DVec3, euler: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z),
        }
    }

    /// XYZ-order Euler angles in radians
    pub fn euler(&self) -> DVec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        DVec3::new(x, y, z)
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.translation + self.rotation * point
    }

    /// Pose of `child` (expressed in this pose's frame) in the parent frame
    pub fn then(&self, child: &Pose) -> Pose {
        Pose {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }
}

/// Simulation position to render position: Y and Z trade places
pub fn relabel_position(p: [f64; 3]) -> DVec3 {
    DVec3::new(p[0], p[2], p[1])
}

/// Simulation Euler angles to render Euler angles, same relabeling as positions
pub fn relabel_rotation(r: [f64; 3]) -> DVec3 {
    DVec3::new(r[0], r[2], r[1])
}

/// Render-space size: (length, height, width)
pub fn render_size(dims: &Dimensions) -> DVec3 {
    DVec3::new(dims.length, dims.height, dims.width)
}

/// Render-space centroid of a shape whose minimum corner sits at `corner`
pub fn anchor_to_centroid(corner: [f64; 3], dims: &Dimensions) -> DVec3 {
    relabel_position(corner) + render_size(dims) * 0.5
}

/// Trucks always sit with their minimum corner on the world origin
pub fn truck_pose(dims: &Dimensions) -> Pose {
    Pose::from_translation(render_size(dims) * 0.5)
}

/// Extents used by the anchor formula
///
/// Compound items are dimensionless, so their corner maps straight onto the
/// group origin. `None` for items that cannot be placed at all.
pub fn anchor_extent(item: &Item) -> Option<Dimensions> {
    match item {
        Item::Box(b) => Some(b.dimensions),
        Item::Cylinder(c) => Some(c.dimensions()),
        Item::Compound(_) => Some(Dimensions::ZERO),
        Item::Unsupported(_) => None,
    }
}

/// Extents used for spacing items in the unplaced layout
///
/// A compound is measured by its first child only.
pub fn reference_extent(item: &Item) -> Option<Dimensions> {
    match item {
        Item::Box(b) => Some(b.dimensions),
        Item::Cylinder(c) => Some(c.dimensions()),
        Item::Compound(c) => Some(
            c.items
                .first()
                .and_then(reference_extent)
                .unwrap_or(Dimensions::ZERO),
        ),
        Item::Unsupported(_) => None,
    }
}

/// Local pose of an item anchored by its corner, rotation relabeled
pub fn item_pose(item: &Item, corner: [f64; 3]) -> Option<Pose> {
    let extent = anchor_extent(item)?;
    let euler = item.placement().map(|p| p.euler()).unwrap_or([0.0; 3]);
    Some(Pose::from_euler(
        anchor_to_centroid(corner, &extent),
        relabel_rotation(euler),
    ))
}

/// Render axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Label order: length, width, height
    pub const LABEL_ORDER: [Axis; 3] = [Axis::X, Axis::Z, Axis::Y];

    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    pub fn component(&self, v: DVec3) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Corner-to-corner extent of an object along one render axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpan {
    pub axis: Axis,
    pub min: f64,
    pub max: f64,
}

impl AxisSpan {
    pub fn label(&self) -> String {
        format!("{}: {:.1} to {:.1}", self.axis, self.min, self.max)
    }

    /// Where the label sits relative to the object centroid: on the edge
    /// that runs along `axis`
    pub fn offset(&self, size: DVec3) -> DVec3 {
        let half = size * 0.5;
        match self.axis {
            Axis::X => DVec3::new(0.0, -half.y, -half.z),
            Axis::Y => DVec3::new(-half.x, 0.0, -half.z),
            Axis::Z => DVec3::new(-half.x, -half.y, 0.0),
        }
    }
}

/// Spans along every render axis for an object centred at `centroid`
pub fn axis_spans(centroid: DVec3, size: DVec3) -> [AxisSpan; 3] {
    Axis::LABEL_ORDER.map(|axis| {
        let center = axis.component(centroid);
        let half = axis.component(size) * 0.5;
        AxisSpan {
            axis,
            min: center - half,
            max: center + half,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_anchor_swaps_y_and_z() {
        let dims = Dimensions::new(100.0, 50.0, 30.0);
        for (x, y, z) in [(0.0, 0.0, 0.0), (10.0, 20.0, 5.0), (-4.0, 7.5, 120.0)] {
            let centroid = anchor_to_centroid([x, y, z], &dims);
            assert_close(centroid, DVec3::new(x + 50.0, z + 15.0, y + 25.0));
        }
    }

    #[test]
    fn test_cylinder_uses_diameter_for_length_and_width() {
        let item = Item::from_value(json!({
            "type": "cylinder",
            "diameter": 40,
            "height": 90,
            "position": [10, 20, 30]
        }));
        let pose = item_pose(&item, item.placement().unwrap().corner()).unwrap();
        assert_close(pose.translation, DVec3::new(30.0, 75.0, 40.0));
        assert_eq!(pose.rotation, DQuat::IDENTITY);
    }

    #[test]
    fn test_truck_pose() {
        let pose = truck_pose(&Dimensions::new(600.0, 200.0, 250.0));
        assert_close(pose.translation, DVec3::new(300.0, 125.0, 100.0));
    }

    #[test]
    fn test_rotation_relabel() {
        let item = Item::from_value(json!({
            "type": "box",
            "dimensions": {"length": 1, "width": 1, "height": 1},
            "rotation": [0.0, 0.0, 0.5]
        }));
        // Rotation about simulation height becomes rotation about render Y
        let pose = item_pose(&item, [0.0; 3]).unwrap();
        let expected = DQuat::from_rotation_y(0.5);
        assert!(pose.rotation.abs_diff_eq(expected, 1e-12));
        assert_close(pose.euler(), DVec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_compound_anchor_has_no_half_extent() {
        let item = Item::from_value(json!({
            "type": "compound",
            "items": [],
            "relative_positions": []
        }));
        let pose = item_pose(&item, [10.0, 20.0, 30.0]).unwrap();
        assert_close(pose.translation, DVec3::new(10.0, 30.0, 20.0));
    }

    #[test]
    fn test_pose_composition() {
        let group = Pose::from_euler(
            DVec3::new(100.0, 0.0, 0.0),
            DVec3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
        );
        let child = Pose::from_translation(DVec3::new(10.0, 0.0, 0.0));
        let world = group.then(&child);
        // +X rotated a quarter turn about Y points along -Z
        assert_close(world.translation, DVec3::new(100.0, 0.0, -10.0));
        assert_close(world.translation, group.transform_point(child.translation));
    }

    #[test]
    fn test_reference_extent_uses_first_child() {
        let item = Item::from_value(json!({
            "type": "compound",
            "items": [
                {"type": "cylinder", "diameter": 20, "height": 40},
                {"type": "box", "dimensions": {"length": 500, "width": 500, "height": 500}}
            ],
            "relative_positions": [[0, 0, 0], [20, 0, 0]]
        }));
        assert_eq!(reference_extent(&item), Some(Dimensions::new(20.0, 20.0, 40.0)));

        let empty = Item::from_value(json!({"type": "compound", "items": [], "relative_positions": []}));
        assert_eq!(reference_extent(&empty), Some(Dimensions::ZERO));

        let sphere = Item::from_value(json!({"type": "sphere"}));
        assert_eq!(reference_extent(&sphere), None);
    }

    #[test]
    fn test_axis_span_labels() {
        let size = render_size(&Dimensions::new(100.0, 50.0, 30.0));
        let spans = axis_spans(DVec3::new(50.0, 15.0, 25.0), size);
        let labels: Vec<String> = spans.iter().map(AxisSpan::label).collect();
        assert_eq!(labels, vec!["x: 0.0 to 100.0", "z: 0.0 to 50.0", "y: 0.0 to 30.0"]);

        assert_close(spans[0].offset(size), DVec3::new(0.0, -15.0, -25.0));
        assert_close(spans[1].offset(size), DVec3::new(-50.0, -15.0, 0.0));
        assert_close(spans[2].offset(size), DVec3::new(-50.0, 0.0, -25.0));
    }
}
