//! Simulation snapshot data model
//!
//! The planning service describes trucks and their items in its own frame:
//! X is length, Y is width (depth) and Z is height. Every position in a
//! snapshot is the minimum corner of the item, never its centroid.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to parse simulation snapshot: {0}")]
    ParseError(String),
    #[error("Invalid simulation data format: {0}")]
    Malformed(String),
    #[error("Simulation contains no trucks")]
    NoTrucks,
    #[error("Truck {index} has invalid dimensions: {reason}")]
    InvalidTruck { index: usize, reason: String },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum PlacementError {
    #[error("Placement {field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Extents of a box-like shape along simulation X, Y and Z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const ZERO: Self = Self {
        length: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// All three extents are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        [self.length, self.width, self.height]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Euler angles in radians, accepted as `[rx, ry, rz]` or `{x, y, z}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rotation {
    Array([f64; 3]),
    Axes(EulerAxes),
}

/// Object form of a rotation; missing axes are zero, unknown keys are rejected
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EulerAxes {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Rotation {
    pub fn to_array(&self) -> [f64; 3] {
        match *self {
            Rotation::Array(r) => r,
            Rotation::Axes(EulerAxes { x, y, z }) => [x, y, z],
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Array([0.0; 3])
    }
}

/// Corner position and rotation of an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

impl Placement {
    /// Minimum corner, the simulation origin when no position was supplied
    pub fn corner(&self) -> [f64; 3] {
        self.position.unwrap_or([0.0; 3])
    }

    pub fn euler(&self) -> [f64; 3] {
        self.rotation.map(|r| r.to_array()).unwrap_or([0.0; 3])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoxItem {
    pub dimensions: Dimensions,
    #[serde(flatten)]
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CylinderItem {
    pub diameter: f64,
    pub height: f64,
    #[serde(flatten)]
    pub placement: Placement,
}

impl CylinderItem {
    /// Bounding extents: length and width are both the diameter
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.diameter, self.diameter, self.height)
    }
}

/// Rigid group of sub-items at corner offsets from the group origin
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompoundItem {
    pub items: Vec<Item>,
    pub relative_positions: Vec<[f64; 3]>,
    #[serde(flatten)]
    pub placement: Placement,
}

/// An entry that could not be understood; skipped when composing scenes
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedItem {
    /// The `type` tag as supplied, `<missing>` when absent
    pub kind: String,
    pub reason: String,
}

/// A loadable item
///
/// Deserialising a single item never fails: unknown tags and malformed
/// shapes become [`Item::Unsupported`] so one bad entry cannot take down a
/// whole snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Box(BoxItem),
    Cylinder(CylinderItem),
    Compound(CompoundItem),
    Unsupported(UnsupportedItem),
}

impl Item {
    /// Classify a raw JSON item by its `type` tag
    pub fn from_value(value: Value) -> Self {
        let kind = match value.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            None => return Item::unsupported("<missing>", "item has no type tag"),
        };

        let parsed = match kind.as_str() {
            "box" => serde_json::from_value(value).map(Item::Box),
            "cylinder" => serde_json::from_value(value).map(Item::Cylinder),
            "compound" => serde_json::from_value(value).map(Item::Compound),
            _ => return Item::unsupported(&kind, "unrecognized item type"),
        };

        match parsed {
            Ok(item) => match item.check() {
                Ok(()) => item,
                Err(reason) => Item::unsupported(&kind, reason),
            },
            Err(e) => Item::unsupported(&kind, e.to_string()),
        }
    }

    fn unsupported(kind: &str, reason: impl Into<String>) -> Self {
        Item::Unsupported(UnsupportedItem {
            kind: kind.to_string(),
            reason: reason.into(),
        })
    }

    fn check(&self) -> Result<(), String> {
        match self {
            Item::Box(b) if !b.dimensions.is_valid() => {
                Err(format!("invalid dimensions {:?}", b.dimensions))
            }
            Item::Cylinder(c) if !c.dimensions().is_valid() => Err(format!(
                "invalid diameter {} or height {}",
                c.diameter, c.height
            )),
            Item::Compound(c) if c.items.len() != c.relative_positions.len() => Err(format!(
                "{} items but {} relative positions",
                c.items.len(),
                c.relative_positions.len()
            )),
            _ => Ok(()),
        }
    }

    /// The `type` tag this item was parsed from
    pub fn kind(&self) -> &str {
        match self {
            Item::Box(_) => "box",
            Item::Cylinder(_) => "cylinder",
            Item::Compound(_) => "compound",
            Item::Unsupported(u) => &u.kind,
        }
    }

    pub fn placement(&self) -> Option<&Placement> {
        match self {
            Item::Box(b) => Some(&b.placement),
            Item::Cylinder(c) => Some(&c.placement),
            Item::Compound(c) => Some(&c.placement),
            Item::Unsupported(_) => None,
        }
    }

    fn placement_mut(&mut self) -> Option<&mut Placement> {
        match self {
            Item::Box(b) => Some(&mut b.placement),
            Item::Cylinder(c) => Some(&mut c.placement),
            Item::Compound(c) => Some(&mut c.placement),
            Item::Unsupported(_) => None,
        }
    }

    /// Copy of this item with any supplied position discarded
    pub fn without_position(&self) -> Item {
        let mut item = self.clone();
        if let Some(placement) = item.placement_mut() {
            placement.position = None;
        }
        item
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Item::from_value(value))
    }
}

/// A truck and the items loaded into it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Truck {
    pub dimensions: Dimensions,
    #[serde(default)]
    pub loaded_items: Vec<Item>,
}

/// Full state produced by the planning service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationSnapshot {
    pub trucks: Vec<Truck>,
    #[serde(default)]
    pub unplaced_items: Vec<Item>,
}

impl SimulationSnapshot {
    /// Parse a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| SnapshotError::ParseError(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse a snapshot from an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        match value.get("trucks") {
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(SnapshotError::Malformed(
                    "`trucks` is not a sequence".to_string(),
                ))
            }
            None => return Err(SnapshotError::Malformed("missing `trucks`".to_string())),
        }
        serde_json::from_value(value).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    /// Parse a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reject snapshots that cannot produce a single truck scene
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.trucks.is_empty() {
            return Err(SnapshotError::NoTrucks);
        }
        for (index, truck) in self.trucks.iter().enumerate() {
            if !truck.dimensions.is_valid() {
                return Err(SnapshotError::InvalidTruck {
                    index,
                    reason: format!("{:?}", truck.dimensions),
                });
            }
        }
        Ok(())
    }
}

/// Manual placement submitted to the planning service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub item_id: i64,
    pub truck_id: i64,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

impl PlacementRequest {
    pub fn validate(&self) -> Result<(), PlacementError> {
        let fields = [
            ("position.x", self.position[0]),
            ("position.y", self.position[1]),
            ("position.z", self.position[2]),
            ("rotation.x", self.rotation[0]),
            ("rotation.y", self.rotation[1]),
            ("rotation.z", self.rotation[2]),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(PlacementError::NonFinite { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_truck_snapshot() {
        let json = r#"{
            "trucks": [{
                "dimensions": {"length": 600, "width": 200, "height": 200},
                "loaded_items": [{
                    "type": "box",
                    "dimensions": {"length": 100, "width": 50, "height": 50},
                    "position": [0, 0, 0],
                    "rotation": [0, 0, 0]
                }]
            }],
            "unplaced_items": []
        }"#;

        let snapshot = SimulationSnapshot::from_json(json).unwrap();
        snapshot.validate().unwrap();
        assert_eq!(snapshot.trucks.len(), 1);
        assert_eq!(snapshot.trucks[0].dimensions, Dimensions::new(600.0, 200.0, 200.0));

        match &snapshot.trucks[0].loaded_items[0] {
            Item::Box(b) => {
                assert_eq!(b.dimensions.length, 100.0);
                assert_eq!(b.placement.position, Some([0.0, 0.0, 0.0]));
            }
            other => panic!("expected box, got {:?}", other),
        }
    }

    #[test]
    fn test_rotation_object_form() {
        let item = Item::from_value(json!({
            "type": "cylinder",
            "diameter": 40,
            "height": 90,
            "rotation": {"x": 0.5, "z": 1.5}
        }));

        let placement = item.placement().unwrap();
        assert_eq!(placement.euler(), [0.5, 0.0, 1.5]);
        assert_eq!(placement.position, None);
        assert_eq!(placement.corner(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rotation_with_unknown_axis_is_unsupported() {
        let item = Item::from_value(json!({
            "type": "box",
            "dimensions": {"length": 1, "width": 1, "height": 1},
            "rotation": {"yaw": 1.0}
        }));
        assert!(matches!(item, Item::Unsupported(ref u) if u.kind == "box"));

        let empty = Item::from_value(json!({
            "type": "box",
            "dimensions": {"length": 1, "width": 1, "height": 1},
            "rotation": {}
        }));
        assert_eq!(empty.placement().unwrap().euler(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let item = Item::from_value(json!({"type": "sphere", "radius": 3}));
        assert_eq!(item.kind(), "sphere");
        assert!(matches!(item, Item::Unsupported(_)));

        let item = Item::from_value(json!({"dimensions": {"length": 1, "width": 1, "height": 1}}));
        assert_eq!(item.kind(), "<missing>");
    }

    #[test]
    fn test_malformed_known_type_is_unsupported() {
        let missing_dims = Item::from_value(json!({"type": "box", "position": [0, 0, 0]}));
        assert!(matches!(missing_dims, Item::Unsupported(ref u) if u.kind == "box"));

        let negative = Item::from_value(json!({
            "type": "box",
            "dimensions": {"length": -1, "width": 1, "height": 1}
        }));
        assert!(matches!(negative, Item::Unsupported(_)));

        let mismatched = Item::from_value(json!({
            "type": "compound",
            "items": [{"type": "box", "dimensions": {"length": 1, "width": 1, "height": 1}}],
            "relative_positions": []
        }));
        match mismatched {
            Item::Unsupported(u) => assert!(u.reason.contains("1 items but 0 relative positions")),
            other => panic!("expected unsupported, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_compound_keeps_bad_children_local() {
        let item = Item::from_value(json!({
            "type": "compound",
            "position": [10, 20, 0],
            "items": [
                {"type": "box", "dimensions": {"length": 10, "width": 10, "height": 10}},
                {"type": "pyramid"},
                {
                    "type": "compound",
                    "items": [{"type": "cylinder", "diameter": 4, "height": 8}],
                    "relative_positions": [[0, 0, 10]]
                }
            ],
            "relative_positions": [[0, 0, 0], [10, 0, 0], [20, 0, 0]]
        }));

        let Item::Compound(compound) = item else {
            panic!("expected compound");
        };
        assert_eq!(compound.items.len(), 3);
        assert_eq!(compound.items[1].kind(), "pyramid");
        assert!(matches!(compound.items[2], Item::Compound(_)));
        assert_eq!(compound.placement.corner(), [10.0, 20.0, 0.0]);
    }

    #[test]
    fn test_without_position() {
        let item = Item::from_value(json!({
            "type": "box",
            "dimensions": {"length": 1, "width": 2, "height": 3},
            "position": [5, 5, 5],
            "rotation": [0, 1, 0]
        }));
        let stripped = item.without_position();
        let placement = stripped.placement().unwrap();
        assert_eq!(placement.position, None);
        assert_eq!(placement.euler(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_malformed_snapshots() {
        let missing = SimulationSnapshot::from_json(r#"{"unplaced_items": []}"#);
        assert!(matches!(missing, Err(SnapshotError::Malformed(_))));

        let not_a_list = SimulationSnapshot::from_json(r#"{"trucks": {"a": 1}}"#);
        assert!(matches!(not_a_list, Err(SnapshotError::Malformed(_))));

        let garbage = SimulationSnapshot::from_json("not json");
        assert!(matches!(garbage, Err(SnapshotError::ParseError(_))));

        let empty = SimulationSnapshot::from_json(r#"{"trucks": []}"#).unwrap();
        assert!(matches!(empty.validate(), Err(SnapshotError::NoTrucks)));

        let flat = SimulationSnapshot::from_json(
            r#"{"trucks": [{"dimensions": {"length": 600, "width": 0, "height": 200}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            flat.validate(),
            Err(SnapshotError::InvalidTruck { index: 0, .. })
        ));
    }

    #[test]
    fn test_snapshot_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sim1.json");
        std::fs::write(
            &path,
            r#"{"trucks": [{"dimensions": {"length": 1, "width": 1, "height": 1}}],
                "unplaced_items": [{"type": "cylinder", "diameter": 2, "height": 3}]}"#,
        )
        .unwrap();

        let snapshot = SimulationSnapshot::from_file(&path).unwrap();
        assert!(snapshot.trucks[0].loaded_items.is_empty());
        assert_eq!(snapshot.unplaced_items.len(), 1);

        let missing = SimulationSnapshot::from_file(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(SnapshotError::IoError(_))));
    }

    #[test]
    fn test_placement_request_contract() {
        let request = PlacementRequest {
            item_id: 7,
            truck_id: 1,
            position: [10.0, 20.0, 0.0],
            rotation: [0.0, 0.0, 1.5],
        };
        request.validate().unwrap();

        let value = serde_json::to_value(request).unwrap();
        assert_eq!(
            value,
            json!({"item_id": 7, "truck_id": 1, "position": [10.0, 20.0, 0.0], "rotation": [0.0, 0.0, 1.5]})
        );

        let bad = PlacementRequest {
            position: [f64::NAN, 0.0, 0.0],
            ..request
        };
        assert!(matches!(
            bad.validate(),
            Err(PlacementError::NonFinite { field: "position.x", .. })
        ));
    }
}
