//! Render-side scene graph
//!
//! A scene is an arena of nodes with local poses. The rendering
//! collaborator walks it from the root; nothing here draws anything.

use glam::DVec3;

use crate::geometry::{Axis, Pose};

/// Index of a node inside its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Which view a scene belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Truck(usize),
    Unplaced,
}

/// Primitive geometry, sized in render space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cuboid { size: DVec3 },
    /// Upright along render Y
    Cylinder {
        radius: f64,
        height: f64,
        segments: u32,
    },
}

impl Shape {
    /// Bounding size along render X, Y, Z
    pub fn size(&self) -> DVec3 {
        match *self {
            Shape::Cuboid { size } => size,
            Shape::Cylinder { radius, height, .. } => {
                DVec3::new(radius * 2.0, height, radius * 2.0)
            }
        }
    }
}

/// Surface appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// 0xRRGGBB
    pub color: u32,
    pub opacity: f32,
}

impl Material {
    pub fn opaque(color: u32) -> Self {
        Self { color, opacity: 1.0 }
    }

    pub fn translucent(color: u32, opacity: f32) -> Self {
        Self { color, opacity }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    AmbientLight { color: u32 },
    DirectionalLight { color: u32, intensity: f32 },
    /// Square ground plane lying in render X/Z
    Floor { size: f64 },
    Truck { shape: Shape },
    Item { shape: Shape, kind: String },
    /// Compound item; carries no geometry of its own
    Group,
    /// Edge outline of the parent's shape
    Outline { color: u32 },
    DimensionLabel { axis: Axis, text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: NodeKind,
    /// Pose relative to the parent node
    pub pose: Pose,
    pub material: Option<Material>,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(kind: NodeKind, pose: Pose) -> Self {
        Self {
            kind,
            pose,
            material: None,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// An item left out of a scene while composing it
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    /// Location in the snapshot, e.g. `trucks[0].loaded_items[3]`
    pub path: String,
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    kind: SceneKind,
    background: u32,
    nodes: Vec<SceneNode>,
    skipped: Vec<SkippedItem>,
}

impl Scene {
    /// Create an empty scene holding only its root
    pub fn new(kind: SceneKind, background: u32) -> Self {
        Self {
            kind,
            background,
            nodes: vec![SceneNode::new(NodeKind::Root, Pose::IDENTITY)],
            skipped: Vec::new(),
        }
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Attach `node` as the last child of `parent`
    pub fn add(&mut self, parent: NodeId, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Objects attached directly to the root: lights, floor, truck, items
    pub fn object_count(&self) -> usize {
        self.node(self.root()).children.len()
    }

    /// Top-level item nodes (primitives and compound groups), in order
    pub fn items(&self) -> Vec<NodeId> {
        self.node(self.root())
            .children
            .iter()
            .copied()
            .filter(|id| matches!(self.node(*id).kind, NodeKind::Item { .. } | NodeKind::Group))
            .collect()
    }

    pub fn truck(&self) -> Option<NodeId> {
        self.node(self.root())
            .children
            .iter()
            .copied()
            .find(|id| matches!(self.node(*id).kind, NodeKind::Truck { .. }))
    }

    pub fn labels(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| matches!(n.kind, NodeKind::DimensionLabel { .. }))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        for node in &mut self.nodes {
            if matches!(node.kind, NodeKind::DimensionLabel { .. }) {
                node.visible = visible;
            }
        }
    }

    /// Pose of a node in world space
    pub fn world_pose(&self, id: NodeId) -> Pose {
        let mut chain = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.node(parent).parent;
        }
        chain
            .iter()
            .rev()
            .fold(Pose::IDENTITY, |acc, id| acc.then(&self.node(*id).pose))
    }

    pub fn skipped(&self) -> &[SkippedItem] {
        &self.skipped
    }

    pub(crate) fn record_skipped(&mut self, skipped: SkippedItem) {
        self.skipped.push(skipped);
    }
}
