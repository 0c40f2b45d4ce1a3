//! Plain-text scene renderer

use loadview_core::{CameraRig, DVec3, NodeId, NodeKind, Scene, SceneKind, SceneRenderer, Shape};
use std::fmt::Write;

/// Renders scenes as an indented outline
#[derive(Debug, Default)]
pub struct TextRenderer {
    output: String,
}

impl TextRenderer {
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    fn node(&mut self, scene: &Scene, id: NodeId, depth: usize) {
        let node = scene.node(id);
        if !node.visible {
            return;
        }
        let at = fmt_vec(scene.world_pose(id).translation);
        let indent = "  ".repeat(depth);

        let line = match &node.kind {
            NodeKind::Truck { shape } => Some(format!("truck {} at {}", fmt_shape(shape), at)),
            NodeKind::Item { shape, kind } => {
                Some(format!("{} {} at {}", kind, fmt_shape(shape), at))
            }
            NodeKind::Group => Some(format!(
                "compound ({} parts) at {}",
                node.children().len(),
                at
            )),
            NodeKind::DimensionLabel { text, .. } => Some(text.clone()),
            NodeKind::Floor { size } => Some(format!("floor {:.0} x {:.0}", size, size)),
            _ => None,
        };

        if let Some(line) = line {
            let _ = writeln!(self.output, "{}{}", indent, line);
        }
        for child in node.children() {
            self.node(scene, *child, depth + 1);
        }
    }
}

impl SceneRenderer for TextRenderer {
    fn render(&mut self, scene: &Scene, camera: &CameraRig) {
        let title = match scene.kind() {
            SceneKind::Truck(i) => format!("Truck {}", i),
            SceneKind::Unplaced => "Unplaced items".to_string(),
        };
        let _ = writeln!(
            self.output,
            "{} ({} items, camera {} -> {})",
            title,
            scene.items().len(),
            fmt_vec(camera.position),
            fmt_vec(camera.target)
        );

        for child in scene.node(scene.root()).children() {
            self.node(scene, *child, 1);
        }
        for skipped in scene.skipped() {
            let _ = writeln!(
                self.output,
                "  skipped {} ({}): {}",
                skipped.path, skipped.kind, skipped.reason
            );
        }
    }
}

fn fmt_vec(v: DVec3) -> String {
    format!("({:.1}, {:.1}, {:.1})", v.x, v.y, v.z)
}

fn fmt_shape(shape: &Shape) -> String {
    let size = shape.size();
    format!("{:.1} x {:.1} x {:.1}", size.x, size.y, size.z)
}
