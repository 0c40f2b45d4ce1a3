//! Camera rig and named viewpoints

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Offset from the focus point used after each load
pub const FOCUS_OFFSET: DVec3 = DVec3::new(3000.0, 1000.0, 3000.0);

/// Perspective camera looking at a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Vertical field of view in degrees
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub position: DVec3,
    pub target: DVec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 100_000.0,
            position: FOCUS_OFFSET,
            target: DVec3::ZERO,
        }
    }
}

impl CameraRig {
    pub fn set_pose(&mut self, position: DVec3, target: DVec3) {
        self.position = position;
        self.target = target;
    }

    /// Look at `center` from the standard offset
    pub fn focus_on(&mut self, center: DVec3) {
        self.set_pose(center + FOCUS_OFFSET, center);
    }

    pub fn apply(&mut self, view: &CameraView) {
        self.set_pose(DVec3::from_array(view.position), DVec3::from_array(view.target));
    }
}

/// A named camera pose, as stored in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub label: String,
    pub position: [f64; 3],
    pub target: [f64; 3],
}

impl CameraView {
    pub fn new(label: impl Into<String>, position: [f64; 3], target: [f64; 3]) -> Self {
        Self {
            label: label.into(),
            position,
            target,
        }
    }

    /// Viewpoints used for capturing the standard screenshot set
    pub fn screenshot_presets() -> Vec<CameraView> {
        let target = [315.5, 55.0, 50.0];
        vec![
            CameraView::new("front-left", [-90.38, 153.0, -211.17], target),
            CameraView::new("side-left", [314.72, 114.89, -323.39], target),
            CameraView::new("side-right", [319.45, 86.59, 426.82], target),
            CameraView::new("top-down", [315.2, 452.43, 21.12], target),
        ]
    }
}
