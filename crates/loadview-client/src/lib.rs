//! Loadview Client - Planning service access
//!
//! Fetches simulation snapshots, submits manual placements and feeds the
//! results into a [`loadview_core::PackingViewer`].

pub mod client;
pub mod session;

pub use client::{ClientConfig, ClientError, PlanningClient};
pub use session::ViewerSession;
