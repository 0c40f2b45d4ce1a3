//! Viewer driven by the planning service

use loadview_core::{LoadOutcome, LoadTicket, PackingViewer, PlacementRequest, SimulationSnapshot};
use tracing::info;

use crate::client::{ClientError, PlanningClient};

/// A viewer plus the client that feeds it
///
/// Every load takes a ticket before its request goes out, so a response
/// that arrives after a newer load was started is dropped instead of
/// replacing fresher scenes. Failures leave the viewer untouched.
pub struct ViewerSession {
    client: PlanningClient,
    viewer: PackingViewer,
}

impl ViewerSession {
    pub fn new(client: PlanningClient, viewer: PackingViewer) -> Self {
        Self { client, viewer }
    }

    pub fn client(&self) -> &PlanningClient {
        &self.client
    }

    pub fn viewer(&self) -> &PackingViewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut PackingViewer {
        &mut self.viewer
    }

    pub fn into_viewer(self) -> PackingViewer {
        self.viewer
    }

    /// Load the configured simulation
    pub async fn load_initial(&mut self) -> Result<LoadOutcome, ClientError> {
        let name = self.client.config().simulation.clone();
        let ticket = self.viewer.begin_load();
        let snapshot = self.client.fetch_simulation(&name).await;
        self.apply(ticket, snapshot)
    }

    /// Reload the service's current state
    pub async fn refresh(&mut self) -> Result<LoadOutcome, ClientError> {
        let ticket = self.viewer.begin_load();
        let snapshot = self.client.fetch_state().await;
        self.apply(ticket, snapshot)
    }

    /// Submit a placement, then reload the full state
    pub async fn place_item(&mut self, request: PlacementRequest) -> Result<LoadOutcome, ClientError> {
        self.client.submit_placement(&request).await?;
        info!(item = request.item_id, truck = request.truck_id, "Placement accepted");
        self.refresh().await
    }

    fn apply(
        &mut self,
        ticket: LoadTicket,
        snapshot: Result<SimulationSnapshot, ClientError>,
    ) -> Result<LoadOutcome, ClientError> {
        Ok(self.viewer.apply_snapshot(ticket, snapshot?)?)
    }
}
