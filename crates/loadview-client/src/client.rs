//! HTTP client for the packing planning service

use loadview_core::{PlacementError, PlacementRequest, SimulationSnapshot, SnapshotError, ViewerError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to planning service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Planning service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("Invalid placement: {0}")]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

/// Where the planning service lives and how to talk to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, without the `/packing` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Simulation fetched on startup
    #[serde(default = "default_simulation")]
    pub simulation: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Honour HTTP(S)_PROXY from the environment
    #[serde(default = "default_use_system_proxy")]
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            simulation: default_simulation(),
            timeout_secs: default_timeout(),
            use_system_proxy: default_use_system_proxy(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_simulation() -> String {
    "sim1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_use_system_proxy() -> bool {
    true
}

pub struct PlanningClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl PlanningClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    pub fn simulation_url(&self, name: &str) -> String {
        format!("{}/packing/simulations/{}.json", self.base(), name)
    }

    pub fn state_url(&self) -> String {
        format!("{}/packing/get_state", self.base())
    }

    pub fn placement_url(&self) -> String {
        format!("{}/packing/place_item", self.base())
    }

    /// Fetch a stored simulation by name
    pub async fn fetch_simulation(&self, name: &str) -> Result<SimulationSnapshot, ClientError> {
        self.get_snapshot(&self.simulation_url(name)).await
    }

    /// Fetch the service's current packing state
    pub async fn fetch_state(&self) -> Result<SimulationSnapshot, ClientError> {
        self.get_snapshot(&self.state_url()).await
    }

    /// Submit a manual placement and return the service's reply body
    pub async fn submit_placement(&self, request: &PlacementRequest) -> Result<Value, ClientError> {
        request.validate()?;
        let url = self.placement_url();
        info!(
            url = %url,
            item = request.item_id,
            truck = request.truck_id,
            "Submitting placement"
        );

        let response = self.http.post(&url).json(request).send().await?;
        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }

    async fn get_snapshot(&self, url: &str) -> Result<SimulationSnapshot, ClientError> {
        debug!(url = %url, "Fetching simulation snapshot");
        let response = self.http.get(url).send().await?;
        let body = check_status(response).await?.text().await?;
        let snapshot = SimulationSnapshot::from_json(&body)?;
        info!(
            url = %url,
            trucks = snapshot.trucks.len(),
            unplaced = snapshot.unplaced_items.len(),
            "Fetched simulation snapshot"
        );
        Ok(snapshot)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status.canonical_reason().unwrap_or("request failed"));
    warn!(url = %url, status = %status, message = %message, "Planning service rejected request");
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Pull a readable message out of an error body
fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "detail"] {
            match value.get(key) {
                Some(Value::String(s)) => return s.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = PlanningClient::new(ClientConfig {
            base_url: "http://planner:9000/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.simulation_url("sim1"),
            "http://planner:9000/packing/simulations/sim1.json"
        );
        assert_eq!(client.state_url(), "http://planner:9000/packing/get_state");
        assert_eq!(client.placement_url(), "http://planner:9000/packing/place_item");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "Truck is full"}"#, "x"), "Truck is full");
        assert_eq!(error_message(r#"{"detail": "Not Found"}"#, "x"), "Not Found");
        assert_eq!(
            error_message(r#"{"detail": [{"loc": ["body"]}]}"#, "x"),
            r#"[{"loc":["body"]}]"#
        );
        assert_eq!(error_message("  upstream timeout \n", "x"), "upstream timeout");
        assert_eq!(error_message("", "Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_config_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.simulation, "sim1");
        assert_eq!(config.timeout_secs, 30);
    }
}
