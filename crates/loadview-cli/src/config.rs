//! Configuration loading

use anyhow::{bail, Context, Result};
use loadview_client::ClientConfig;
use loadview_core::{CameraView, ComposerSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ClientConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Camera presets visited by the `views` command
    #[serde(default = "default_views", rename = "view")]
    pub views: Vec<CameraView>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ClientConfig::default(),
            viewer: ViewerConfig::default(),
            views: default_views(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Show dimension labels from the start
    #[serde(default)]
    pub show_dimensions: bool,
    /// Spacing between items in the unplaced view
    #[serde(default = "default_unplaced_gap")]
    pub unplaced_gap: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            show_dimensions: false,
            unplaced_gap: default_unplaced_gap(),
        }
    }
}

impl ViewerConfig {
    /// Reject settings that would make the unplaced layout overlap
    pub fn validate(&self) -> Result<()> {
        if !self.unplaced_gap.is_finite() || self.unplaced_gap < 0.0 {
            bail!(
                "viewer.unplaced_gap must be a non-negative number, got {}",
                self.unplaced_gap
            );
        }
        Ok(())
    }

    pub fn composer_settings(&self) -> ComposerSettings {
        ComposerSettings {
            unplaced_gap: self.unplaced_gap,
            ..ComposerSettings::default()
        }
    }
}

fn default_unplaced_gap() -> f64 {
    ComposerSettings::DEFAULT_UNPLACED_GAP
}

fn default_views() -> Vec<CameraView> {
    CameraView::screenshot_presets()
}

/// Load configuration from file, or use defaults if it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config
            .viewer
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Write the default configuration to `path`
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("loadview.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.views.len(), 4);
        assert_eq!(config.viewer.unplaced_gap, 3.0);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadview.toml");
        std::fs::write(
            &path,
            r#"
[service]
base_url = "http://planner:9000"

[viewer]
show_dimensions = true

[[view]]
label = "rear"
position = [900.0, 150.0, 100.0]
target = [300.0, 100.0, 100.0]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.service.base_url, "http://planner:9000");
        assert_eq!(config.service.simulation, "sim1");
        assert!(config.viewer.show_dimensions);
        assert_eq!(config.viewer.unplaced_gap, 3.0);
        assert_eq!(config.views.len(), 1);
        assert_eq!(config.views[0].label, "rear");
    }

    #[test]
    fn test_saved_default_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadview.toml");
        save_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadview.toml");
        std::fs::write(&path, "[viewer]\nunplaced_gap = \"wide\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_unplaced_gap_must_be_non_negative() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadview.toml");
        for gap in ["-1.0", "nan", "inf"] {
            std::fs::write(&path, format!("[viewer]\nunplaced_gap = {}\n", gap)).unwrap();
            assert!(load_config(&path).is_err(), "gap {} accepted", gap);
        }

        std::fs::write(&path, "[viewer]\nunplaced_gap = 0.0\n").unwrap();
        assert_eq!(load_config(&path).unwrap().viewer.unplaced_gap, 0.0);
    }

    #[test]
    fn test_composer_settings() {
        let viewer = ViewerConfig {
            show_dimensions: false,
            unplaced_gap: 10.0,
        };
        assert_eq!(viewer.composer_settings().unplaced_gap, 10.0);
    }
}
