//! Loadview - Main entry point
//!
//! Loads truck packing simulations from a file or the planning service and
//! prints the composed scenes.

mod config;
mod outline;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use loadview_client::{PlanningClient, ViewerSession};
use loadview_core::{PackingViewer, PlacementRequest, SimulationSnapshot, ViewerEvent};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::outline::TextRenderer;

#[derive(Parser, Debug)]
#[command(name = "loadview")]
#[command(about = "Truck packing simulation viewer")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "loadview.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every truck scene
    Inspect {
        /// Read the snapshot from a JSON file instead of the planning service
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Also print the unplaced items scene
        #[arg(long)]
        unplaced: bool,
        /// Show dimension labels
        #[arg(long)]
        dimensions: bool,
    },
    /// Submit a manual placement and print the refreshed trucks
    Place {
        #[arg(long)]
        item_id: i64,
        #[arg(long)]
        truck_id: i64,
        /// Minimum corner in simulation coordinates
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true, required = true)]
        position: Vec<f64>,
        /// Euler angles in radians
        #[arg(long, num_args = 3, value_names = ["RX", "RY", "RZ"], allow_negative_numbers = true)]
        rotation: Option<Vec<f64>>,
    },
    /// Move the camera through each configured view
    Views {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Write a default configuration file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Loadview v{}", env!("CARGO_PKG_VERSION"));

    if let Command::InitConfig = args.command {
        return config::save_default_config(&args.config);
    }

    let config = config::load_config(&args.config)?;
    info!(
        service = %config.service.base_url,
        simulation = %config.service.simulation,
        "Configuration loaded"
    );

    match args.command {
        Command::Inspect {
            file,
            unplaced,
            dimensions,
        } => {
            let mut session = open_session(&config, file.as_deref(), dimensions).await?;
            let viewer = session.viewer_mut();
            let mut renderer = TextRenderer::default();
            render_trucks(viewer, &mut renderer);
            if unplaced {
                viewer.view_unplaced();
                viewer.render_frame(&mut renderer);
            }
            log_events(viewer);
            print!("{}", renderer.output());
        }
        Command::Place {
            item_id,
            truck_id,
            position,
            rotation,
        } => {
            let request = PlacementRequest {
                item_id,
                truck_id,
                position: triple(&position, "position")?,
                rotation: match rotation {
                    Some(r) => triple(&r, "rotation")?,
                    None => [0.0; 3],
                },
            };

            let mut session = open_session(&config, None, false).await?;
            session
                .place_item(request)
                .await
                .context("Placement failed")?;

            let viewer = session.viewer_mut();
            let mut renderer = TextRenderer::default();
            render_trucks(viewer, &mut renderer);
            log_events(viewer);
            print!("{}", renderer.output());
        }
        Command::Views { file } => {
            let mut session = open_session(&config, file.as_deref(), false).await?;
            let viewer = session.viewer_mut();
            if !viewer.is_ready() {
                return Err(anyhow!("Viewer did not become ready"));
            }

            for view in &config.views {
                let [x, y, z] = view.position;
                let [lx, ly, lz] = view.target;
                viewer
                    .set_camera_position(x, y, z, lx, ly, lz)
                    .with_context(|| format!("Invalid camera view {}", view.label))?;
                let camera = viewer.camera();
                println!(
                    "{}: position ({:.2}, {:.2}, {:.2}) looking at ({:.2}, {:.2}, {:.2})",
                    view.label,
                    camera.position.x,
                    camera.position.y,
                    camera.position.z,
                    camera.target.x,
                    camera.target.y,
                    camera.target.z
                );
            }
            log_events(viewer);
        }
        Command::InitConfig => {}
    }

    Ok(())
}

/// Build a session and load either `file` or the configured simulation
async fn open_session(
    config: &Config,
    file: Option<&Path>,
    dimensions: bool,
) -> Result<ViewerSession> {
    let client = PlanningClient::new(config.service.clone())
        .context("Failed to create planning service client")?;
    let mut viewer = PackingViewer::new(config.viewer.composer_settings());
    if config.viewer.show_dimensions || dimensions {
        viewer.toggle_dimensions();
    }
    let mut session = ViewerSession::new(client, viewer);

    match file {
        Some(path) => {
            let snapshot = SimulationSnapshot::from_file(path)
                .with_context(|| format!("Failed to read simulation {}", path.display()))?;
            session.viewer_mut().load_simulation(snapshot)?;
        }
        None => {
            session
                .load_initial()
                .await
                .context("Failed to load simulation from planning service")?;
        }
    }
    Ok(session)
}

/// Render every truck scene in order, starting from the first
fn render_trucks(viewer: &mut PackingViewer, renderer: &mut TextRenderer) {
    viewer.show_truck_scenes();
    loop {
        viewer.render_frame(renderer);
        if !viewer.next_truck() {
            break;
        }
    }
}

fn log_events(viewer: &mut PackingViewer) {
    for event in viewer.take_events() {
        match event {
            ViewerEvent::SimulationLoaded { skipped_items, .. } if skipped_items > 0 => {
                info!(skipped = skipped_items, "Some items could not be shown");
            }
            event => debug!(event = ?event, "Viewer event"),
        }
    }
}

fn triple(values: &[f64], name: &str) -> Result<[f64; 3]> {
    <[f64; 3]>::try_from(values)
        .map_err(|_| anyhow!("{} needs exactly 3 values, got {}", name, values.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place() {
        let args = Args::try_parse_from([
            "loadview",
            "place",
            "--item-id",
            "4",
            "--truck-id",
            "1",
            "--position",
            "10",
            "-2.5",
            "0",
            "--rotation",
            "0",
            "0",
            "1.57",
        ])
        .unwrap();

        match args.command {
            Command::Place {
                item_id,
                truck_id,
                position,
                rotation,
            } => {
                assert_eq!(item_id, 4);
                assert_eq!(truck_id, 1);
                assert_eq!(triple(&position, "position").unwrap(), [10.0, -2.5, 0.0]);
                assert_eq!(rotation, Some(vec![0.0, 0.0, 1.57]));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.config, PathBuf::from("loadview.toml"));
    }

    #[test]
    fn test_place_requires_position() {
        let result = Args::try_parse_from(["loadview", "place", "--item-id", "1", "--truck-id", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_triple() {
        assert!(triple(&[1.0, 2.0], "position").is_err());
        assert_eq!(triple(&[1.0, 2.0, 3.0], "position").unwrap(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_render_trucks_visits_every_truck() {
        let truck = r#"{"dimensions": {"length": 10, "width": 10, "height": 10}}"#;
        let json = format!(r#"{{"trucks": [{truck}, {truck}, {truck}]}}"#);
        let mut viewer = PackingViewer::default();
        viewer
            .load_simulation(SimulationSnapshot::from_json(&json).unwrap())
            .unwrap();
        viewer.next_truck();

        let mut renderer = TextRenderer::default();
        render_trucks(&mut viewer, &mut renderer);
        let output = renderer.output();
        assert!(output.contains("Truck 0 "));
        assert!(output.contains("Truck 1 "));
        assert!(output.contains("Truck 2 "));
        assert_eq!(output.matches("Truck ").count(), 3);
    }

    #[test]
    fn test_inspect_file_with_unplaced_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        std::fs::write(
            &path,
            r#"{
                "trucks": [{"dimensions": {"length": 600, "width": 200, "height": 200}}],
                "unplaced_items": [{"type": "cylinder", "diameter": 20, "height": 60, "position": [500, 0, 0]}]
            }"#,
        )
        .unwrap();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut session = runtime
            .block_on(open_session(&Config::default(), Some(&path), true))
            .unwrap();
        let viewer = session.viewer_mut();
        assert!(viewer.view_unplaced());

        let mut renderer = TextRenderer::default();
        viewer.render_frame(&mut renderer);
        let output = renderer.output();
        assert!(output.starts_with("Unplaced items (1 items"));
        assert!(output.contains("  cylinder 20.0 x 60.0 x 20.0 at (10.0, 30.0, 10.0)\n"));
        assert!(output.contains("    x: 0.0 to 20.0\n"));
    }
}
