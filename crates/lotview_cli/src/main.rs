//! Lotview - headless playback of parking-lot simulation runs
//!
//! Loads a run document (grid, timesteps, meta), drives playback at a fixed
//! simulated frame rate through the selected renderer and optionally writes
//! a JSON report of where playback ended.

mod config;
mod headless;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::LotviewConfig;
use headless::{HeadlessRunConfig, HeadlessRuntime};
use lotview_core::{LoadError, SimulationRun};
use lotview_playback::PlaybackSession;
use lotview_render::{CanvasRenderer, Renderer, RendererAdapter, SceneRenderer};
use report::PlaybackReport;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RendererKind {
    /// Immediate-mode 2D canvas
    Canvas,
    /// Retained-mode 3D scene
    Scene,
}

/// Play back a pre-computed parking-lot simulation run
#[derive(Parser, Debug)]
#[command(name = "lotview")]
#[command(about = "Play back a pre-computed parking-lot simulation run")]
#[command(version)]
struct Args {
    /// Run document (JSON with grid, timesteps and meta)
    #[arg(short, long, required_unless_present = "dump_config")]
    input: Option<PathBuf>,

    /// Config file (defaults to ./lotview.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Renderer to drive
    #[arg(short, long, value_enum, default_value_t = RendererKind::Canvas)]
    renderer: RendererKind,

    /// Simulated frame rate (overrides config)
    #[arg(long)]
    fps: Option<u32>,

    /// Frame budget (overrides config)
    #[arg(long)]
    max_frames: Option<u32>,

    /// Playback speed multiplier (overrides config)
    #[arg(long)]
    speed: Option<f32>,

    /// Snapshot index to start from
    #[arg(long)]
    seek: Option<i64>,

    /// Write a JSON report to this relative path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Read and decode a run document. Nothing playback-related exists until this succeeds.
async fn load_run(path: &Path) -> Result<SimulationRun, LoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::Source(format!("{}: {e}", path.display())))?;
    SimulationRun::from_json(&content)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = LotviewConfig::load(args.config.as_deref())?;
    if let Some(fps) = args.fps {
        config.playback.fps = fps;
    }
    if let Some(max_frames) = args.max_frames {
        config.playback.max_frames = max_frames;
    }
    if let Some(speed) = args.speed {
        config.playback.speed = speed;
    }
    config.validate().context("Invalid playback settings")?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let input = args.input.as_deref().context("--input is required")?;
    tracing::info!(input = %input.display(), "loading run");
    let run = load_run(input)
        .await
        .with_context(|| format!("Failed to load run from {}", input.display()))?;
    let mut session = PlaybackSession::from_run(run).context("Cannot play this run")?;

    {
        let mut controller = session.controller();
        controller.set_speed(config.playback.speed);
        if let Some(target) = args.seek {
            controller.seek(target);
        }
        if config.playback.autoplay {
            controller.play();
        }
    }

    let renderer: Renderer = match args.renderer {
        RendererKind::Canvas => CanvasRenderer::new(config.canvas_config()).into(),
        RendererKind::Scene => SceneRenderer::new(config.scene_config()).into(),
    };
    let renderer_name = renderer.name();

    let cfg = HeadlessRunConfig {
        fps: config.playback.fps,
        max_frames: config.playback.max_frames,
    };
    let outcome = HeadlessRuntime::run(cfg, session, renderer)?;

    let report = PlaybackReport::from_outcome(renderer_name, &outcome);
    match &args.report {
        Some(path) => {
            report
                .write_to_path(path)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => report.write_to_writer(&mut std::io::stdout().lock())?,
    }

    Ok(())
}
