//! Lotview configuration file handling

use anyhow::{Context, Result};
use lotview_render::{CanvasConfig, SceneConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "lotview.toml";

/// Values that parse but cannot drive a run
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("playback.fps must be > 0")]
    ZeroFps,
    #[error("playback.max_frames must be > 0")]
    ZeroFrames,
    #[error("playback.speed must be a positive number, got {0}")]
    InvalidSpeed(f32),
    #[error("{section}.{field} must be a positive number, got {value}")]
    NonPositive {
        section: &'static str,
        field: &'static str,
        value: f32,
    },
}

/// Top-level configuration (lotview.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LotviewConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub canvas: CanvasSection,
    #[serde(default)]
    pub scene: SceneSection,
}

/// Frame loop settings
#[derive(Debug, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Simulated host frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Frame budget for a headless run
    #[serde(default = "default_max_frames")]
    pub max_frames: u32,
    /// Start playing immediately after load
    #[serde(default = "default_true")]
    pub autoplay: bool,
    /// Playback speed multiplier
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_fps() -> u32 {
    60
}

fn default_max_frames() -> u32 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_speed() -> f32 {
    1.0
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            max_frames: default_max_frames(),
            autoplay: true,
            speed: default_speed(),
        }
    }
}

/// 2D canvas layout
#[derive(Debug, Deserialize, Serialize)]
pub struct CanvasSection {
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    #[serde(default = "default_margin")]
    pub margin: f32,
}

fn default_cell_size() -> f32 {
    32.0
}

fn default_margin() -> f32 {
    10.0
}

impl Default for CanvasSection {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            margin: default_margin(),
        }
    }
}

/// 3D scene dimensions
#[derive(Debug, Deserialize, Serialize)]
pub struct SceneSection {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default = "default_car_height")]
    pub car_height: f32,
}

fn default_tile_size() -> f32 {
    0.96
}

fn default_car_height() -> f32 {
    0.35
}

impl Default for SceneSection {
    fn default() -> Self {
        Self {
            tile_size: default_tile_size(),
            car_height: default_car_height(),
        }
    }
}

impl LotviewConfig {
    /// Load an explicit config file, or `lotview.toml` from the working
    /// directory when present, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file {} does not exist", path.display());
                }
                Self::load_file(path)?
            }
            None if Path::new(CONFIG_FILE).is_file() => Self::load_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: LotviewConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or break playback
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.playback.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if self.playback.max_frames == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        if !(self.playback.speed > 0.0) {
            return Err(ConfigError::InvalidSpeed(self.playback.speed));
        }
        let sizes = [
            ("canvas", "cell_size", self.canvas.cell_size),
            ("scene", "tile_size", self.scene.tile_size),
            ("scene", "car_height", self.scene.car_height),
        ];
        for (section, field, value) in sizes {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive {
                    section,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn canvas_config(&self) -> CanvasConfig {
        CanvasConfig {
            cell_size: self.canvas.cell_size,
            margin: self.canvas.margin.max(0.0),
        }
    }

    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            tile_size: self.scene.tile_size,
            car_height: self.scene.car_height,
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
