use std::{fs, path::Path, time::Duration};

use bitflags::bitflags;
use serde::Deserialize;
use thiserror::Error;

use crate::renderer::Rgb565;

bitflags! {
    /// Which passes `render_frame` runs for each band.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RenderPasses: u8 {
        const WALLS    = 0x01;
        const SPRITES  = 0x02;
        const OVERLAYS = 0x04;
    }
}

impl Default for RenderPasses {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bad config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine settings, loadable from TOML.  Every key is optional.
///
/// ```toml
/// sky_color = 0x001F
/// floor_color = 0x4208
/// floor_gradient = 0.6
/// transfer_timeout_ms = 100
///
/// [fps]
/// x = 2
/// y = 2
/// color = 0xFFE0
///
/// [passes]
/// sprites = false
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_sky_color")]
    pub sky_color: Rgb565,
    #[serde(default = "default_floor_color")]
    pub floor_color: Rgb565,
    /// 0 = flat floor, 1 = floor fades to black at the horizon.
    #[serde(default = "default_floor_gradient")]
    pub floor_gradient: f32,
    /// How long to wait for a band transfer before writing it off.
    #[serde(default = "default_transfer_timeout_ms")]
    pub transfer_timeout_ms: u64,
    /// Frame-rate readout position and colour; absent = hidden.
    #[serde(default)]
    pub fps: Option<FpsOverlayConfig>,
    #[serde(default)]
    pub passes: PassesConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct FpsOverlayConfig {
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_fps_color")]
    pub color: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct PassesConfig {
    #[serde(default = "enabled")]
    pub walls: bool,
    #[serde(default = "enabled")]
    pub sprites: bool,
    #[serde(default = "enabled")]
    pub overlays: bool,
}

// Default values
fn default_sky_color() -> Rgb565 { 0x0000 }
fn default_floor_color() -> Rgb565 { 0x4208 }
fn default_floor_gradient() -> f32 { 0.5 }
fn default_transfer_timeout_ms() -> u64 { 100 }
fn default_fps_color() -> Rgb565 { 0xFFFF }
fn enabled() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sky_color: default_sky_color(),
            floor_color: default_floor_color(),
            floor_gradient: default_floor_gradient(),
            transfer_timeout_ms: default_transfer_timeout_ms(),
            fps: None,
            passes: PassesConfig::default(),
        }
    }
}

impl Default for PassesConfig {
    fn default() -> Self {
        Self {
            walls: enabled(),
            sprites: enabled(),
            overlays: enabled(),
        }
    }
}

impl From<PassesConfig> for RenderPasses {
    fn from(p: PassesConfig) -> Self {
        let mut passes = RenderPasses::empty();
        passes.set(RenderPasses::WALLS, p.walls);
        passes.set(RenderPasses::SPRITES, p.sprites);
        passes.set(RenderPasses::OVERLAYS, p.overlays);
        passes
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn render_passes(&self) -> RenderPasses {
        self.passes.into()
    }
}
