//! Loader settings.

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// What to do when a referenced tileset cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTileSets {
    /// Log a warning and leave the reference unbound; its tiles draw and collide as nothing.
    #[default]
    Skip,
    /// Fail the whole load with [`MapError::TileSetUnavailable`].
    Abort,
}

/// Settings for [`crate::TileMap::load`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Host simulation ticks per second.
    pub ticks_per_second: u32,
    /// The shared tick counter wraps every `ticks_per_second * wrap_seconds` ticks.
    pub wrap_seconds: u32,
    /// Initial zoom applied to pixel dimensions and draw commands.
    pub zoom: f32,
    /// Policy for tileset documents that cannot be fetched.
    pub missing_tilesets: MissingTileSets,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
            wrap_seconds: 10,
            zoom: 1.0,
            missing_tilesets: MissingTileSets::Skip,
        }
    }
}

impl LoaderConfig {
    /// Parse a JSON config; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let config: LoaderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the loader cannot run with.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.ticks_per_second == 0 {
            return Err(MapError::Config("ticks_per_second must be positive".into()));
        }
        if self.wrap_seconds == 0 {
            return Err(MapError::Config("wrap_seconds must be positive".into()));
        }
        if self.ticks_per_second.checked_mul(self.wrap_seconds).is_none() {
            return Err(MapError::Config("tick wrap modulus overflows u32".into()));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(MapError::Config(format!("zoom must be positive, got {}", self.zoom)));
        }
        Ok(())
    }
}
