//! Configuration types for the simulation.

use crate::{Cell, Error, Result, MIN_DIMENSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Grid configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of rows
    pub height: usize,
    /// Number of columns
    pub width: usize,
}

impl GridConfig {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Copy with both dimensions raised to at least [`MIN_DIMENSION`]
    pub fn clamped(&self) -> Self {
        let clamped = Self {
            height: self.height.max(MIN_DIMENSION),
            width: self.width.max(MIN_DIMENSION),
        };
        if clamped != *self {
            warn!(
                requested_height = self.height,
                requested_width = self.width,
                height = clamped.height,
                width = clamped.width,
                "Grid dimensions raised to minimum"
            );
        }
        clamped
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            height: 30,
            width: 30,
        }
    }
}

/// Pixel geometry of the rendered grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Edge length of one cell in pixels
    pub cell_size: u32,
}

impl DisplayConfig {
    /// Canvas size (width, height) in pixels for a grid of the given dimensions
    pub fn canvas_size(&self, height: usize, width: usize) -> (u64, u64) {
        let size = self.cell_size as u64;
        (width as u64 * size, height as u64 * size)
    }

    /// Map a pixel position relative to the canvas origin onto a grid cell.
    /// Returns `None` for positions outside the grid.
    pub fn cell_at(&self, x: f64, y: f64, height: usize, width: usize) -> Option<Cell> {
        if self.cell_size == 0 || !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let size = self.cell_size as f64;
        let col = (x / size).floor() as usize;
        let row = (y / size).floor() as usize;
        (row < height && col < width).then_some(Cell::new(row, col))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { cell_size: 10 }
    }
}

/// Step timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Delay between steps (milliseconds)
    pub interval_ms: u64,
}

impl ControllerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid: GridConfig,
    pub display: DisplayConfig,
    pub controller: ControllerConfig,
}

impl SimulationConfig {
    /// Parse a JSON document; missing sections fall back to defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.cell_size == 0 {
            return Err(Error::Validation("cell_size must be at least 1 pixel".to_string()));
        }
        if self.controller.interval_ms == 0 {
            return Err(Error::Validation("interval_ms must be positive".to_string()));
        }
        Ok(())
    }
}
