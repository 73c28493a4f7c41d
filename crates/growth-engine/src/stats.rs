//! Growth statistics snapshots.

use serde::{Deserialize, Serialize};

/// Point-in-time metrics for a growth grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthStats {
    /// Steps completed since the grid was initialized
    pub generation: u64,
    /// Alive cells
    pub alive: usize,
    /// Cells that can still spread
    pub frontier: usize,
    /// Total cells in the grid
    pub total: usize,
}

impl GrowthStats {
    pub fn new(generation: u64, alive: usize, frontier: usize, total: usize) -> Self {
        Self {
            generation,
            alive,
            frontier,
            total,
        }
    }

    /// Fraction of the grid that is alive (0.0 to 1.0)
    pub fn coverage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.alive as f64 / self.total as f64
        }
    }

    /// True once no cell can spread any further
    pub fn is_stalled(&self) -> bool {
        self.frontier == 0
    }
}
