//! Growth propagation engine.
//!
//! This module implements the alive/dead cell grid and the frontier of cells
//! that still have room to spread, so each step only touches cells near the
//! edge of the growth region instead of rescanning the whole grid.

pub mod grid;
pub mod growth;
pub mod stats;

pub use grid::CellMatrix;
pub use growth::GrowthGrid;
pub use stats::GrowthStats;
