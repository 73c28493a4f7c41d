//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest allowed grid dimension, applied whenever the grid is (re)created
pub const MIN_DIMENSION: usize = 5;

/// A cell coordinate on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbor in `direction`, or `None` when it falls off a
    /// `height` x `width` grid. No wrapping at the edges.
    pub fn neighbor(&self, direction: Direction, height: usize, width: usize) -> Option<Cell> {
        let (dr, dc) = direction.to_delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < height && col < width).then_some(Cell { row, col })
    }

    /// In-bounds orthogonal neighbors in up, down, left, right order
    pub fn neighbors(&self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        let cell = *self;
        Direction::ORTHOGONAL
            .into_iter()
            .filter_map(move |direction| cell.neighbor(direction, height, width))
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Orthogonal growth direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Fixed expansion order. Only affects paint order, never the grid state.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row delta, col delta)
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Run state of a simulation controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// No step has run yet
    #[default]
    Idle,
    /// A step timer is armed
    Running,
    /// Timer cancelled, grid retained
    Paused,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
        };
        f.write_str(name)
    }
}
