//! Dense alive/dead storage for the grid.

use growth_core::Cell;
use serde::{Deserialize, Serialize};

/// A bounded 2D matrix of alive/dead cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMatrix {
    height: usize,
    width: usize,
    cells: Vec<bool>,
    alive: usize,
}

impl CellMatrix {
    /// All-dead matrix
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![false; height * width],
            alive: 0,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// Whether the cell is alive. Panics if out of bounds.
    pub fn get(&self, cell: Cell) -> bool {
        self.cells[self.index(cell)]
    }

    /// Set a cell's state and return the previous one. Panics if out of bounds.
    pub fn set(&mut self, cell: Cell, alive: bool) -> bool {
        let index = self.index(cell);
        let previous = std::mem::replace(&mut self.cells[index], alive);
        match (previous, alive) {
            (false, true) => self.alive += 1,
            (true, false) => self.alive -= 1,
            _ => {}
        }
        previous
    }

    /// Number of alive cells
    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, cell: Cell) -> usize {
        assert!(
            self.in_bounds(cell.row, cell.col),
            "cell {} outside {}x{} grid",
            cell,
            self.height,
            self.width
        );
        cell.row * self.width + cell.col
    }

    fn index_to_cell(&self, index: usize) -> Cell {
        Cell::new(index / self.width, index % self.width)
    }

    /// Alive cells in row-major order
    pub fn alive_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(move |(i, _)| self.index_to_cell(i))
    }

    /// Iterator over all cells with their state
    pub fn iter(&self) -> impl Iterator<Item = (Cell, bool)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, alive)| (self.index_to_cell(i), *alive))
    }
}
