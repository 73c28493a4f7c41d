//! Frontier-driven growth grid.

use crate::grid::CellMatrix;
use crate::stats::GrowthStats;
use growth_core::{Cell, Error, Result, MIN_DIMENSION};
use rand::Rng;
use std::collections::BTreeSet;
use tracing::{debug, info, trace};

/// Alive/dead grid plus the frontier of alive cells that may still spread.
///
/// Every frontier member is alive. A cell enters the frontier when it comes
/// alive (by toggle, seeding or growth) or when an orthogonal neighbor is
/// toggled dead, and leaves it after the step that expands it or when it is
/// toggled dead itself.
#[derive(Debug, Clone)]
pub struct GrowthGrid {
    cells: CellMatrix,
    frontier: BTreeSet<Cell>,
    generation: u64,
}

impl GrowthGrid {
    /// All-dead grid; dimensions below the minimum are raised to it
    pub fn new(height: usize, width: usize) -> Self {
        let mut grid = Self {
            cells: CellMatrix::new(0, 0),
            frontier: BTreeSet::new(),
            generation: 0,
        };
        grid.initialize(height, width);
        grid
    }

    /// Replace the grid with an all-dead one and clear the frontier
    pub fn initialize(&mut self, height: usize, width: usize) {
        let height = height.max(MIN_DIMENSION);
        let width = width.max(MIN_DIMENSION);
        self.cells = CellMatrix::new(height, width);
        self.frontier.clear();
        self.generation = 0;
        info!(height, width, "Grid initialized");
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        self.cells.in_bounds(row, col)
    }

    pub fn is_alive(&self, cell: Cell) -> bool {
        self.cells.get(cell)
    }

    /// Number of completed steps since the last initialize
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alive_count(&self) -> usize {
        self.cells.alive_count()
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn frontier(&self) -> impl Iterator<Item = Cell> + '_ {
        self.frontier.iter().copied()
    }

    pub fn in_frontier(&self, cell: Cell) -> bool {
        self.frontier.contains(&cell)
    }

    /// Alive cells in row-major order, for full repaints
    pub fn alive_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.alive_cells()
    }

    /// Flip one cell and return its new state.
    ///
    /// Panics if `(row, col)` is outside the grid: callers bounds-check first.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        assert!(
            self.in_bounds(row, col),
            "toggle at ({}, {}) outside {}x{} grid",
            row,
            col,
            self.height(),
            self.width()
        );

        let cell = Cell::new(row, col);
        let alive = !self.cells.get(cell);
        self.cells.set(cell, alive);

        if alive {
            self.frontier.insert(cell);
        } else {
            self.frontier.remove(&cell);
            // Alive neighbors get another chance to grow into the freed cell
            for neighbor in cell.neighbors(self.height(), self.width()) {
                if self.cells.get(neighbor) {
                    self.frontier.insert(neighbor);
                }
            }
        }

        trace!(%cell, alive, frontier = self.frontier.len(), "Cell toggled");
        alive
    }

    /// Advance one generation and return the newly alive cells in paint order.
    ///
    /// Only cells in the frontier at the start of the call expand; cells
    /// activated during the call form the next frontier. The resulting grid
    /// and frontier do not depend on the order the frontier is visited in.
    pub fn step(&mut self) -> Vec<Cell> {
        let snapshot = std::mem::take(&mut self.frontier);
        self.expand(snapshot)
    }

    /// Like [`step`](Self::step), but visits the frontier in `order`, which
    /// must be a permutation of the current frontier.
    pub fn step_from(&mut self, order: &[Cell]) -> Result<Vec<Cell>> {
        let requested: BTreeSet<Cell> = order.iter().copied().collect();
        if requested.len() != order.len() || requested != self.frontier {
            return Err(Error::Validation(format!(
                "step order of {} cells is not a permutation of the {}-cell frontier",
                order.len(),
                self.frontier.len()
            )));
        }
        self.frontier.clear();
        Ok(self.expand(order.iter().copied()))
    }

    fn expand(&mut self, sources: impl IntoIterator<Item = Cell>) -> Vec<Cell> {
        let (height, width) = (self.height(), self.width());
        let mut next_frontier = BTreeSet::new();
        let mut delta = Vec::new();
        let mut expanded = 0usize;

        for cell in sources {
            expanded += 1;
            if !self.cells.set(cell, true) {
                delta.push(cell);
            }

            for neighbor in cell.neighbors(height, width) {
                if !self.cells.set(neighbor, true) {
                    delta.push(neighbor);
                    next_frontier.insert(neighbor);
                }
            }
        }

        self.frontier = next_frontier;
        self.generation += 1;

        debug!(
            generation = self.generation,
            expanded,
            activated = delta.len(),
            frontier = self.frontier.len(),
            "Step complete"
        );

        delta
    }

    /// Cheap fill heuristic: true when all four corners and the center cell
    /// are alive. It samples five cells only, so a grid seeded at exactly
    /// those points reports filled while the rest is still dead.
    pub fn is_filled(&self) -> bool {
        let (height, width) = (self.height(), self.width());
        [
            Cell::new(0, 0),
            Cell::new(0, width - 1),
            Cell::new(height - 1, 0),
            Cell::new(height - 1, width - 1),
            Cell::new(height / 2, width / 2),
        ]
        .into_iter()
        .all(|cell| self.cells.get(cell))
    }

    /// Bring each dead cell alive with probability `density`. New cells join
    /// the frontier. Returns the activated cells in row-major order.
    pub fn seed_random<R: Rng + ?Sized>(&mut self, rng: &mut R, density: f64) -> Result<Vec<Cell>> {
        if !(0.0..=1.0).contains(&density) {
            return Err(Error::Validation(format!(
                "seed density {} outside [0, 1]",
                density
            )));
        }

        let dead: Vec<Cell> = self
            .cells
            .iter()
            .filter(|(_, alive)| !alive)
            .map(|(cell, _)| cell)
            .collect();

        let mut delta = Vec::new();
        for cell in dead {
            if rng.gen_bool(density) {
                self.cells.set(cell, true);
                self.frontier.insert(cell);
                delta.push(cell);
            }
        }

        debug!(density, seeded = delta.len(), "Grid seeded");
        Ok(delta)
    }

    pub fn stats(&self) -> GrowthStats {
        GrowthStats::new(
            self.generation,
            self.alive_count(),
            self.frontier_len(),
            self.cells.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    fn frontier_of(grid: &GrowthGrid) -> Vec<Cell> {
        grid.frontier().collect()
    }

    fn snapshot(grid: &GrowthGrid) -> (Vec<Cell>, Vec<Cell>) {
        (grid.alive_cells().collect(), frontier_of(grid))
    }

    #[test]
    fn test_initialize_clamps_dimensions() {
        let grid = GrowthGrid::new(2, 3);
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.alive_count(), 0);
        assert_eq!(grid.frontier_len(), 0);
    }

    #[test]
    fn test_toggle_on_adds_to_frontier() {
        let mut grid = GrowthGrid::new(5, 5);
        assert!(grid.toggle(2, 2));
        assert!(grid.is_alive(Cell::new(2, 2)));
        assert_eq!(frontier_of(&grid), cells(&[(2, 2)]));
    }

    #[test]
    fn test_toggle_off_reactivates_alive_neighbors() {
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(2, 2);
        grid.step();
        grid.step();
        // (1, 2) expanded in the first step and left the frontier
        assert!(!grid.in_frontier(Cell::new(1, 2)));

        assert!(!grid.toggle(2, 2));
        assert!(!grid.in_frontier(Cell::new(2, 2)));
        for neighbor in cells(&[(1, 2), (3, 2), (2, 1), (2, 3)]) {
            assert!(grid.in_frontier(neighbor), "{} should be back in the frontier", neighbor);
        }
    }

    #[test]
    fn test_toggle_off_ignores_dead_neighbors() {
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(0, 0);
        grid.toggle(0, 0);
        assert_eq!(grid.frontier_len(), 0);
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    #[should_panic(expected = "outside 5x5 grid")]
    fn test_toggle_out_of_bounds_panics() {
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(0, 5);
    }

    #[test]
    fn test_center_seed_scenario() {
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(2, 2);
        assert_eq!(frontier_of(&grid), cells(&[(2, 2)]));

        let delta = grid.step();
        assert_eq!(delta, cells(&[(1, 2), (3, 2), (2, 1), (2, 3)]));
        let mut expected_frontier = delta.clone();
        expected_frontier.sort();
        assert_eq!(frontier_of(&grid), expected_frontier);

        let delta = grid.step();
        assert_eq!(delta.len(), 8);
        let mut sorted = delta.clone();
        sorted.sort();
        assert_eq!(
            sorted,
            cells(&[(0, 2), (1, 1), (1, 3), (2, 0), (2, 4), (3, 1), (3, 3), (4, 2)])
        );
        assert_eq!(grid.alive_count(), 13);
        for corner in cells(&[(0, 0), (0, 4), (4, 0), (4, 4)]) {
            assert!(!grid.is_alive(corner));
        }
        assert!(!grid.is_filled());
        assert_eq!(grid.generation(), 2);
    }

    #[test]
    fn test_growth_fills_grid_and_frontier_drains() {
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(2, 2);
        let mut steps = 0;
        while !grid.is_filled() {
            grid.step();
            steps += 1;
            assert!(steps <= 4, "center seed must reach corners within 4 steps");
        }
        assert_eq!(steps, 4);
        assert_eq!(grid.alive_count(), 25);

        // Last generation had nothing left to activate
        let delta = grid.step();
        assert!(delta.is_empty());
        assert_eq!(grid.frontier_len(), 0);
    }

    #[test]
    fn test_step_on_empty_frontier_is_noop() {
        let mut grid = GrowthGrid::new(6, 6);
        assert!(grid.step().is_empty());
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn test_is_filled_is_sentinel_check() {
        let mut grid = GrowthGrid::new(9, 7);
        for (row, col) in [(0, 0), (0, 6), (8, 0), (8, 6), (4, 3)] {
            grid.toggle(row, col);
        }
        assert!(grid.is_filled());
        assert_eq!(grid.alive_count(), 5);
    }

    #[test]
    fn test_is_filled_needs_center() {
        let mut grid = GrowthGrid::new(6, 6);
        for (row, col) in [(0, 0), (0, 5), (5, 0), (5, 5)] {
            grid.toggle(row, col);
        }
        assert!(!grid.is_filled());
        grid.toggle(3, 3);
        assert!(grid.is_filled());
    }

    #[test]
    fn test_initialize_clears_state() {
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(1, 1);
        grid.toggle(3, 4);
        grid.step();

        grid.initialize(10, 10);
        assert_eq!(grid.height(), 10);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.alive_count(), 0);
        assert_eq!(grid.frontier_len(), 0);
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn test_step_from_rejects_non_permutation() {
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(1, 1);
        grid.toggle(3, 3);

        let missing = grid.step_from(&cells(&[(1, 1)]));
        assert!(matches!(missing, Err(Error::Validation(_))));

        let duplicated = grid.step_from(&cells(&[(1, 1), (1, 1), (3, 3)]));
        assert!(matches!(duplicated, Err(Error::Validation(_))));

        // Rejected orders leave the frontier untouched
        assert_eq!(grid.frontier_len(), 2);
        assert!(grid.step_from(&cells(&[(3, 3), (1, 1)])).is_ok());
    }

    #[test]
    fn test_shuffled_frontier_order_gives_same_result() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut base = GrowthGrid::new(12, 9);
        base.seed_random(&mut rng, 0.15).unwrap();
        base.step();

        let mut expected = base.clone();
        expected.step();

        for _ in 0..20 {
            let mut grid = base.clone();
            let mut order = frontier_of(&grid);
            order.shuffle(&mut rng);
            let delta = grid.step_from(&order).unwrap();

            assert_eq!(snapshot(&grid), snapshot(&expected));
            let mut sorted = delta;
            sorted.sort();
            let mut expected_delta: Vec<Cell> = expected
                .alive_cells()
                .filter(|cell| !base.is_alive(*cell))
                .collect();
            expected_delta.sort();
            assert_eq!(sorted, expected_delta);
        }
    }

    #[test]
    fn test_seed_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut grid = GrowthGrid::new(20, 20);
        let delta = grid.seed_random(&mut rng, 0.2).unwrap();

        assert!(!delta.is_empty());
        assert_eq!(delta.len(), grid.alive_count());
        assert_eq!(grid.frontier_len(), grid.alive_count());
        assert!(delta.windows(2).all(|pair| pair[0] < pair[1]));

        assert!(matches!(grid.seed_random(&mut rng, 1.5), Err(Error::Validation(_))));
    }

    #[test]
    fn test_seed_full_density() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = GrowthGrid::new(5, 5);
        grid.toggle(0, 0);
        let delta = grid.seed_random(&mut rng, 1.0).unwrap();
        assert_eq!(delta.len(), 24);
        assert!(grid.is_filled());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Toggle(usize, usize),
        Step,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0usize..8, 0usize..8).prop_map(|(row, col)| Op::Toggle(row, col)),
            1 => Just(Op::Step),
        ]
    }

    fn apply(grid: &mut GrowthGrid, ops: &[Op]) {
        for op in ops {
            match op {
                Op::Toggle(row, col) => {
                    grid.toggle(*row, *col);
                }
                Op::Step => {
                    grid.step();
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_frontier_is_alive(ops in prop::collection::vec(op_strategy(), 0..60)) {
            let mut grid = GrowthGrid::new(8, 8);
            apply(&mut grid, &ops);
            for cell in grid.frontier() {
                prop_assert!(grid.is_alive(cell));
            }
        }

        #[test]
        fn prop_toggle_twice_restores_cell(
            ops in prop::collection::vec(op_strategy(), 0..40),
            row in 0usize..8,
            col in 0usize..8,
        ) {
            let mut grid = GrowthGrid::new(8, 8);
            apply(&mut grid, &ops);
            let cell = Cell::new(row, col);
            let alive_before = grid.is_alive(cell);
            let in_frontier_before = grid.in_frontier(cell);

            grid.toggle(row, col);
            grid.toggle(row, col);

            prop_assert_eq!(grid.is_alive(cell), alive_before);
            if alive_before {
                // Coming back alive always re-enters the frontier
                prop_assert!(grid.in_frontier(cell));
            } else {
                prop_assert!(!in_frontier_before);
                prop_assert!(!grid.in_frontier(cell));
            }
        }

        #[test]
        fn prop_step_never_kills_and_delta_is_complete(
            ops in prop::collection::vec(op_strategy(), 0..60),
        ) {
            let mut grid = GrowthGrid::new(8, 8);
            apply(&mut grid, &ops);
            let before = grid.clone();

            let delta = grid.step();

            for cell in before.alive_cells() {
                prop_assert!(grid.is_alive(cell));
            }
            let unique: BTreeSet<Cell> = delta.iter().copied().collect();
            prop_assert_eq!(unique.len(), delta.len());
            for cell in &delta {
                prop_assert!(!before.is_alive(*cell));
                prop_assert!(grid.is_alive(*cell));
            }
            let activated: BTreeSet<Cell> = grid
                .alive_cells()
                .filter(|cell| !before.is_alive(*cell))
                .collect();
            prop_assert_eq!(activated, unique);
            prop_assert_eq!(grid.alive_count(), before.alive_count() + delta.len());
        }

        #[test]
        fn prop_step_order_independent(
            ops in prop::collection::vec(op_strategy(), 0..60),
            seed in any::<u64>(),
        ) {
            let mut grid = GrowthGrid::new(8, 8);
            apply(&mut grid, &ops);

            let mut expected = grid.clone();
            expected.step();

            let mut order = frontier_of(&grid);
            order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
            grid.step_from(&order).unwrap();

            prop_assert_eq!(snapshot(&grid), snapshot(&expected));
        }
    }
}
