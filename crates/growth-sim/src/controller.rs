//! Simulation controller: run state, step timer and renderer forwarding.

use crate::render::Renderer;
use growth_core::{Cell, DisplayConfig, Error, GridConfig, Result, RunState, SimulationConfig};
use growth_engine::GrowthGrid;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, instrument, trace};

/// A step scheduled to run after `delay`. Only the most recently armed
/// ticket is honoured; pausing disarms it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStep {
    pub ticket: u64,
    pub delay: Duration,
}

/// What a start or timer firing did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A step ran and activated this many cells
    Advanced { activated: usize },
    /// The grid was already filled; the controller paused instead of stepping
    Filled,
    /// Nothing ran: already running, not running, or a stale ticket
    Skipped,
}

pub struct SimulationController<R: Renderer> {
    grid: GrowthGrid,
    renderer: R,
    state: RunState,
    display: DisplayConfig,
    interval: Duration,
    pending: Option<PendingStep>,
    next_ticket: u64,
}

impl<R: Renderer> SimulationController<R> {
    /// Build a controller with an empty grid and paint it blank
    pub fn new(config: &SimulationConfig, renderer: R) -> Self {
        let grid_config = config.grid.clamped();
        let mut controller = Self {
            grid: GrowthGrid::new(grid_config.height, grid_config.width),
            renderer,
            state: RunState::Idle,
            display: config.display,
            interval: config.controller.interval(),
            pending: None,
            next_ticket: 0,
        };
        controller
            .renderer
            .on_grid_reset(controller.grid.height(), controller.grid.width());
        controller
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn grid(&self) -> &GrowthGrid {
        &self.grid
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn cell_size(&self) -> u32 {
        self.display.cell_size
    }

    /// The armed step, if any
    pub fn pending(&self) -> Option<PendingStep> {
        self.pending
    }

    pub fn into_parts(self) -> (GrowthGrid, R) {
        (self.grid, self.renderer)
    }

    /// Start running: step immediately, then arm the timer for the next one.
    /// No-op while already running.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> TickOutcome {
        if self.state.is_running() {
            debug!("Start ignored, already running");
            return TickOutcome::Skipped;
        }
        self.state = RunState::Running;
        info!(interval_ms = self.interval.as_millis() as u64, "Simulation started");
        self.run_step()
    }

    /// Stop running and disarm any pending step. Returns false if the
    /// controller was not running.
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        self.state = RunState::Paused;
        self.pending = None;
        let stats = self.grid.stats();
        info!(
            generation = stats.generation,
            alive = stats.alive,
            frontier = stats.frontier,
            "Simulation paused"
        );
        true
    }

    /// Run the step armed under `ticket`. Firings for a disarmed or
    /// superseded ticket are ignored.
    pub fn fire(&mut self, ticket: u64) -> TickOutcome {
        match self.pending {
            Some(pending) if pending.ticket == ticket && self.state.is_running() => {
                self.pending = None;
                self.run_step()
            }
            _ => {
                debug!(ticket, "Stale step ignored");
                TickOutcome::Skipped
            }
        }
    }

    /// Change the step interval. Pauses; the new interval applies from the
    /// next start.
    #[instrument(skip(self))]
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        self.pause();
    }

    /// Flip the cell at `(row, col)` and repaint it. Rejects coordinates
    /// outside the grid.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<bool> {
        if !self.grid.in_bounds(row, col) {
            return Err(Error::OutOfBounds {
                row,
                col,
                height: self.grid.height(),
                width: self.grid.width(),
            });
        }
        let alive = self.grid.toggle(row, col);
        self.renderer.on_cell_changed(Cell::new(row, col), alive);
        Ok(alive)
    }

    /// Grid cell under a pixel position on the canvas
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Cell> {
        self.display
            .cell_at(x, y, self.grid.height(), self.grid.width())
    }

    /// Pause, replace the grid with an empty one of the given dimensions
    /// (raised to the minimum) and paint it blank.
    #[instrument(skip(self))]
    pub fn reset(&mut self, height: usize, width: usize) {
        self.pause();
        let dims = GridConfig::new(height, width).clamped();
        self.grid.initialize(dims.height, dims.width);
        self.state = RunState::Idle;
        self.renderer.on_grid_reset(dims.height, dims.width);
    }

    /// Change the pixel size of a cell. The grid is reset at its current
    /// dimensions.
    #[instrument(skip(self))]
    pub fn set_cell_size(&mut self, cell_size: u32) -> Result<()> {
        if cell_size == 0 {
            return Err(Error::Validation("cell_size must be at least 1 pixel".to_string()));
        }
        self.display.cell_size = cell_size;
        let (height, width) = (self.grid.height(), self.grid.width());
        self.reset(height, width);
        Ok(())
    }

    /// Repaint everything after the drawing surface was lost or resized:
    /// a blank grid followed by every alive cell. Pauses first.
    #[instrument(skip(self))]
    pub fn redraw(&mut self) {
        self.pause();
        self.renderer
            .on_grid_reset(self.grid.height(), self.grid.width());
        for cell in self.grid.alive_cells() {
            self.renderer.on_cell_changed(cell, true);
        }
    }

    /// Randomly bring dead cells alive and paint them
    pub fn seed_random<G: Rng + ?Sized>(&mut self, rng: &mut G, density: f64) -> Result<usize> {
        let delta = self.grid.seed_random(rng, density)?;
        for cell in &delta {
            self.renderer.on_cell_changed(*cell, true);
        }
        Ok(delta.len())
    }

    fn run_step(&mut self) -> TickOutcome {
        if self.grid.is_filled() {
            self.pause();
            let stats = self.grid.stats();
            info!(
                event = "simulation_filled",
                generation = stats.generation,
                alive = stats.alive,
                coverage = format!("{:.1}%", stats.coverage() * 100.0),
                "Simulation filled"
            );
            return TickOutcome::Filled;
        }

        let delta = self.grid.step();
        for cell in &delta {
            self.renderer.on_cell_changed(*cell, true);
        }

        // The next step is armed only once this one has been painted
        if self.state.is_running() {
            self.next_ticket += 1;
            self.pending = Some(PendingStep {
                ticket: self.next_ticket,
                delay: self.interval,
            });
            trace!(ticket = self.next_ticket, "Next step armed");
        }

        TickOutcome::Advanced {
            activated: delta.len(),
        }
    }
}
