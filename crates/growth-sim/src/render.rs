//! Renderer callbacks.

use growth_core::Cell;
use parking_lot::Mutex;
use std::sync::Arc;

/// Paint target driven by the controller. Implementations repaint only what
/// each call names, never the whole surface, except on grid reset.
pub trait Renderer {
    /// Paint a single cell and its border
    fn on_cell_changed(&mut self, cell: Cell, alive: bool);

    /// Paint a blank grid of the given dimensions
    fn on_grid_reset(&mut self, height: usize, width: usize);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn on_cell_changed(&mut self, cell: Cell, alive: bool) {
        (**self).on_cell_changed(cell, alive)
    }

    fn on_grid_reset(&mut self, height: usize, width: usize) {
        (**self).on_grid_reset(height, width)
    }
}

/// A single renderer callback invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    CellChanged { cell: Cell, alive: bool },
    GridReset { height: usize, width: usize },
}

/// Renderer that records every callback. Clones share the same log, so a
/// caller can keep one while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().clone()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<RenderEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Cells painted alive, in paint order
    pub fn painted_alive(&self) -> Vec<Cell> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                RenderEvent::CellChanged { cell, alive: true } => Some(*cell),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn on_cell_changed(&mut self, cell: Cell, alive: bool) {
        self.events.lock().push(RenderEvent::CellChanged { cell, alive });
    }

    fn on_grid_reset(&mut self, height: usize, width: usize) {
        self.events.lock().push(RenderEvent::GridReset { height, width });
    }
}
