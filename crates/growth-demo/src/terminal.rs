//! Text renderer that keeps an in-memory frame updated cell by cell.

use growth_core::Cell;
use growth_sim::Renderer;
use parking_lot::Mutex;
use std::sync::Arc;

const ALIVE: char = '#';
const DEAD: char = '.';

#[derive(Debug, Default)]
struct Frame {
    height: usize,
    width: usize,
    cells: Vec<bool>,
    painted: u64,
}

/// Renderer for the demo. Clones share one frame, so the print loop can read
/// what the simulation task paints.
#[derive(Debug, Clone, Default)]
pub struct TerminalRenderer {
    frame: Arc<Mutex<Frame>>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frame as text, one line per grid row
    pub fn render(&self) -> String {
        let frame = self.frame.lock();
        let mut out = String::with_capacity(frame.height * (frame.width + 1));
        for row in frame.cells.chunks(frame.width.max(1)) {
            out.extend(row.iter().map(|alive| if *alive { ALIVE } else { DEAD }));
            out.push('\n');
        }
        out
    }

    /// Number of single-cell paints since the last grid reset
    pub fn painted(&self) -> u64 {
        self.frame.lock().painted
    }
}

impl Renderer for TerminalRenderer {
    fn on_cell_changed(&mut self, cell: Cell, alive: bool) {
        let mut frame = self.frame.lock();
        if cell.row < frame.height && cell.col < frame.width {
            let index = cell.row * frame.width + cell.col;
            frame.cells[index] = alive;
            frame.painted += 1;
        }
    }

    fn on_grid_reset(&mut self, height: usize, width: usize) {
        let mut frame = self.frame.lock();
        frame.height = height;
        frame.width = width;
        frame.cells = vec![false; height * width];
        frame.painted = 0;
    }
}
