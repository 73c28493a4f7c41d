//! Async driver that owns a controller on a single task.
//!
//! UI glue talks to the task through a [`SimulationHandle`]. Commands and
//! timer firings are handled one at a time on the task, so a toggle can never
//! land in the middle of a step.

use crate::controller::{SimulationController, TickOutcome};
use crate::render::Renderer;
use growth_core::{Error, Result, RunState};
use growth_engine::GrowthStats;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Snapshot of the simulation published after every command and step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Status {
    pub state: RunState,
    pub height: usize,
    pub width: usize,
    pub interval_ms: u64,
    pub cell_size: u32,
    pub stats: GrowthStats,
}

impl Status {
    fn capture<R: Renderer>(controller: &SimulationController<R>) -> Self {
        let grid = controller.grid();
        Self {
            state: controller.state(),
            height: grid.height(),
            width: grid.width(),
            interval_ms: controller.interval().as_millis() as u64,
            cell_size: controller.cell_size(),
            stats: grid.stats(),
        }
    }
}

enum Command {
    Start,
    Pause,
    SetInterval(Duration),
    Toggle {
        row: usize,
        col: usize,
        reply: oneshot::Sender<Result<bool>>,
    },
    Reset {
        height: usize,
        width: usize,
    },
    SetCellSize {
        cell_size: u32,
        reply: oneshot::Sender<Result<()>>,
    },
    Redraw,
    Snapshot(oneshot::Sender<Status>),
    Shutdown,
}

/// Handle to a running simulation task
pub struct SimulationHandle<R: Renderer> {
    commands: mpsc::UnboundedSender<Command>,
    status: Arc<RwLock<Status>>,
    cancel: CancellationToken,
    task: JoinHandle<SimulationController<R>>,
}

/// Move `controller` onto its own task and return a handle to it
pub fn spawn<R>(controller: SimulationController<R>) -> SimulationHandle<R>
where
    R: Renderer + Send + 'static,
{
    let (commands, receiver) = mpsc::unbounded_channel();
    let status = Arc::new(RwLock::new(Status::capture(&controller)));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(drive(controller, receiver, status.clone(), cancel.clone()));

    SimulationHandle {
        commands,
        status,
        cancel,
        task,
    }
}

impl<R: Renderer> SimulationHandle<R> {
    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    /// Change the step interval; pauses the simulation
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        self.send(Command::SetInterval(interval))
    }

    /// Flip a cell and return its new state
    pub async fn toggle(&self, row: usize, col: usize) -> Result<bool> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Toggle { row, col, reply })?;
        response.await.map_err(|_| stopped())?
    }

    pub fn reset(&self, height: usize, width: usize) -> Result<()> {
        self.send(Command::Reset { height, width })
    }

    pub async fn set_cell_size(&self, cell_size: u32) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::SetCellSize { cell_size, reply })?;
        response.await.map_err(|_| stopped())?
    }

    /// Repaint the whole grid; pauses the simulation
    pub fn redraw(&self) -> Result<()> {
        self.send(Command::Redraw)
    }

    /// Latest published status, without waiting on the task
    pub fn status(&self) -> Status {
        *self.status.read()
    }

    /// Status after every previously sent command has been applied
    pub async fn snapshot(&self) -> Result<Status> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        response.await.map_err(|_| stopped())
    }

    /// Token that stops the task when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the task after it drains earlier commands and hand back the
    /// paused controller
    pub async fn shutdown(self) -> Result<SimulationController<R>> {
        // The task may already be gone after a cancellation
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| Error::InvalidState(format!("simulation task failed: {}", e)))
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| stopped())
    }
}

fn stopped() -> Error {
    Error::InvalidState("simulation task has stopped".to_string())
}

async fn drive<R: Renderer>(
    mut controller: SimulationController<R>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    status: Arc<RwLock<Status>>,
    cancel: CancellationToken,
) -> SimulationController<R> {
    info!("Simulation task started");
    // (ticket, deadline) of the step the timer is armed for
    let mut armed: Option<(u64, Instant)> = None;

    loop {
        armed = match (controller.pending(), armed) {
            (Some(pending), Some((ticket, deadline))) if pending.ticket == ticket => {
                Some((ticket, deadline))
            }
            (Some(pending), _) => Some((pending.ticket, Instant::now() + pending.delay)),
            (None, _) => None,
        };
        let deadline = armed.map(|(_, deadline)| deadline);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Simulation task cancelled");
                break;
            }
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut controller, command),
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some((ticket, _)) = armed.take() {
                    if controller.fire(ticket) == TickOutcome::Filled {
                        info!("Growth reached the fill heuristic, timer stopped");
                    }
                }
            }
        }

        *status.write() = Status::capture(&controller);
    }

    controller.pause();
    *status.write() = Status::capture(&controller);
    info!("Simulation task stopped");
    controller
}

fn apply<R: Renderer>(controller: &mut SimulationController<R>, command: Command) {
    match command {
        Command::Start => {
            controller.start();
        }
        Command::Pause => {
            controller.pause();
        }
        Command::SetInterval(interval) => controller.set_interval(interval),
        Command::Toggle { row, col, reply } => {
            let result = controller.toggle(row, col);
            if let Err(e) = &result {
                warn!("Toggle rejected: {}", e);
            }
            let _ = reply.send(result);
        }
        Command::Reset { height, width } => controller.reset(height, width),
        Command::SetCellSize { cell_size, reply } => {
            let _ = reply.send(controller.set_cell_size(cell_size));
        }
        Command::Redraw => controller.redraw(),
        Command::Snapshot(reply) => {
            let _ = reply.send(Status::capture(controller));
        }
        // Handled by the task loop
        Command::Shutdown => {}
    }
}
