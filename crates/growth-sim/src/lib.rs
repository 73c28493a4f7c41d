//! Run control for the growth simulation.
//!
//! This module provides:
//! - The renderer callbacks the engine paints through
//! - A controller owning run/pause state and the step timer
//! - An async runner that drives a controller from a command queue

pub mod controller;
pub mod render;
pub mod runner;

pub use controller::{PendingStep, SimulationController, TickOutcome};
pub use render::{RecordingRenderer, RenderEvent, Renderer};
pub use runner::{spawn, SimulationHandle, Status};
