//! Interactive terminal dashboard.
//!
//! Split along Elm lines: `model` holds state, `update` is the pure
//! transition function, `render` composes frames into a canvas, and
//! `runtime` wires the timer, terminal input and frame sink together.

#![allow(missing_docs)]

pub mod input;
pub mod model;
pub mod render;
pub mod runtime;
pub mod signals;
pub mod sink;
pub mod terminal_guard;
pub mod update;

pub use model::{DashboardCmd, DashboardMsg, DashboardState, View};
pub use render::{Canvas, FrameSink, MemorySink};
pub use runtime::{DashboardController, DashboardSettings, run_dashboard};
