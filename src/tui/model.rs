//! Elm-style state model for the dashboard.
//!
//! All display state lives in [`DashboardState`]. Input and timer events
//! arrive as [`DashboardMsg`] values; side effects are described by the
//! [`DashboardCmd`] returned from [`super::update::update`]. No I/O happens here.

#![allow(missing_docs)]

use std::time::Duration;

use super::input::Key;
use crate::panels::layout::panel_code;

/// What the panel area currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Every panel of the layout.
    #[default]
    Grid,
    /// One panel, identified by its code in the current frame, fills the canvas.
    Expanded(char),
}

/// Events consumed by the update function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMsg {
    Key(Key),
    /// Periodic refresh timer fired.
    Tick,
    Resize { width: u16, height: u16 },
    /// SIGINT/SIGTERM or an equivalent hard stop.
    Interrupt,
}

/// Side effect requested by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCmd {
    None,
    /// Draw again from the last snapshot.
    Redraw,
    /// Collect a fresh snapshot, then draw.
    Refresh,
    Quit,
}

/// Interactive state of one dashboard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub view: View,
    /// Help overlay shown; the view underneath is kept.
    pub help: bool,
    /// Pad short panel content with blank lines up to the panel height.
    pub padding: bool,
    /// Rows added to every panel's declared height.
    pub height_adjust: usize,
    initial_height_adjust: usize,
    /// Panels in the layout; codes beyond this are not bound.
    pub panel_count: usize,
    pub last_duration: Duration,
    /// Show "Retrieving data..." before the next fetch.
    pub show_retrieving: bool,
    pub quit: bool,
}

impl DashboardState {
    pub fn new(panel_count: usize, padding: bool, height_adjust: usize) -> Self {
        Self {
            view: View::Grid,
            help: false,
            padding,
            height_adjust,
            initial_height_adjust: height_adjust,
            panel_count,
            last_duration: Duration::ZERO,
            show_retrieving: true,
            quit: false,
        }
    }

    /// Whether `code` is bound to a panel of the current frame.
    pub fn is_panel_code(&self, code: char) -> bool {
        (0..self.panel_count).any(|i| panel_code(i) == Some(code))
    }

    /// Reset the height adjustment to its session start value.
    pub fn reset_height(&mut self) {
        self.height_adjust = self.initial_height_adjust;
    }

    /// Record how long the last collect took; slow cycles turn on the
    /// "retrieving" indicator for the next one.
    pub fn record_refresh(&mut self, duration: Duration, slow_threshold: Duration) {
        self.last_duration = duration;
        self.show_retrieving = duration > slow_threshold;
    }

    /// Hint shown in the header for the current view.
    pub fn header_hint(&self) -> &'static str {
        match self.view {
            View::Grid => "(press key in [] to expand panel, ? for help)",
            View::Expanded(_) => "(press key in [] or ESC to collapse)",
        }
    }
}
