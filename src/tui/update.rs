//! Pure state transitions for the dashboard.

#![allow(missing_docs)]

use super::input::Key;
use super::model::{DashboardCmd, DashboardMsg, DashboardState, View};

/// Apply `msg` to `state` and return the side effect to run.
pub fn update(state: &mut DashboardState, msg: DashboardMsg) -> DashboardCmd {
    match msg {
        // Help suspends refreshes: no fetch and no redraw underneath the overlay.
        DashboardMsg::Tick if state.help => DashboardCmd::None,
        DashboardMsg::Tick => DashboardCmd::Refresh,
        DashboardMsg::Resize { .. } => DashboardCmd::Redraw,
        DashboardMsg::Interrupt | DashboardMsg::Key(Key::Interrupt) => quit(state),
        DashboardMsg::Key(_) if state.help => {
            state.help = false;
            DashboardCmd::Redraw
        }
        DashboardMsg::Key(key) => on_key(state, key),
    }
}

fn quit(state: &mut DashboardState) -> DashboardCmd {
    state.quit = true;
    DashboardCmd::Quit
}

fn on_key(state: &mut DashboardState, key: Key) -> DashboardCmd {
    match key {
        Key::Esc => match state.view {
            View::Expanded(_) => {
                state.view = View::Grid;
                DashboardCmd::Redraw
            }
            View::Grid => quit(state),
        },
        Key::Char('?') => {
            state.help = true;
            DashboardCmd::Redraw
        }
        Key::Char('p') => {
            state.padding = !state.padding;
            DashboardCmd::Redraw
        }
        Key::Char('+') => {
            state.height_adjust = state.height_adjust.saturating_add(1);
            DashboardCmd::Redraw
        }
        Key::Char('-') => {
            state.height_adjust = state.height_adjust.saturating_sub(1);
            DashboardCmd::Redraw
        }
        Key::Char('0') => {
            state.reset_height();
            DashboardCmd::Redraw
        }
        Key::Char(' ') if matches!(state.view, View::Expanded(_)) => {
            state.view = View::Grid;
            DashboardCmd::Redraw
        }
        Key::Char(code) if state.is_panel_code(code) => {
            state.view = match state.view {
                View::Expanded(current) if current == code => View::Grid,
                _ => View::Expanded(code),
            };
            DashboardCmd::Redraw
        }
        _ => DashboardCmd::None,
    }
}
