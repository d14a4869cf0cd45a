//! Key routing for the dashboard.
//!
//! Terminal events are reduced to [`Key`] so the model and update logic stay
//! independent of the terminal backend.

#![allow(missing_docs)]

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::model::DashboardMsg;

/// Keys the dashboard distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Esc,
    /// Ctrl-C typed while the terminal is in raw mode.
    Interrupt,
    Other,
}

/// Global command bindings shown in the help overlay.
pub const HELP_BINDINGS: &[(&str, &str)] = &[
    ("?", "show or hide this help"),
    ("p", "toggle padding of short panels"),
    ("+ / -", "grow or shrink every panel"),
    ("0", "reset panel heights"),
    ("1-9, a-z", "expand or collapse the panel with that code"),
    ("ESC", "collapse expanded panel, or quit"),
    ("Ctrl-C", "quit"),
];

#[must_use]
pub fn map_key_event(key: KeyEvent) -> Key {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Interrupt,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Esc => Key::Esc,
        _ => Key::Other,
    }
}

/// Translate a terminal event into a dashboard message, if it is one.
#[must_use]
pub fn map_event(event: &Event) -> Option<DashboardMsg> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            Some(DashboardMsg::Key(map_key_event(*key)))
        }
        Event::Resize(width, height) => Some(DashboardMsg::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}
