//! Panel catalogue, layout grammar and per-panel content producers.

pub mod content;
pub mod layout;
pub mod registry;
pub mod report;

pub use content::{ContentContext, produce_lines};
pub use layout::{Layout, Slot, assign_codes, compute_grid, panel_code};
pub use registry::{DEFAULT_LAYOUT, Panel, PanelKind, PanelRegistry};
