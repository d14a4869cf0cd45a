//! Tabular formatting engine shared by dashboard panels and one-shot commands.

pub mod highlight;
pub mod styled;
pub mod table;
pub mod units;

pub use styled::{Span, StyledLine};
pub use table::{Align, Rendered, Table};

use crate::core::config::{BytesUnit, OutputConfig};

/// Explicit rendering knobs threaded into every table and panel render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit color styles (the terminal still decides whether to show them).
    pub color: bool,
    /// Hard cap for wide columns; 0 disables truncation.
    pub max_column_width: usize,
    /// Show the extra columns appended to each row.
    pub wide: bool,
    /// User-requested sort column: 1-based index or exact header label.
    pub sort_column: Option<String>,
    pub descending: bool,
    /// Visible height of the terminal one-shot output is printed to;
    /// applied once per command via [`Rendered::capped`].
    pub max_height: Option<usize>,
    pub bytes_unit: BytesUnit,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: false,
            max_column_width: 0,
            wide: false,
            sort_column: None,
            descending: false,
            max_height: None,
            bytes_unit: BytesUnit::Mb,
        }
    }
}

impl RenderOptions {
    /// Options seeded from the `[output]` config section.
    #[must_use]
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            color: output.color,
            max_column_width: output.max_column_width,
            wide: output.wide,
            bytes_unit: output.bytes_unit,
            ..Self::default()
        }
    }
}
