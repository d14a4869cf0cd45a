//! Layout grammar, grid geometry and per-frame panel codes.
//!
//! Grammar: rows separated by `:`, panels within a row by `,`.
//! `"a,b:c"` is two rows, the first with two side-by-side panels.

#![allow(missing_docs)]

use crate::core::errors::{MonError, Result};

/// Keys bound to global commands; never handed out as panel codes.
pub const COMMAND_KEYS: [char; 5] = ['?', 'p', '+', '-', '0'];

/// Panel codes in assignment order: digits, then lowercase letters.
const CODE_SEQUENCE: &str = "123456789abcdefghijklmnopqrstuvwxyz";

/// Most panels a layout may hold (one per available code).
pub const MAX_PANELS: usize = 34;

/// How many named layouts may expand inside one another.
pub const MAX_NESTING: usize = 4;

/// Resolved layout: rows of panel names in draw order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Spec as given by the user (may be a layout name).
    pub spec: String,
    pub rows: Vec<Vec<String>>,
}

impl Layout {
    pub fn new(spec: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            spec: spec.into(),
            rows,
        }
    }

    /// Panel names in draw order.
    pub fn panels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }

    pub fn panel_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.panel_count() == 0
    }

    /// Panel count of every row, for [`compute_grid`].
    pub fn row_sizes(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }
}

/// Split a spec into trimmed rows of names without checking the names.
pub fn parse_rows(spec: &str) -> Result<Vec<Vec<String>>> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(MonError::InvalidLayout {
            spec: spec.to_string(),
            details: "layout is empty".to_string(),
        });
    }
    trimmed
        .split(':')
        .enumerate()
        .map(|(index, row)| {
            let names: Vec<String> = row.split(',').map(|n| n.trim().to_string()).collect();
            if names.iter().any(String::is_empty) {
                return Err(MonError::InvalidLayout {
                    spec: spec.to_string(),
                    details: format!("row {} has an empty panel name", index + 1),
                });
            }
            Ok(names)
        })
        .collect()
}

/// Horizontal placement of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub x: usize,
    pub width: usize,
}

/// Split `width` evenly across `count` panels; the first `width % count`
/// panels get one extra column.
pub fn split_width(width: usize, count: usize) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }
    let base = width / count;
    let extra = width % count;
    (0..count).map(|i| base + usize::from(i < extra)).collect()
}

/// Per-row, per-panel slots for a canvas `width` columns wide.
pub fn compute_grid(width: usize, panels_per_row: &[usize]) -> Vec<Vec<Slot>> {
    panels_per_row
        .iter()
        .map(|&count| {
            let mut x = 0;
            split_width(width, count)
                .into_iter()
                .map(|w| {
                    let slot = Slot { x, width: w };
                    x += w;
                    slot
                })
                .collect()
        })
        .collect()
}

/// Code for the panel drawn at `index` in the current frame.
pub fn panel_code(index: usize) -> Option<char> {
    CODE_SEQUENCE
        .chars()
        .filter(|c| !COMMAND_KEYS.contains(c))
        .nth(index)
}

/// Codes for every panel of `layout`, in draw order.
pub fn assign_codes(layout: &Layout) -> Vec<(char, &str)> {
    layout
        .panels()
        .enumerate()
        .filter_map(|(index, name)| panel_code(index).map(|code| (code, name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_columns() {
        let rows = parse_rows("a,b:c").unwrap();
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c"]]);
        let rows = parse_rows(" a , b ").unwrap();
        assert_eq!(rows, vec![vec!["a", "b"]]);
    }

    #[test]
    fn rejects_empty_and_malformed() {
        for spec in ["", "   ", "a,,b", "a:", ":a", "a::b"] {
            let err = parse_rows(spec).unwrap_err();
            assert_eq!(err.code(), "MON-1101", "spec {spec:?}");
        }
    }

    #[test]
    fn width_remainder_goes_left() {
        assert_eq!(split_width(10, 3), vec![4, 3, 3]);
        assert_eq!(split_width(11, 3), vec![4, 4, 3]);
        assert_eq!(split_width(9, 1), vec![9]);
        assert!(split_width(9, 0).is_empty());
    }

    #[test]
    fn grid_slots_tile_each_row() {
        let grid = compute_grid(80, &[2, 1, 3]);
        assert_eq!(grid[0], vec![Slot { x: 0, width: 40 }, Slot { x: 40, width: 40 }]);
        assert_eq!(grid[1], vec![Slot { x: 0, width: 80 }]);
        assert_eq!(
            grid[2],
            vec![
                Slot { x: 0, width: 27 },
                Slot { x: 27, width: 27 },
                Slot { x: 54, width: 26 },
            ]
        );
    }

    #[test]
    fn codes_skip_command_keys() {
        assert_eq!(panel_code(0), Some('1'));
        assert_eq!(panel_code(8), Some('9'));
        assert_eq!(panel_code(9), Some('a'));
        assert_eq!(panel_code(23), Some('o'));
        assert_eq!(panel_code(24), Some('q'));
        assert_eq!(panel_code(MAX_PANELS - 1), Some('z'));
        assert_eq!(panel_code(MAX_PANELS), None);
    }

    #[test]
    fn codes_follow_draw_order() {
        let layout = Layout::new("x", vec![vec!["a".into(), "b".into()], vec!["c".into()]]);
        assert_eq!(assign_codes(&layout), vec![('1', "a"), ('2', "b"), ('3', "c")]);
        assert_eq!(assign_codes(&layout), assign_codes(&layout));
    }
}
