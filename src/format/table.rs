//! Column-aligned table renderer.
//!
//! Column widths are the widest cell seen (header included). Columns wider
//! than 10 characters and wider than the configured cap are truncated to the
//! cap for every row, so the table stays rectangular. Highlighters only ever
//! style data rows, never the header.

#![allow(missing_docs)]

use colored::Color;

use super::RenderOptions;
use super::styled::{Span, StyledLine};
use super::units::compare_cells;

/// Separator between adjacent columns.
const COLUMN_GAP: &str = "  ";
/// Columns this narrow are never truncated.
const MIN_TRUNCATE_WIDTH: usize = 10;
/// Lines reserved for prompt and marker when capping output height.
pub const HEIGHT_MARGIN: usize = 3;

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// Maps a raw cell value to the color it should be shown in.
///
/// Must be a pure function of the value so repeated renders style identically.
pub type Highlight = fn(&str) -> Option<Color>;

#[derive(Debug, Clone)]
struct Column {
    header: String,
    align: Align,
    highlight: Option<Highlight>,
}

/// Result of rendering a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub lines: Vec<StyledLine>,
    /// Non-fatal problems (e.g. an unknown sort column); rendering continued.
    pub warnings: Vec<String>,
}

impl Rendered {
    /// Plain text lines, no warnings.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StyledLine>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            warnings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(StyledLine::is_blank)
    }

    /// Append another block's lines and warnings.
    pub fn append(&mut self, other: Self) {
        self.lines.extend(other.lines);
        self.warnings.extend(other.warnings);
    }

    /// Apply [`cap_height`] once to the whole block.
    #[must_use]
    pub fn capped(mut self, height: Option<usize>) -> Self {
        if let Some(height) = height {
            self.lines = cap_height(self.lines, height);
        }
        self
    }

    /// Render as a block of text.
    pub fn to_text(&self, color: bool) -> String {
        super::styled::join_lines(&self.lines, color)
    }
}

/// Builder + renderer for one table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    sort: Option<String>,
    descending: bool,
}

impl Table {
    /// Table with the given headers, all left aligned.
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            columns: headers
                .iter()
                .map(|h| Column {
                    header: h.as_ref().to_string(),
                    align: Align::Left,
                    highlight: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Set per-column alignment. A length mismatch leaves every column left aligned.
    #[must_use]
    pub fn aligned(mut self, aligns: &[Align]) -> Self {
        if aligns.len() == self.columns.len() {
            for (col, align) in self.columns.iter_mut().zip(aligns) {
                col.align = *align;
            }
        }
        self
    }

    /// Add trailing columns (used for wide output).
    #[must_use]
    pub fn with_extra_columns<S: AsRef<str>>(mut self, headers: &[S], aligns: &[Align]) -> Self {
        for (i, header) in headers.iter().enumerate() {
            self.columns.push(Column {
                header: header.as_ref().to_string(),
                align: aligns.get(i).copied().unwrap_or_default(),
                highlight: None,
            });
        }
        self
    }

    /// Style cells of the 0-based `column` with `highlight`.
    #[must_use]
    pub fn highlight(mut self, column: usize, highlight: Highlight) -> Self {
        if let Some(col) = self.columns.get_mut(column) {
            col.highlight = Some(highlight);
        }
        self
    }

    /// Default sort column: 1-based index or exact header label.
    #[must_use]
    pub fn sorted_by(mut self, key: impl Into<String>) -> Self {
        self.sort = Some(key.into());
        self
    }

    #[must_use]
    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    pub fn add_row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(values.into_iter().map(Into::into).collect());
    }

    /// Extend the most recently added row with more cells.
    pub fn append_to_last_row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(row) = self.rows.last_mut() {
            row.extend(values.into_iter().map(Into::into));
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render header plus rows.
    pub fn render(&self, opts: &RenderOptions) -> Rendered {
        let mut warnings = Vec::new();
        let ncols = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.columns.len()))
            .max()
            .unwrap_or(0);

        let mut rows: Vec<Vec<&str>> = self
            .rows
            .iter()
            .map(|r| (0..ncols).map(|i| r.get(i).map_or("", String::as_str)).collect())
            .collect();

        let key = opts.sort_column.as_deref().or(self.sort.as_deref());
        if let Some(key) = key {
            match self.resolve_sort(key, ncols) {
                Ok(index) => {
                    let descending = self.descending || opts.descending;
                    rows.sort_by(|a, b| {
                        let ord = compare_cells(a[index], b[index]);
                        if descending { ord.reverse() } else { ord }
                    });
                }
                Err(msg) => warnings.push(msg),
            }
        }

        let header: Vec<&str> = (0..ncols)
            .map(|i| self.columns.get(i).map_or("", |c| c.header.as_str()))
            .collect();
        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let cap = opts.max_column_width;
        let truncate: Vec<bool> = widths
            .iter_mut()
            .map(|w| {
                let hit = cap > 0 && *w > MIN_TRUNCATE_WIDTH && *w > cap;
                if hit {
                    *w = cap;
                }
                hit
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(self.render_row(&header, &widths, &truncate, false, opts.color));
        for row in &rows {
            lines.push(self.render_row(row, &widths, &truncate, true, opts.color));
        }
        Rendered { lines, warnings }
    }

    fn resolve_sort(&self, key: &str, ncols: usize) -> Result<usize, String> {
        if let Ok(index) = key.trim().parse::<usize>() {
            return if (1..=ncols).contains(&index) {
                Ok(index - 1)
            } else {
                Err(format!(
                    "[MON-TABLE] sort column {index} out of range 1..={ncols}"
                ))
            };
        }
        self.columns
            .iter()
            .position(|c| c.header == key)
            .ok_or_else(|| format!("[MON-TABLE] no column named {key:?} to sort by"))
    }

    fn render_row(
        &self,
        cells: &[&str],
        widths: &[usize],
        truncate: &[bool],
        data_row: bool,
        color: bool,
    ) -> StyledLine {
        let mut line = StyledLine::default();
        let last = cells.len().saturating_sub(1);
        for (i, raw) in cells.iter().enumerate() {
            let width = widths[i];
            let text = if truncate[i] {
                truncate_cell(raw, width)
            } else {
                (*raw).to_string()
            };
            let pad = width.saturating_sub(text.chars().count());
            let column = self.columns.get(i);
            let align = column.map_or(Align::Left, |c| c.align);
            let style = if data_row && color {
                column.and_then(|c| c.highlight).and_then(|h| h(raw))
            } else {
                None
            };

            if i > 0 {
                line.push(Span::plain(COLUMN_GAP));
            }
            if align == Align::Right {
                line.push(Span::plain(" ".repeat(pad)));
            }
            line.push(Span {
                text,
                color: style,
            });
            if align == Align::Left && i != last {
                line.push(Span::plain(" ".repeat(pad)));
            }
        }
        line
    }
}

/// `"abcdefghijklmnop"` at width 10 -> `"abcdefg..."`.
fn truncate_cell(raw: &str, width: usize) -> String {
    if raw.chars().count() <= width {
        return raw.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut out: String = raw.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Limit output to the visible height minus [`HEIGHT_MARGIN`], ending with a
/// `…N more line(s)` marker when anything was cut.
pub fn cap_height(mut lines: Vec<StyledLine>, height: usize) -> Vec<StyledLine> {
    let limit = height.saturating_sub(HEIGHT_MARGIN).max(1);
    if lines.len() <= limit {
        return lines;
    }
    let keep = limit - 1;
    let hidden = lines.len() - keep;
    lines.truncate(keep);
    let noun = if hidden == 1 { "line" } else { "lines" };
    lines.push(StyledLine::plain(format!("…{hidden} more {noun}")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(rendered: &Rendered) -> Vec<String> {
        rendered.lines.iter().map(StyledLine::text).collect()
    }

    #[test]
    fn pads_to_widest_cell_and_aligns() {
        let mut table = Table::new(&["NAME", "SIZE"]).aligned(&[Align::Left, Align::Right]);
        table.add_row(["a", "1"]);
        table.add_row(["long-name", "12345"]);
        let out = text(&table.render(&RenderOptions::default()));
        assert_eq!(out[0], format!("NAME{}SIZE", " ".repeat(8)));
        assert_eq!(out[1], format!("a{}1", " ".repeat(14)));
        assert_eq!(out[2], "long-name  12345");
    }

    #[test]
    fn sorts_by_unit_aware_value() {
        let mut table = Table::new(&["CACHE", "MEMORY"]).sorted_by("MEMORY");
        table.add_row(["x", "10 MB"]);
        table.add_row(["y", "2 GB"]);
        table.add_row(["z", "900 KB"]);
        let out = text(&table.render(&RenderOptions::default()));
        let order: Vec<&str> = out[1..].iter().map(|l| &l[..1]).collect();
        assert_eq!(order, vec!["z", "x", "y"]);
    }

    #[test]
    fn descending_sort_by_index() {
        let mut table = Table::new(&["ID"]);
        for id in ["2", "10", "1"] {
            table.add_row([id]);
        }
        let opts = RenderOptions {
            sort_column: Some("1".to_string()),
            descending: true,
            ..RenderOptions::default()
        };
        let out = text(&table.render(&opts));
        assert_eq!(out[1..], ["10".to_string(), "2".to_string(), "1".to_string()]);
    }

    #[test]
    fn bad_sort_column_warns_and_keeps_order() {
        let mut table = Table::new(&["A"]);
        table.add_row(["b"]);
        table.add_row(["a"]);
        let opts = RenderOptions {
            sort_column: Some("NOPE".to_string()),
            ..RenderOptions::default()
        };
        let rendered = table.render(&opts);
        assert_eq!(rendered.warnings.len(), 1);
        assert!(rendered.warnings[0].contains("NOPE"));
        assert_eq!(text(&rendered)[1..], ["b".to_string(), "a".to_string()]);

        let opts = RenderOptions {
            sort_column: Some("7".to_string()),
            ..RenderOptions::default()
        };
        assert_eq!(table.render(&opts).warnings.len(), 1);
    }

    #[test]
    fn truncates_every_row_of_wide_column() {
        let long = "x".repeat(50);
        let mut table = Table::new(&["VALUE", "N"]);
        table.add_row([long.as_str(), "1"]);
        table.add_row(["short", "2"]);
        let opts = RenderOptions {
            max_column_width: 20,
            ..RenderOptions::default()
        };
        let rendered = table.render(&opts);
        let cell = &rendered.lines[1].spans[0].text;
        assert_eq!(cell.chars().count(), 20);
        assert!(cell.ends_with("..."));
        let widths: Vec<usize> = rendered.lines.iter().map(StyledLine::width).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}");
    }

    #[test]
    fn narrow_columns_are_never_truncated() {
        let mut table = Table::new(&["V"]);
        table.add_row(["0123456789"]);
        let opts = RenderOptions {
            max_column_width: 5,
            ..RenderOptions::default()
        };
        assert_eq!(text(&table.render(&opts))[1], "0123456789");
    }

    #[test]
    fn highlight_skips_header_and_respects_color_flag() {
        fn red(v: &str) -> Option<Color> {
            (v == "STATUS" || v == "BAD").then_some(Color::Red)
        }
        let mut table = Table::new(&["STATUS"]).highlight(0, red);
        table.add_row(["BAD"]);
        let colored = table.render(&RenderOptions {
            color: true,
            ..RenderOptions::default()
        });
        assert!(colored.lines[0].spans.iter().all(|s| s.color.is_none()));
        assert!(colored.lines[1].spans.iter().any(|s| s.color == Some(Color::Red)));
        assert_eq!(colored, table.render(&RenderOptions {
            color: true,
            ..RenderOptions::default()
        }));

        let plain = table.render(&RenderOptions::default());
        assert!(plain.lines[1].spans.iter().all(|s| s.color.is_none()));
    }

    #[test]
    fn append_to_last_row_extends_wide_columns() {
        let mut table = Table::new(&["A", "B"]).with_extra_columns(&["C"], &[Align::Right]);
        table.add_row(["1", "2"]);
        table.append_to_last_row(["3"]);
        assert_eq!(text(&table.render(&RenderOptions::default()))[1], "1  2  3");
    }

    #[test]
    fn caps_height_with_marker() {
        let lines: Vec<StyledLine> = (0..20).map(|i| StyledLine::plain(i.to_string())).collect();
        let capped = cap_height(lines, 10);
        assert_eq!(capped.len(), 7);
        assert_eq!(capped[6].text(), "…14 more lines");

        let one_over: Vec<StyledLine> = (0..8).map(|i| StyledLine::plain(i.to_string())).collect();
        let capped = cap_height(one_over, 10);
        assert_eq!(capped.last().map(StyledLine::text), Some("…2 more lines".to_string()));

        let fits: Vec<StyledLine> = (0..7).map(|i| StyledLine::plain(i.to_string())).collect();
        assert_eq!(cap_height(fits, 10).len(), 7);
    }

    #[test]
    fn tables_render_in_full_and_blocks_cap_once() {
        let mut table = Table::new(&["N"]);
        for i in 0..30 {
            table.add_row([i.to_string()]);
        }
        let opts = RenderOptions {
            max_height: Some(10),
            ..RenderOptions::default()
        };
        let mut block = table.render(&opts);
        assert_eq!(block.lines.len(), 31);
        block.append(table.render(&opts));

        let capped = block.capped(opts.max_height);
        assert_eq!(capped.lines.len(), 7);
        assert_eq!(capped.lines[6].text(), "…56 more lines");
        assert_eq!(table.render(&opts).capped(None).lines.len(), 31);
    }
}
