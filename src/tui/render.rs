//! Frame composition for the dashboard.
//!
//! A frame is drawn into an in-memory [`Canvas`] and then handed to a
//! [`FrameSink`]. Composition is pure: it reads the last snapshot, the layout
//! and the interactive state, and never touches the terminal.

#![allow(missing_docs)]
#![allow(clippy::too_many_lines)]

use std::time::Duration;

use chrono::{DateTime, Local};
use colored::Color;

use super::input::HELP_BINDINGS;
use super::model::{DashboardState, View};
use crate::collector::{ClusterSnapshot, Selection};
use crate::core::errors::Result;
use crate::format::{RenderOptions, StyledLine};
use crate::panels::layout::{Layout, Slot, compute_grid, panel_code};
use crate::panels::registry::{Panel, PanelRegistry};
use crate::panels::{ContentContext, produce_lines};

/// Smallest canvas the grid is drawn into.
pub const MIN_WIDTH: usize = 40;
pub const MIN_HEIGHT: usize = 8;

/// Rows above the panel area: header plus one blank line.
const HEADER_ROWS: usize = 2;
const RETRIEVING: &str = " Retrieving data...";
const TRIMMED_SUFFIX: &str = "─(trimmed)";

// ──────────────────── canvas ────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub color: Option<Color>,
    pub reverse: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: None,
            reverse: false,
        }
    }
}

/// Fixed-size grid of cells. Writes outside the grid are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        (x < self.width && y < self.height).then(|| &self.cells[y * self.width + x])
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Write `text` from `(x, y)`, at most `max` columns. Returns columns written.
    pub fn put_str(
        &mut self,
        x: usize,
        y: usize,
        text: &str,
        max: usize,
        color: Option<Color>,
        reverse: bool,
    ) -> usize {
        let mut written = 0;
        for ch in text.chars().take(max) {
            if x + written >= self.width {
                break;
            }
            self.set(x + written, y, Cell { ch, color, reverse });
            written += 1;
        }
        written
    }

    pub fn put_line(&mut self, x: usize, y: usize, line: &StyledLine, max: usize) {
        let mut col = 0;
        for span in &line.spans {
            if col >= max {
                break;
            }
            col += self.put_str(x + col, y, &span.text, max - col, span.color, false);
        }
    }

    pub fn clear_rect(&mut self, x: usize, y: usize, width: usize, height: usize) {
        for row in y..y + height {
            for col in x..x + width {
                self.set(col, row, Cell::default());
            }
        }
    }

    /// Border box with the title embedded in the top edge.
    pub fn draw_box(&mut self, x: usize, y: usize, width: usize, height: usize, title: &str) {
        if width < 2 || height < 2 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;
        for col in x + 1..right {
            self.set(col, y, plain('─'));
            self.set(col, bottom, plain('─'));
        }
        for row in y + 1..bottom {
            self.set(x, row, plain('│'));
            self.set(right, row, plain('│'));
        }
        self.set(x, y, plain('┌'));
        self.set(right, y, plain('┐'));
        self.set(x, bottom, plain('└'));
        self.set(right, bottom, plain('┘'));
        if !title.is_empty() && width > 4 {
            self.put_str(x + 1, y, &format!(" {title} "), width - 3, None, false);
        }
    }

    /// One row as plain text with trailing spaces removed.
    pub fn row_text(&self, y: usize) -> String {
        if y >= self.height {
            return String::new();
        }
        let row: String = self.cells[y * self.width..(y + 1) * self.width]
            .iter()
            .map(|c| c.ch)
            .collect();
        row.trim_end().to_string()
    }

    /// The whole canvas as plain text, one line per row.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rows of cells, for sinks that emit them to a device.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1)).take(self.height)
    }
}

fn plain(ch: char) -> Cell {
    Cell {
        ch,
        color: None,
        reverse: false,
    }
}

// ──────────────────── sinks ────────────────────

/// Destination for composed frames.
pub trait FrameSink: Send {
    /// Current drawable size as (columns, rows).
    fn size(&mut self) -> Result<(usize, usize)>;
    fn present(&mut self, canvas: &Canvas) -> Result<()>;
}

/// Sink that keeps every presented frame in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    width: usize,
    height: usize,
    frames: Vec<Canvas>,
}

impl MemorySink {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    pub fn frames(&self) -> &[Canvas] {
        &self.frames
    }

    pub fn last(&self) -> Option<&Canvas> {
        self.frames.last()
    }
}

impl FrameSink for MemorySink {
    fn size(&mut self) -> Result<(usize, usize)> {
        Ok((self.width, self.height))
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        self.frames.push(canvas.clone());
        Ok(())
    }
}

// ──────────────────── composition ────────────────────

/// Everything one frame is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub registry: &'a PanelRegistry,
    pub layout: &'a Layout,
    /// `None` when the last refresh could not reach the cluster at all.
    pub snapshot: Option<&'a ClusterSnapshot>,
    /// Why no snapshot is available.
    pub unavailable: Option<&'a str>,
    pub state: &'a DashboardState,
    pub options: &'a RenderOptions,
    pub selection: &'a Selection,
    /// When the cluster identity was last confirmed.
    pub last_success: Option<DateTime<Local>>,
    pub refresh: Duration,
    pub width: usize,
    pub height: usize,
}

/// A composed frame plus any formatting warnings raised while drawing it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub canvas: Canvas,
    pub warnings: Vec<String>,
}

/// Draw one complete frame.
pub fn compose_frame(input: &FrameInput<'_>) -> Frame {
    let mut canvas = Canvas::new(input.width, input.height);
    let mut warnings = Vec::new();

    if input.width < MIN_WIDTH || input.height < MIN_HEIGHT {
        let notice = format!(
            "Terminal too small ({}x{}), need at least {MIN_WIDTH}x{MIN_HEIGHT}",
            input.width, input.height
        );
        canvas.put_str(0, 0, &notice, input.width, None, false);
        return Frame { canvas, warnings };
    }

    match input.snapshot {
        Some(snapshot) => {
            draw_header(&mut canvas, input, Some(snapshot));
            draw_panels(&mut canvas, input, snapshot, &mut warnings);
        }
        None => {
            draw_header(&mut canvas, input, None);
            draw_unavailable(&mut canvas, input);
        }
    }

    if let Some(first) = warnings.first() {
        draw_status(&mut canvas, first, warnings.len());
    }
    if input.state.help {
        draw_help(&mut canvas);
    }
    Frame { canvas, warnings }
}

/// Signature of a frame composer; the runtime uses [`compose_frame`].
pub type Composer = fn(&FrameInput<'_>) -> Frame;

/// Overlay the "Retrieving data..." marker on an already composed frame.
pub fn draw_retrieving(canvas: &mut Canvas) {
    let x = canvas.width().saturating_sub(20);
    let width = canvas.width();
    canvas.put_str(x, 0, &format!("{RETRIEVING:<20}"), width - x, None, true);
}

/// Bottom-row notice for formatting warnings raised while composing.
fn draw_status(canvas: &mut Canvas, first: &str, count: usize) {
    let y = canvas.height() - 1;
    let width = canvas.width();
    let text = if count > 1 {
        format!(" {first} (+{} more)", count - 1)
    } else {
        format!(" {first}")
    };
    canvas.clear_rect(0, y, width, 1);
    canvas.put_str(0, y, &text, width, Some(Color::Yellow), true);
}

fn draw_header(canvas: &mut Canvas, input: &FrameInput<'_>, snapshot: Option<&ClusterSnapshot>) {
    let refresh = format!("refresh={}s", input.refresh.as_secs());
    let stamp = input.last_success.map_or_else(
        || "never".to_string(),
        |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    let took = input.state.last_duration.as_millis();
    let text = match snapshot {
        Some(snapshot) => {
            let version = snapshot
                .cluster
                .version
                .split_whitespace()
                .next()
                .unwrap_or("?");
            format!(
                "{stamp} - Monitoring cluster {} ({version}) ESC to quit {}. ({refresh}, took {took}ms)",
                snapshot.cluster.cluster_name,
                input.state.header_hint(),
            )
        }
        None => format!(
            "Monitoring cluster: data unavailable (last success {stamp}). ESC to quit. ({refresh}, took {took}ms)"
        ),
    };
    canvas.put_str(1, 0, &text, input.width.saturating_sub(1), None, true);
}

fn draw_unavailable(canvas: &mut Canvas, input: &FrameInput<'_>) {
    let reason = input.unavailable.unwrap_or("no data has been retrieved yet");
    let lines = [
        String::new(),
        format!("  {reason}"),
        String::new(),
        format!(
            "  Retrying every {}s. Press ESC to quit.",
            input.refresh.as_secs()
        ),
    ];
    let height = (lines.len() + 2).min(input.height - HEADER_ROWS);
    canvas.draw_box(0, HEADER_ROWS, input.width, height, "Data unavailable");
    for (i, line) in lines.iter().enumerate().take(height.saturating_sub(2)) {
        canvas.put_str(1, HEADER_ROWS + 1 + i, line, input.width - 2, None, false);
    }
}

fn draw_panels(
    canvas: &mut Canvas,
    input: &FrameInput<'_>,
    snapshot: &ClusterSnapshot,
    warnings: &mut Vec<String>,
) {
    let grid = compute_grid(input.width, &input.layout.row_sizes());
    let mut index = 0;
    let mut y = HEADER_ROWS;

    for (row, slots) in input.layout.rows.iter().zip(&grid) {
        let mut row_height = 0;
        for (name, slot) in row.iter().zip(slots) {
            let code = panel_code(index);
            index += 1;
            let (Some(code), Some(panel)) = (code, input.registry.panel(name)) else {
                continue;
            };
            match input.state.view {
                View::Expanded(expanded) if expanded != code => continue,
                View::Expanded(_) => {
                    let full = Slot {
                        x: 0,
                        width: input.width,
                    };
                    let rows = input.height - HEADER_ROWS - 2;
                    draw_panel(canvas, input, snapshot, panel, code, full, HEADER_ROWS, rows, true, warnings);
                    return;
                }
                View::Grid => {
                    let rows = panel.max_height + input.state.height_adjust;
                    let used = draw_panel(canvas, input, snapshot, panel, code, *slot, y, rows, false, warnings);
                    row_height = row_height.max(used);
                }
            }
        }
        y += row_height;
        if y >= input.height && matches!(input.state.view, View::Grid) {
            break;
        }
    }
}

/// Draw one boxed panel with its top-left corner at `(slot.x, y)`.
/// Returns the rows used, border included.
#[allow(clippy::too_many_arguments)]
fn draw_panel(
    canvas: &mut Canvas,
    input: &FrameInput<'_>,
    snapshot: &ClusterSnapshot,
    panel: &Panel,
    code: char,
    slot: Slot,
    y: usize,
    max_rows: usize,
    expanded: bool,
    warnings: &mut Vec<String>,
) -> usize {
    let mut lines = panel_lines(panel, snapshot, input, warnings);

    if input.state.padding && !expanded {
        while lines.len() < max_rows {
            lines.push(StyledLine::default());
        }
    } else {
        while lines.last().is_some_and(StyledLine::is_blank) {
            lines.pop();
        }
    }

    let trimmed = lines.len() > max_rows;
    lines.truncate(max_rows);

    let mut title = format!("{} [{code}]", panel.title_for(input.selection));
    if trimmed {
        title.push_str(TRIMMED_SUFFIX);
    }
    let height = lines.len() + 2;
    canvas.draw_box(slot.x, y, slot.width, height, &title);
    let inner = slot.width.saturating_sub(2);
    for (i, line) in lines.iter().enumerate() {
        canvas.put_line(slot.x + 1, y + 1 + i, line, inner);
    }
    height
}

fn panel_lines(
    panel: &Panel,
    snapshot: &ClusterSnapshot,
    input: &FrameInput<'_>,
    warnings: &mut Vec<String>,
) -> Vec<StyledLine> {
    if panel.groups.iter().any(|g| snapshot.failed.contains(g)) {
        return placeholder("Unable to retrieve data");
    }
    let ctx = ContentContext {
        options: input.options,
        selection: input.selection,
    };
    match produce_lines(panel, snapshot, &ctx) {
        Ok(rendered) if rendered.is_empty() => {
            warnings.extend(rendered.warnings);
            placeholder("No Content")
        }
        Ok(rendered) => {
            warnings.extend(rendered.warnings);
            rendered.lines
        }
        Err(e) => {
            let message = e.to_string();
            warnings.push(message.clone());
            placeholder(&message)
        }
    }
}

fn placeholder(text: &str) -> Vec<StyledLine> {
    vec![StyledLine::default(), StyledLine::plain(format!("  {text}"))]
}

fn draw_help(canvas: &mut Canvas) {
    let mut lines: Vec<String> = HELP_BINDINGS
        .iter()
        .map(|(key, what)| format!(" {key:<10} {what}"))
        .collect();
    lines.push(String::new());
    lines.push(" Press any key to close".to_string());

    let content_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    let width = (content_width + 2).min(canvas.width());
    let height = (lines.len() + 2).min(canvas.height());
    let x = (canvas.width() - width) / 2;
    let y = (canvas.height() - height) / 2;

    canvas.clear_rect(x, y, width, height);
    canvas.draw_box(x, y, width, height, "Help");
    for (i, line) in lines.iter().enumerate().take(height - 2) {
        canvas.put_str(x + 1, y + 1 + i, line, width - 2, None, false);
    }
}
