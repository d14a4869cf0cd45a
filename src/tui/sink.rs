//! Terminal-backed [`FrameSink`].

use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use super::render::{Canvas, Cell, FrameSink};
use super::terminal_guard::terminal_size;
use crate::core::errors::{MonError, Result};

/// Writes whole frames to stdout. Only valid while a
/// [`super::terminal_guard::TerminalGuard`] is held.
pub struct CrosstermSink {
    stdout: Stdout,
    last_size: (usize, usize),
}

impl CrosstermSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last_size: (0, 0),
        }
    }

    fn write_frame(&mut self, canvas: &Canvas) -> io::Result<()> {
        let size = (canvas.width(), canvas.height());
        if size != self.last_size {
            queue!(self.stdout, Clear(ClearType::All))?;
            self.last_size = size;
        }
        for (y, row) in canvas.rows().enumerate() {
            queue!(self.stdout, MoveTo(0, to_u16(y)))?;
            let mut start = 0;
            while start < row.len() {
                let style = style_of(&row[start]);
                let end = row[start..]
                    .iter()
                    .position(|c| style_of(c) != style)
                    .map_or(row.len(), |n| start + n);
                let run: String = row[start..end].iter().map(|c| c.ch).collect();
                if let Some(color) = style.0 {
                    queue!(self.stdout, SetForegroundColor(color))?;
                }
                if style.1 {
                    queue!(self.stdout, SetAttribute(Attribute::Reverse))?;
                }
                queue!(self.stdout, Print(run))?;
                if style.0.is_some() || style.1 {
                    queue!(self.stdout, SetAttribute(Attribute::Reset), ResetColor)?;
                }
                start = end;
            }
        }
        self.stdout.flush()
    }
}

impl Default for CrosstermSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for CrosstermSink {
    fn size(&mut self) -> Result<(usize, usize)> {
        Ok(terminal_size())
    }

    fn present(&mut self, canvas: &Canvas) -> Result<()> {
        self.write_frame(canvas).map_err(|e| MonError::Rendering {
            details: format!("terminal write: {e}"),
        })
    }
}

fn style_of(cell: &Cell) -> (Option<Color>, bool) {
    (cell.color.map(terminal_color), cell.reverse)
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Map a table highlight color onto the terminal palette.
fn terminal_color(color: colored::Color) -> Color {
    use colored::Color as C;
    match color {
        C::Black => Color::Black,
        C::Red => Color::DarkRed,
        C::Green => Color::DarkGreen,
        C::Yellow => Color::DarkYellow,
        C::Blue => Color::DarkBlue,
        C::Magenta => Color::DarkMagenta,
        C::Cyan => Color::DarkCyan,
        C::White => Color::Grey,
        C::BrightBlack => Color::DarkGrey,
        C::BrightRed => Color::Red,
        C::BrightGreen => Color::Green,
        C::BrightYellow => Color::Yellow,
        C::BrightBlue => Color::Blue,
        C::BrightMagenta => Color::Magenta,
        C::BrightCyan => Color::Cyan,
        C::BrightWhite => Color::White,
        C::TrueColor { r, g, b } => Color::Rgb { r, g, b },
        #[allow(unreachable_patterns)]
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_colors_map_to_palette() {
        assert_eq!(terminal_color(colored::Color::Red), Color::DarkRed);
        assert_eq!(terminal_color(colored::Color::BrightYellow), Color::Yellow);
        assert_eq!(
            terminal_color(colored::Color::TrueColor { r: 1, g: 2, b: 3 }),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }

    #[test]
    fn style_runs_split_on_change() {
        let plain = Cell::default();
        let red = Cell {
            ch: 'x',
            color: Some(colored::Color::Red),
            reverse: false,
        };
        assert_ne!(style_of(&plain), style_of(&red));
        assert_eq!(style_of(&plain), (None, false));
    }
}
