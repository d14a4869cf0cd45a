//! Lines made of colored spans, renderable as ANSI text or terminal cells.

#![allow(missing_docs)]

use colored::{Color, Colorize};

/// A run of text sharing one foreground color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub color: Option<Color>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }

    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }
}

/// One output line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<Span>,
}

impl StyledLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::plain(text)],
        }
    }

    pub fn push(&mut self, span: Span) {
        if !span.text.is_empty() {
            self.spans.push(span);
        }
    }

    /// Display width in characters.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    /// Text with styles dropped.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }

    /// Clip to at most `width` characters, keeping span styles.
    #[must_use]
    pub fn clipped(&self, width: usize) -> Self {
        let mut out = Self::default();
        let mut remaining = width;
        for span in &self.spans {
            if remaining == 0 {
                break;
            }
            let take: String = span.text.chars().take(remaining).collect();
            remaining -= take.chars().count();
            out.push(Span {
                text: take,
                color: span.color,
            });
        }
        out
    }

    /// Render as text, emitting ANSI color sequences when `color` is set.
    pub fn to_ansi(&self, color: bool) -> String {
        self.spans
            .iter()
            .map(|span| match (color, span.color) {
                (true, Some(c)) => span.text.as_str().color(c).to_string(),
                _ => span.text.clone(),
            })
            .collect()
    }
}

impl From<&str> for StyledLine {
    fn from(value: &str) -> Self {
        Self::plain(value)
    }
}

impl From<String> for StyledLine {
    fn from(value: String) -> Self {
        Self::plain(value)
    }
}

/// Join lines into one block of text.
pub fn join_lines(lines: &[StyledLine], color: bool) -> String {
    lines
        .iter()
        .map(|line| line.to_ansi(color))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipping_respects_span_boundaries() {
        let mut line = StyledLine::plain("abc");
        line.push(Span::colored("defgh", Color::Red));
        let clipped = line.clipped(5);
        assert_eq!(clipped.text(), "abcde");
        assert_eq!(clipped.spans[1].color, Some(Color::Red));
        assert_eq!(line.clipped(0).width(), 0);
    }

    #[test]
    fn plain_rendering_drops_styles() {
        let mut line = StyledLine::default();
        line.push(Span::colored("ENDANGERED", Color::Red));
        assert_eq!(line.to_ansi(false), "ENDANGERED");
        assert!(line.to_ansi(true).contains("ENDANGERED"));
    }
}
