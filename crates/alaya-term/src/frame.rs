// SPDX-License-Identifier: MIT
//
// One screenful of coloured text.
//
// The app fills a `Frame` row by row with coloured spans and says where the
// cursor goes; `render` turns that into a full repaint. Every row is drawn
// from column 0 and cleared to the end, so nothing from the last frame
// survives. Text past the right edge is cut at the last whole glyph,
// measured in terminal cells.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi::{self, Color};
use crate::terminal::Size;

// ─── Span ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub color: Color,
}

impl Span {
    #[must_use]
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Color::Default)
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Frame {
    size: Size,
    rows: Vec<Vec<Span>>,
    cursor: Option<(usize, usize)>,
}

impl Frame {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            rows: vec![Vec::new(); usize::from(size.rows)],
            cursor: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Drop all spans and hide the cursor.
    pub fn clear(&mut self) {
        self.rows.iter_mut().for_each(Vec::clear);
        self.cursor = None;
    }

    /// Append a span to `row`. Rows past the bottom are ignored.
    pub fn push(&mut self, row: usize, span: Span) {
        if let Some(spans) = self.rows.get_mut(row) {
            spans.push(span);
        }
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[Span] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Show the cursor at `(row, col)` after the frame is drawn. `None`
    /// hides it.
    pub fn set_cursor(&mut self, at: Option<(usize, usize)>) {
        self.cursor = at;
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<(usize, usize)> {
        self.cursor
    }

    /// Write the whole frame to `w`.
    ///
    /// # Errors
    ///
    /// Whatever `w` returns.
    pub fn render(&self, w: &mut impl Write) -> io::Result<()> {
        let cols = usize::from(self.size.cols);
        ansi::cursor_hide(w)?;

        for (y, spans) in self.rows.iter().enumerate() {
            ansi::cursor_to(w, y, 0)?;
            let mut used = 0;
            for span in spans {
                if used >= cols {
                    break;
                }
                let (text, width) = fit(&span.text, cols - used);
                if !text.is_empty() {
                    ansi::fg(w, span.color)?;
                    w.write_all(text.as_bytes())?;
                }
                used += width;
            }
            ansi::reset(w)?;
            if used < cols {
                ansi::clear_line(w)?;
            }
        }

        if let Some((row, col)) = self.cursor {
            ansi::cursor_to(w, row, col)?;
            ansi::cursor_show(w)?;
        }
        Ok(())
    }
}

/// Longest prefix of `text` that fits in `width` cells, and its width.
fn fit(text: &str, width: usize) -> (&str, usize) {
    let mut used = 0;
    for (i, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            return (&text[..i], used);
        }
        used += w;
    }
    (text, used)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
