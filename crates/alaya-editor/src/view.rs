//! Viewport renderer: lines in, wrapped screen rows out.
//!
//! Rendering is a pure function of the buffer lines, the cursor, the
//! terminal size, the numbering flag and the current scroll offset. It
//! produces the rows to paint, the cursor's screen position, and the scroll
//! offset to remember for next time. The renderer never touches the terminal.
//!
//! Long lines wrap (there is no horizontal scrolling), so the scroll offset
//! counts *display rows*, not buffer lines:
//!
//! ```text
//!  buffer               screen (cols = 10, numbered)
//!  ┌───────────────┐    ┌──────────┐
//!  │ hello world!! │    │   1 hello│  <- first segment carries the number
//!  │ ok            │    │      worl│  <- continuation: blank gutter
//!  └───────────────┘    │      d!! │
//!                       │   2 ok   │
//!                       │:wq       │  <- status row, when a prompt is shown
//!                       └──────────┘
//! ```
//!
//! Buffer columns count chars, but rows are filled by terminal cells: a
//! wide glyph (CJK, most emoji) takes two, combining marks take none. A
//! glyph that would straddle the right edge starts the next row instead.

use unicode_width::UnicodeWidthChar;

use crate::position::Position;

/// Terminal geometry, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub rows: usize,
    pub cols: usize,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

/// One painted row: the gutter text (empty when numbering is off) and the
/// slice of buffer text shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayRow {
    pub gutter: String,
    pub text: String,
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Exactly `visible_rows` rows, blank-padded past the end of the buffer.
    pub rows: Vec<DisplayRow>,
    /// Cursor position on screen: `row` relative to the top of the screen,
    /// `col` including the gutter.
    pub cursor: Position,
    /// First display row shown.
    pub scroll_top: usize,
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Gutter width for `line_count` lines: the digits of the largest number
/// plus one separator space, never narrower than 4. Zero when numbering is
/// off.
///
/// | Lines      | Gutter |
/// |------------|--------|
/// | 1–999      | 4      |
/// | 1000–9999  | 5      |
/// | 10000–     | 6      |
#[must_use]
pub fn gutter_width(line_count: usize, numbered: bool) -> usize {
    if !numbered {
        return 0;
    }
    let digits = line_count.max(1).ilog10() as usize + 1;
    (digits + 1).max(4)
}

/// Columns left for text once the gutter is taken. Never zero.
#[inline]
#[must_use]
pub const fn text_width(cols: usize, gutter: usize) -> usize {
    let w = cols.saturating_sub(gutter);
    if w == 0 { 1 } else { w }
}

/// Rows available for text, leaving one for the status line when present.
/// Never zero.
#[inline]
#[must_use]
pub const fn visible_rows(rows: usize, status_line: bool) -> usize {
    let reserved = if status_line { 1 } else { 0 };
    let v = rows.saturating_sub(reserved);
    if v == 0 { 1 } else { v }
}

/// Terminal cells `ch` occupies.
#[inline]
fn cell_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Lay `chars` out in rows of `width` cells and return where the last one
/// left off: the row index and the cells used on that row. A row always
/// takes at least one char, even one wider than `width`.
fn advance(chars: impl Iterator<Item = char>, width: usize) -> (usize, usize) {
    let mut row = 0;
    let mut used = 0;
    let mut started = false;
    for ch in chars {
        let w = cell_width(ch);
        if started && used + w > width {
            row += 1;
            used = 0;
        }
        used += w;
        started = true;
    }
    (row, used)
}

/// Split `line` into segments of at most `width` cells. An empty line is a
/// single empty segment.
#[must_use]
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for ch in line.chars() {
        let w = cell_width(ch);
        if !current.is_empty() && used + w > width {
            segments.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += w;
    }
    if !current.is_empty() || segments.is_empty() {
        segments.push(current);
    }
    segments
}

/// Number of display rows `line` occupies at `width`.
#[inline]
#[must_use]
pub fn row_count(line: &str, width: usize) -> usize {
    advance(line.chars(), width.max(1)).0 + 1
}

/// Segment and cell offset of char column `col` in `line`. A cursor that
/// does not fit after the chars before it moves to the next row.
fn locate(line: &str, col: usize, width: usize) -> (usize, usize) {
    let (mut seg, mut cell) = advance(line.chars().take(col), width);
    let w = line.chars().nth(col).map_or(1, cell_width).max(1);
    if cell > 0 && cell + w > width {
        seg += 1;
        cell = 0;
    }
    (seg, cell)
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Lay out `lines` for a screen of `size`, scrolled so the cursor is visible.
///
/// `scroll_top` is the offset from the previous render. It only moves when
/// the cursor would otherwise fall outside the visible rows: up to the
/// cursor row when above, or just far enough down when below.
///
/// A cursor sitting after the last char of a line that fills its last row
/// exactly lands on the row below that segment, like a terminal's pending
/// wrap.
#[must_use]
pub fn render(
    lines: &[String],
    cursor: Position,
    size: ScreenSize,
    numbered: bool,
    scroll_top: usize,
    status_line: bool,
) -> Rendered {
    let gutter = gutter_width(lines.len(), numbered);
    let width = text_width(size.cols, gutter);
    let visible = visible_rows(size.rows, status_line);

    let rows_before: usize = lines
        .iter()
        .take(cursor.row)
        .map(|l| row_count(l, width))
        .sum();
    let line = lines.get(cursor.row).map_or("", String::as_str);
    let (seg, cell) = locate(line, cursor.col, width);
    let cursor_row = rows_before + seg;
    let cursor_col = cell + gutter;

    let mut top = scroll_top;
    if cursor_row >= top + visible {
        top = cursor_row + 1 - visible;
    }
    if cursor_row < top {
        top = cursor_row;
    }

    let mut rows = Vec::with_capacity(visible);
    let mut display_row = 0;
    'lines: for (i, line) in lines.iter().enumerate() {
        let segments = row_count(line, width);
        if display_row + segments <= top {
            display_row += segments;
            continue;
        }
        for (seg, text) in wrap(line, width).into_iter().enumerate() {
            if display_row >= top {
                if rows.len() == visible {
                    break 'lines;
                }
                rows.push(DisplayRow {
                    gutter: gutter_text(gutter, (seg == 0).then_some(i + 1)),
                    text,
                });
            }
            display_row += 1;
        }
    }
    rows.resize_with(visible, DisplayRow::default);

    Rendered {
        rows,
        cursor: Position::new(cursor_row - top, cursor_col),
        scroll_top: top,
    }
}

/// Right-aligned number plus a separator space, or all blanks for a
/// continuation row.
fn gutter_text(gutter: usize, number: Option<usize>) -> String {
    if gutter == 0 {
        return String::new();
    }
    match number {
        Some(n) => format!("{n:>w$} ", w = gutter - 1),
        None => " ".repeat(gutter),
    }
}
