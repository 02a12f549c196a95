//! Cursor coordinates.
//!
//! Both coordinates are **0-indexed**. Row 0 is the first line of the buffer,
//! column 0 is the first character. Columns count chars (Unicode scalar
//! values), never bytes, so `"café"` has four columns and column 4 is the
//! insert position after the last character.
//!
//! Anything shown to the user (`:file`, line-number jumps) converts to
//! 1-indexed at the display boundary, not here.

use std::fmt;

/// A (row, col) location in a buffer.
///
/// Ordered row first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Row 0, column 0.
    pub const ZERO: Self = Self { row: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Same row, different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self { row: self.row, col }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}
