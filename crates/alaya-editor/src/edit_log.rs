//! Undo/redo log with time-based coalescing.
//!
//! Every buffer mutation is recorded as one or more reversible [`Change`]s,
//! each stamped with the instant it was committed. The log is a single
//! vector with a cursor: entries before the cursor are applied history,
//! entries at and after it are the redo branch. Appending a new entry
//! discards the redo branch.
//!
//! There are no explicit transactions. Instead, undo and redo step over a
//! *run* of entries whose neighbouring timestamps are closer together than
//! the coalescing window (500 ms by default). Three characters typed in
//! quick succession undo together; the same three typed a second apart undo
//! one at a time. The kind of entry plays no part in the grouping.
//!
//! ```text
//!   entries:  [e0 e1 e2 | e3 e4]
//!                        ^ cursor = 3
//!   undo  -> inverse of e2, e1, e0 (while gaps < window), cursor moves left
//!   redo  -> e3, e4 (while gaps < window), cursor moves right
//! ```

use std::time::{Duration, Instant};

use log::debug;

use crate::position::Position;

/// Default gap below which neighbouring entries undo as one step.
pub const DEFAULT_COALESCE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// What a content entry did to the line vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `lines[row]` went from `old_line` to `new_line`.
    Modify,
    /// `new_line` was inserted at `row`.
    Insert,
    /// The line at `row` (`old_line`) was removed.
    Delete,
}

/// A single reversible buffer change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Content {
        kind: ContentKind,
        row: usize,
        old_line: String,
        new_line: String,
    },
    CursorMove {
        from: Position,
        to: Position,
    },
}

impl Change {
    #[must_use]
    pub fn modify(row: usize, old_line: impl Into<String>, new_line: impl Into<String>) -> Self {
        Self::Content {
            kind: ContentKind::Modify,
            row,
            old_line: old_line.into(),
            new_line: new_line.into(),
        }
    }

    #[must_use]
    pub fn insert(row: usize, line: impl Into<String>) -> Self {
        Self::Content {
            kind: ContentKind::Insert,
            row,
            old_line: String::new(),
            new_line: line.into(),
        }
    }

    #[must_use]
    pub fn delete(row: usize, line: impl Into<String>) -> Self {
        Self::Content {
            kind: ContentKind::Delete,
            row,
            old_line: line.into(),
            new_line: String::new(),
        }
    }

    #[must_use]
    pub const fn cursor_move(from: Position, to: Position) -> Self {
        Self::CursorMove { from, to }
    }

    /// Apply the forward effect.
    pub(crate) fn apply(&self, lines: &mut Vec<String>, cursor: &mut Position) {
        match self {
            Self::Content {
                kind: ContentKind::Modify,
                row,
                new_line,
                ..
            } => set_line(lines, *row, new_line),
            Self::Content {
                kind: ContentKind::Insert,
                row,
                new_line,
                ..
            } => insert_line(lines, *row, new_line),
            Self::Content {
                kind: ContentKind::Delete,
                row,
                ..
            } => remove_line(lines, *row),
            Self::CursorMove { to, .. } => *cursor = *to,
        }
    }

    /// Apply the inverse effect.
    fn revert(&self, lines: &mut Vec<String>, cursor: &mut Position) {
        match self {
            Self::Content {
                kind: ContentKind::Modify,
                row,
                old_line,
                ..
            } => set_line(lines, *row, old_line),
            Self::Content {
                kind: ContentKind::Insert,
                row,
                ..
            } => remove_line(lines, *row),
            Self::Content {
                kind: ContentKind::Delete,
                row,
                old_line,
                ..
            } => insert_line(lines, *row, old_line),
            Self::CursorMove { from, .. } => *cursor = *from,
        }
    }
}

fn set_line(lines: &mut [String], row: usize, text: &str) {
    debug_assert!(row < lines.len(), "modify past end: {row}");
    if let Some(line) = lines.get_mut(row) {
        text.clone_into(line);
    }
}

fn insert_line(lines: &mut Vec<String>, row: usize, text: &str) {
    debug_assert!(row <= lines.len(), "insert past end: {row}");
    lines.insert(row.min(lines.len()), text.to_owned());
}

fn remove_line(lines: &mut Vec<String>, row: usize) {
    debug_assert!(row < lines.len(), "delete past end: {row}");
    if row < lines.len() {
        lines.remove(row);
    }
}

// ---------------------------------------------------------------------------
// EditLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Entry {
    change: Change,
    at: Instant,
}

/// Linear undo/redo log for one buffer.
#[derive(Debug, Clone)]
pub struct EditLog {
    entries: Vec<Entry>,
    cursor: usize,
    coalesce: Duration,
}

impl EditLog {
    /// An empty log using the default 500 ms coalescing window.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_coalesce(DEFAULT_COALESCE)
    }

    #[must_use]
    pub const fn with_coalesce(coalesce: Duration) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            coalesce,
        }
    }

    /// Record `change`, committed at `at`. Discards any redo branch.
    pub fn append(&mut self, change: Change, at: Instant) {
        self.entries.truncate(self.cursor);
        self.entries.push(Entry { change, at });
        self.cursor = self.entries.len();
    }

    /// Step back over the newest run of closely-spaced entries, reverting
    /// each one newest first. Returns `false` with nothing changed when
    /// there is no history.
    pub fn undo(&mut self, lines: &mut Vec<String>, cursor: &mut Position) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let end = self.cursor;
        let mut start = end - 1;
        while start > 0 && self.close(start - 1, start) {
            start -= 1;
        }
        for entry in self.entries[start..end].iter().rev() {
            entry.change.revert(lines, cursor);
        }
        self.cursor = start;
        debug!("undo: reverted {} entries, log cursor {}", end - start, start);
        true
    }

    /// Step forward over the next run of closely-spaced entries, applying
    /// each one oldest first. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, lines: &mut Vec<String>, cursor: &mut Position) -> bool {
        if self.cursor == self.entries.len() {
            return false;
        }
        let start = self.cursor;
        let mut end = start + 1;
        while end < self.entries.len() && self.close(end - 1, end) {
            end += 1;
        }
        for entry in &self.entries[start..end] {
            entry.change.apply(lines, cursor);
        }
        self.cursor = end;
        debug!("redo: applied {} entries, log cursor {}", end - start, end);
        true
    }

    /// True when entry `b` was committed within the window after entry `a`.
    fn close(&self, a: usize, b: usize) -> bool {
        self.entries[b]
            .at
            .saturating_duration_since(self.entries[a].at)
            < self.coalesce
    }

    /// Number of recorded entries, applied and redoable.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the boundary between applied history and the redo branch.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn coalesce(&self) -> Duration {
        self.coalesce
    }
}

impl Default for EditLog {
    fn default() -> Self {
        Self::new()
    }
}
