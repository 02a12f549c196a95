//! Text buffer: one file's lines, cursor, clipboard and edit log.
//!
//! # Invariants
//!
//! - `lines` is never empty. An empty file is one empty line.
//! - `cursor.row < lines.len()` and `cursor.col <= line_len(cursor.row)`.
//! - Every content change goes through [`TextBuffer::commit`], which applies
//!   the change, appends it to the [`EditLog`] with the clock's current time,
//!   and marks the buffer unsaved. Nothing else writes to `lines`.
//!
//! Plain navigation (`h/j/k/l`, `0`, `$`, `gg`, `G`, jumps) moves the cursor
//! without logging. Cursor moves that are part of an edit (after `enter`,
//! `backspace`, `paste`, ...) are logged so undo puts the cursor back.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::edit_log::{Change, EditLog};
use crate::error::{EditorError, Result};
use crate::position::Position;
use crate::register::Register;
use crate::substitute::substitute_line;
use crate::view::{self, Rendered, ScreenSize};

/// Cursor movement direction for arrow keys and `h/j/k/l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Line count and occurrence count from a substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceStats {
    pub lines: usize,
    pub occurrences: usize,
}

pub struct TextBuffer {
    path: PathBuf,
    lines: Vec<String>,
    cursor: Position,
    saved: bool,
    register: Register,
    log: EditLog,
    clock: Rc<dyn Clock>,
    size: ScreenSize,
    scroll_top: usize,
}

impl TextBuffer {
    // -- Construction -------------------------------------------------------

    /// A buffer for `path` holding `text`, considered saved.
    ///
    /// Text is split into lines with either `\n` or `\r\n` terminators. A
    /// trailing newline does not produce an extra empty line.
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            path: path.into(),
            lines,
            cursor: Position::ZERO,
            saved: true,
            register: Register::new(),
            log: EditLog::new(),
            clock: Rc::new(SystemClock),
            size: ScreenSize::default(),
            scroll_top: 0,
        }
    }

    /// An empty buffer (one empty line) for `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self::from_text(path, "")
    }

    /// Load `path` from disk.
    ///
    /// A file that does not exist yet opens as an empty buffer. Bytes that
    /// are not valid UTF-8 are replaced with U+FFFD.
    ///
    /// # Errors
    ///
    /// [`EditorError::Read`] when the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let buf = Self::from_text(path, &text);
                info!("loaded {} ({} lines)", path.display(), buf.line_count());
                Ok(buf)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} does not exist, starting empty", path.display());
                Ok(Self::empty(path))
            }
            Err(source) => Err(EditorError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Use `clock` for edit-log timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the window within which consecutive edits undo together. Only
    /// meaningful before the first edit.
    #[must_use]
    pub fn with_coalesce(mut self, window: Duration) -> Self {
        self.log = EditLog::with_coalesce(window);
        self
    }

    /// Set the terminal geometry used by [`render`](Self::render).
    #[must_use]
    pub fn with_size(mut self, size: ScreenSize) -> Self {
        self.size = size;
        self
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[inline]
    #[must_use]
    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of `row` in chars, 0 past the end.
    #[must_use]
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    /// Size of the file as it would be written, without the final newline.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        let text: usize = self.lines.iter().map(String::len).sum();
        text + self.lines.len() - 1
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.saved
    }

    #[inline]
    #[must_use]
    pub const fn edit_log(&self) -> &EditLog {
        &self.log
    }

    #[inline]
    #[must_use]
    pub const fn register(&self) -> &Register {
        &self.register
    }

    #[inline]
    #[must_use]
    pub const fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> ScreenSize {
        self.size
    }

    // -- Editing ------------------------------------------------------------

    /// Apply `change`, record it, and mark the buffer unsaved.
    fn commit(&mut self, change: Change) {
        change.apply(&mut self.lines, &mut self.cursor);
        self.log.append(change, self.clock.now());
        self.saved = false;
    }

    /// Move the cursor to `to` as part of an edit.
    fn commit_move(&mut self, to: Position) {
        if to != self.cursor {
            self.commit(Change::cursor_move(self.cursor, to));
        }
    }

    /// Insert `ch` before the cursor and step past it.
    pub fn insert_char(&mut self, ch: char) {
        let Position { row, col } = self.cursor;
        let old = self.lines[row].clone();
        let mut new = old.clone();
        new.insert(byte_index(&old, col), ch);
        self.commit(Change::modify(row, old, new));
        self.commit_move(Position::new(row, col + 1));
    }

    /// Split the line at the cursor; the cursor moves to the start of the
    /// new line.
    pub fn enter(&mut self) {
        let Position { row, col } = self.cursor;
        let old = self.lines[row].clone();
        let (head, tail) = old.split_at(byte_index(&old, col));
        let (head, tail) = (head.to_owned(), tail.to_owned());
        self.commit(Change::modify(row, old, head));
        self.commit(Change::insert(row + 1, tail));
        self.commit_move(Position::new(row + 1, 0));
    }

    /// Delete the char before the cursor. At column 0 the line joins onto
    /// the previous one. Does nothing at the very start of the buffer.
    pub fn backspace(&mut self) {
        let Position { row, col } = self.cursor;
        if col > 0 {
            let old = self.lines[row].clone();
            let mut new = old.clone();
            new.remove(byte_index(&old, col - 1));
            self.commit(Change::modify(row, old, new));
            self.commit_move(Position::new(row, col - 1));
        } else if row > 0 {
            let prev = self.lines[row - 1].clone();
            let cur = self.lines[row].clone();
            let join = prev.chars().count();
            let joined = format!("{prev}{cur}");
            self.commit(Change::modify(row - 1, prev, joined));
            self.commit(Change::delete(row, cur));
            self.commit_move(Position::new(row - 1, join));
        }
    }

    /// Remove the cursor's line. The cursor stays on the same row, or moves
    /// up when the last line was removed, and goes to column 0. Deleting
    /// the only line empties it instead.
    pub fn delete_line(&mut self) {
        let row = self.cursor.row;
        if self.lines.len() == 1 {
            let old = self.lines[0].clone();
            if !old.is_empty() {
                self.commit(Change::modify(0, old, String::new()));
            }
            self.commit_move(Position::ZERO);
            return;
        }
        let old = self.lines[row].clone();
        self.commit(Change::delete(row, old));
        let row = row.min(self.lines.len() - 1);
        self.commit_move(Position::new(row, 0));
    }

    /// Copy the cursor's line into the register. Not an edit.
    pub fn copy_line(&mut self) {
        self.register.yank(&self.lines[self.cursor.row]);
    }

    /// Insert the register's line below the cursor and move onto it.
    /// Returns `false` when the register is empty.
    pub fn paste_line(&mut self) -> bool {
        let Some(line) = self.register.content().map(str::to_owned) else {
            return false;
        };
        let row = self.cursor.row + 1;
        self.commit(Change::insert(row, line));
        self.commit_move(Position::new(row, 0));
        true
    }

    /// Indent-free tab: insert `text` char by char.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    // -- Substitution -------------------------------------------------------

    /// Replace `pattern` with `replacement` on the cursor's line.
    pub fn replace_in_line(&mut self, pattern: &str, replacement: &str) -> ReplaceStats {
        let Position { row, col } = self.cursor;
        let sub = substitute_line(&self.lines[row], pattern, replacement, col);
        if sub.occurrences == 0 {
            return ReplaceStats::default();
        }
        let old = self.lines[row].clone();
        self.commit(Change::modify(row, old, sub.text));
        self.commit_move(Position::new(row, sub.cursor_col));
        ReplaceStats {
            lines: 1,
            occurrences: sub.occurrences,
        }
    }

    /// Replace `pattern` with `replacement` on every line.
    pub fn replace_across_buffer(&mut self, pattern: &str, replacement: &str) -> ReplaceStats {
        let mut stats = ReplaceStats::default();
        let mut cursor = self.cursor;
        for row in 0..self.lines.len() {
            let col = if row == cursor.row { cursor.col } else { 0 };
            let sub = substitute_line(&self.lines[row], pattern, replacement, col);
            if sub.occurrences == 0 {
                continue;
            }
            if row == cursor.row {
                cursor.col = sub.cursor_col;
            }
            stats.lines += 1;
            stats.occurrences += sub.occurrences;
            let old = self.lines[row].clone();
            self.commit(Change::modify(row, old, sub.text));
        }
        self.commit_move(cursor);
        stats
    }

    // -- Undo / redo --------------------------------------------------------

    /// Revert the newest run of edits. Returns `false` when there is no
    /// history.
    pub fn undo(&mut self) -> bool {
        let done = self.log.undo(&mut self.lines, &mut self.cursor);
        if done {
            self.after_history_step();
        }
        done
    }

    /// Re-apply the next run of undone edits. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let done = self.log.redo(&mut self.lines, &mut self.cursor);
        if done {
            self.after_history_step();
        }
        done
    }

    fn after_history_step(&mut self) {
        self.saved = false;
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let row = self.cursor.row.min(self.lines.len() - 1);
        let col = self.cursor.col.min(self.line_len(row));
        self.cursor = Position::new(row, col);
    }

    // -- Navigation ---------------------------------------------------------

    /// Move one step. Vertical moves clamp the column to the target line.
    pub fn move_cursor(&mut self, dir: Direction) {
        let Position { row, col } = self.cursor;
        self.cursor = match dir {
            Direction::Up if row > 0 => Position::new(row - 1, col.min(self.line_len(row - 1))),
            Direction::Down if row + 1 < self.lines.len() => {
                Position::new(row + 1, col.min(self.line_len(row + 1)))
            }
            Direction::Left if col > 0 => Position::new(row, col - 1),
            Direction::Right if col < self.line_len(row) => Position::new(row, col + 1),
            _ => return,
        };
    }

    /// Step one char left, wrapping to the last char of the previous line.
    pub fn retreat(&mut self) {
        let Position { row, col } = self.cursor;
        if col > 0 {
            self.cursor.col = col - 1;
        } else if row > 0 {
            self.cursor = Position::new(row - 1, self.line_len(row - 1).saturating_sub(1));
        }
    }

    /// Start of the next line, if there is one.
    pub fn to_next_line(&mut self) {
        if self.cursor.row + 1 < self.lines.len() {
            self.cursor = Position::new(self.cursor.row + 1, 0);
        }
    }

    pub const fn to_line_front(&mut self) {
        self.cursor = self.cursor.with_col(0);
    }

    /// Last char of the line (column 0 on an empty line).
    pub fn to_line_end(&mut self) {
        self.cursor = self.cursor.with_col(self.line_len(self.cursor.row).saturating_sub(1));
    }

    pub const fn to_first_line(&mut self) {
        self.cursor = Position::ZERO;
    }

    pub fn to_last_line(&mut self) {
        self.cursor = Position::new(self.lines.len() - 1, 0);
    }

    /// Jump to 1-indexed `line`. Returns `false`, leaving the cursor alone,
    /// when `line` is outside `1..=line_count`.
    pub fn jump_to(&mut self, line: usize) -> bool {
        if line == 0 || line > self.lines.len() {
            return false;
        }
        self.cursor = Position::new(line - 1, 0);
        true
    }

    // -- Display ------------------------------------------------------------

    /// Lay out the buffer for the screen, updating the remembered scroll
    /// offset.
    pub fn render(&mut self, numbered: bool, status_line: bool) -> Rendered {
        let r = view::render(
            &self.lines,
            self.cursor,
            self.size,
            numbered,
            self.scroll_top,
            status_line,
        );
        self.scroll_top = r.scroll_top;
        r
    }

    // -- File I/O -----------------------------------------------------------

    /// Write every line followed by `\n` to the buffer's path.
    ///
    /// # Errors
    ///
    /// [`EditorError::Write`] if the file cannot be written. The buffer
    /// stays unsaved.
    pub fn save(&mut self) -> Result<()> {
        let mut out = String::with_capacity(self.byte_len() + 1);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        fs::write(&self.path, out).map_err(|source| EditorError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.saved = true;
        debug!("wrote {} ({} lines)", self.path.display(), self.lines.len());
        Ok(())
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("path", &self.path)
            .field("lines", &self.lines.len())
            .field("cursor", &self.cursor)
            .field("saved", &self.saved)
            .field("log", &self.log.len())
            .finish_non_exhaustive()
    }
}

/// Byte offset of char column `col` in `line`; the line length when `col`
/// is at or past the end.
fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;

    fn buf(text: &str) -> TextBuffer {
        TextBuffer::from_text("test.txt", text)
    }

    /// A buffer on a manual clock, for tests that care about coalescing.
    fn timed(text: &str) -> (TextBuffer, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let b = buf(text).with_clock(clock.clone());
        (b, clock)
    }

    fn at(b: &mut TextBuffer, row: usize, col: usize) {
        b.cursor = Position::new(row, col);
    }

    fn lines(b: &TextBuffer) -> Vec<&str> {
        b.lines().iter().map(String::as_str).collect()
    }

    fn assert_cursor_valid(b: &TextBuffer) {
        assert!(b.cursor.row < b.line_count());
        assert!(b.cursor.col <= b.line_len(b.cursor.row));
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn from_text_splits_lines() {
        let b = buf("one\ntwo\r\nthree\n");
        assert_eq!(lines(&b), vec!["one", "two", "three"]);
        assert!(b.is_saved());
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(lines(&buf("")), vec![""]);
    }

    #[test]
    fn byte_len_counts_separators() {
        assert_eq!(buf("ab\ncd").byte_len(), 5);
        assert_eq!(buf("").byte_len(), 0);
        assert_eq!(buf("é").byte_len(), 2);
    }

    // -- insert_char --------------------------------------------------------

    #[test]
    fn insert_char_then_undo() {
        let mut b = buf("abc\ndef");
        b.insert_char('X');
        assert_eq!(lines(&b), vec!["Xabc", "def"]);
        assert_eq!(b.cursor(), Position::new(0, 1));
        assert!(!b.is_saved());

        assert!(b.undo());
        assert_eq!(lines(&b), vec!["abc", "def"]);
        assert_eq!(b.cursor(), Position::ZERO);
    }

    #[test]
    fn insert_char_multibyte() {
        let mut b = buf("cfé");
        at(&mut b, 0, 1);
        b.insert_char('a');
        b.insert_char('ß');
        assert_eq!(lines(&b), vec!["caßfé"]);
        assert_eq!(b.cursor(), Position::new(0, 3));
    }

    #[test]
    fn insert_at_end_of_line() {
        let mut b = buf("ab");
        at(&mut b, 0, 2);
        b.insert_char('c');
        assert_eq!(lines(&b), vec!["abc"]);
    }

    // -- enter --------------------------------------------------------------

    #[test]
    fn enter_splits_line() {
        let mut b = buf("abc");
        at(&mut b, 0, 1);
        b.enter();
        assert_eq!(lines(&b), vec!["a", "bc"]);
        assert_eq!(b.cursor(), Position::new(1, 0));
    }

    #[test]
    fn enter_at_ends() {
        let mut b = buf("abc");
        b.enter();
        assert_eq!(lines(&b), vec!["", "abc"]);
        at(&mut b, 1, 3);
        b.enter();
        assert_eq!(lines(&b), vec!["", "abc", ""]);
        assert_eq!(b.cursor(), Position::new(2, 0));
    }

    #[test]
    fn enter_undo_restores_line_and_cursor() {
        let mut b = buf("hello");
        at(&mut b, 0, 2);
        b.enter();
        assert!(b.undo());
        assert_eq!(lines(&b), vec!["hello"]);
        assert_eq!(b.cursor(), Position::new(0, 2));
    }

    // -- backspace ----------------------------------------------------------

    #[test]
    fn backspace_within_line() {
        let mut b = buf("abc");
        at(&mut b, 0, 2);
        b.backspace();
        assert_eq!(lines(&b), vec!["ac"]);
        assert_eq!(b.cursor(), Position::new(0, 1));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut b = buf("ab\ncd");
        at(&mut b, 1, 0);
        b.backspace();
        assert_eq!(lines(&b), vec!["abcd"]);
        assert_eq!(b.cursor(), Position::new(0, 2));

        assert!(b.undo());
        assert_eq!(lines(&b), vec!["ab", "cd"]);
        assert_eq!(b.cursor(), Position::new(1, 0));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut b = buf("abc");
        b.backspace();
        assert_eq!(lines(&b), vec!["abc"]);
        assert!(b.is_saved());
        assert!(b.edit_log().is_empty());
    }

    // -- delete_line --------------------------------------------------------

    #[test]
    fn delete_middle_line_keeps_row() {
        let mut b = buf("a\nb\nc");
        at(&mut b, 1, 1);
        b.delete_line();
        assert_eq!(lines(&b), vec!["a", "c"]);
        assert_eq!(b.cursor(), Position::new(1, 0));
    }

    #[test]
    fn delete_last_line_moves_up() {
        let mut b = buf("a\nb\nc");
        at(&mut b, 2, 0);
        b.delete_line();
        assert_eq!(lines(&b), vec!["a", "b"]);
        assert_eq!(b.cursor(), Position::new(1, 0));
        assert_cursor_valid(&b);
    }

    #[test]
    fn delete_only_line_empties_it() {
        let mut b = buf("solo");
        at(&mut b, 0, 3);
        b.delete_line();
        assert_eq!(lines(&b), vec![""]);
        assert_eq!(b.cursor(), Position::ZERO);
        assert!(b.undo());
        assert_eq!(lines(&b), vec!["solo"]);
        assert_eq!(b.cursor(), Position::new(0, 3));
    }

    #[test]
    fn delete_line_undo() {
        let mut b = buf("a\nb\nc");
        at(&mut b, 2, 1);
        b.delete_line();
        assert!(b.undo());
        assert_eq!(lines(&b), vec!["a", "b", "c"]);
        assert_eq!(b.cursor(), Position::new(2, 1));
    }

    // -- copy / paste -------------------------------------------------------

    #[test]
    fn paste_without_copy_is_noop() {
        let mut b = buf("a");
        assert!(!b.paste_line());
        assert!(b.edit_log().is_empty());
    }

    #[test]
    fn copy_then_paste_below() {
        let mut b = buf("first\nsecond");
        b.copy_line();
        assert!(b.is_saved());
        at(&mut b, 1, 3);
        assert!(b.paste_line());
        assert_eq!(lines(&b), vec!["first", "second", "first"]);
        assert_eq!(b.cursor(), Position::new(2, 0));
    }

    // -- Substitution -------------------------------------------------------

    #[test]
    fn replace_across_buffer_counts_lines() {
        let mut b = buf("foo foo\nbaz");
        at(&mut b, 1, 2);
        let stats = b.replace_across_buffer("foo", "bar");
        assert_eq!(stats, ReplaceStats { lines: 1, occurrences: 2 });
        assert_eq!(lines(&b), vec!["bar bar", "baz"]);
        assert_eq!(b.cursor(), Position::new(1, 2));
    }

    #[test]
    fn replace_in_line_only_touches_cursor_row() {
        let mut b = buf("aXa\naXa");
        at(&mut b, 1, 2);
        let stats = b.replace_in_line("X", "");
        assert_eq!(stats, ReplaceStats { lines: 1, occurrences: 1 });
        assert_eq!(lines(&b), vec!["aXa", "aa"]);
        assert_eq!(b.cursor(), Position::new(1, 1));
    }

    #[test]
    fn replace_with_no_match_changes_nothing() {
        let mut b = buf("abc");
        assert_eq!(b.replace_in_line("z", "y"), ReplaceStats::default());
        assert_eq!(b.replace_across_buffer("z", "y"), ReplaceStats::default());
        assert!(b.is_saved());
    }

    #[test]
    fn replace_undo_restores_every_line() {
        let (mut b, clock) = timed("ab\nab\nx");
        clock.advance_ms(1000);
        b.replace_across_buffer("a", "zz");
        assert_eq!(lines(&b), vec!["zzb", "zzb", "x"]);
        assert!(b.undo());
        assert_eq!(lines(&b), vec!["ab", "ab", "x"]);
    }

    #[test]
    fn replace_clamps_cursor_to_shorter_line() {
        let mut b = buf("abcdef");
        at(&mut b, 0, 6);
        b.replace_in_line("cdef", "");
        assert_eq!(lines(&b), vec!["ab"]);
        assert_cursor_valid(&b);
    }

    // -- Coalescing ---------------------------------------------------------

    #[test]
    fn rapid_typing_undoes_as_one() {
        let (mut b, clock) = timed("");
        for ch in ['a', 'b', 'c'] {
            b.insert_char(ch);
            clock.advance_ms(10);
        }
        clock.advance_ms(600);
        assert!(b.undo());
        assert_eq!(lines(&b), vec![""]);
        assert_eq!(b.cursor(), Position::ZERO);
        assert!(!b.undo());
    }

    #[test]
    fn slow_typing_undoes_one_char_at_a_time() {
        let (mut b, clock) = timed("");
        for ch in ['a', 'b'] {
            b.insert_char(ch);
            clock.advance_ms(600);
        }
        assert!(b.undo());
        assert_eq!(lines(&b), vec!["a"]);
        assert!(b.undo());
        assert_eq!(lines(&b), vec![""]);
    }

    #[test]
    fn redo_round_trip() {
        let (mut b, clock) = timed("x");
        b.insert_char('1');
        clock.advance_ms(700);
        b.enter();
        clock.advance_ms(700);
        b.insert_char('2');
        let after: Vec<String> = b.lines().to_vec();
        let cursor = b.cursor();

        while b.undo() {}
        assert_eq!(lines(&b), vec!["x"]);
        while b.redo() {}
        assert_eq!(b.lines(), after.as_slice());
        assert_eq!(b.cursor(), cursor);
    }

    #[test]
    fn new_edit_discards_redo() {
        let (mut b, clock) = timed("");
        b.insert_char('a');
        clock.advance_ms(700);
        assert!(b.undo());
        b.insert_char('b');
        assert!(!b.redo());
        assert_eq!(lines(&b), vec!["b"]);
    }

    #[test]
    fn undo_marks_unsaved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u.txt");
        let mut b = TextBuffer::from_text(&path, "a");
        b.insert_char('b');
        b.save().unwrap();
        assert!(b.is_saved());
        assert!(b.undo());
        assert!(!b.is_saved());
    }

    // -- Navigation ---------------------------------------------------------

    #[test]
    fn vertical_move_clamps_column() {
        let mut b = buf("long line\nab\nanother long");
        at(&mut b, 0, 8);
        b.move_cursor(Direction::Down);
        assert_eq!(b.cursor(), Position::new(1, 2));
        b.move_cursor(Direction::Down);
        assert_eq!(b.cursor(), Position::new(2, 2));
    }

    #[test]
    fn moves_stop_at_edges() {
        let mut b = buf("ab");
        b.move_cursor(Direction::Up);
        b.move_cursor(Direction::Left);
        assert_eq!(b.cursor(), Position::ZERO);
        b.move_cursor(Direction::Right);
        b.move_cursor(Direction::Right);
        b.move_cursor(Direction::Right);
        assert_eq!(b.cursor(), Position::new(0, 2));
        b.move_cursor(Direction::Down);
        assert_eq!(b.cursor(), Position::new(0, 2));
    }

    #[test]
    fn navigation_is_not_logged() {
        let mut b = buf("abc\ndef");
        b.move_cursor(Direction::Down);
        b.to_line_end();
        b.to_first_line();
        b.to_last_line();
        assert!(b.jump_to(1));
        assert!(b.edit_log().is_empty());
        assert!(b.is_saved());
    }

    #[test]
    fn line_end_is_last_char() {
        let mut b = buf("abc\n");
        b.to_line_end();
        assert_eq!(b.cursor(), Position::new(0, 2));
        let mut e = buf("");
        e.to_line_end();
        assert_eq!(e.cursor(), Position::ZERO);
    }

    #[test]
    fn retreat_wraps_to_previous_line() {
        let mut b = buf("abc\nd");
        at(&mut b, 1, 0);
        b.retreat();
        assert_eq!(b.cursor(), Position::new(0, 2));
        b.retreat();
        assert_eq!(b.cursor(), Position::new(0, 1));
        at(&mut b, 0, 0);
        b.retreat();
        assert_eq!(b.cursor(), Position::ZERO);
    }

    #[test]
    fn to_next_line_stops_at_last() {
        let mut b = buf("a\nb");
        at(&mut b, 0, 1);
        b.to_next_line();
        assert_eq!(b.cursor(), Position::new(1, 0));
        b.to_next_line();
        assert_eq!(b.cursor(), Position::new(1, 0));
    }

    #[test]
    fn jump_to_out_of_range() {
        let mut b = buf("a\nb");
        at(&mut b, 1, 1);
        assert!(!b.jump_to(99));
        assert!(!b.jump_to(0));
        assert_eq!(b.cursor(), Position::new(1, 1));
        assert!(b.jump_to(2));
        assert_eq!(b.cursor(), Position::new(1, 0));
    }

    // -- Render -------------------------------------------------------------

    #[test]
    fn render_remembers_scroll() {
        let mut b = buf("0\n1\n2\n3\n4\n5").with_size(ScreenSize::new(3, 10));
        b.to_last_line();
        let r = b.render(false, false);
        assert_eq!(r.scroll_top, 3);
        assert_eq!(b.scroll_top(), 3);
        b.to_first_line();
        b.render(false, false);
        assert_eq!(b.scroll_top(), 0);
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let b = TextBuffer::load(&dir.path().join("new.txt")).unwrap();
        assert_eq!(lines(&b), vec![""]);
        assert!(b.is_saved());
    }

    #[test]
    fn load_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextBuffer::load(dir.path()).unwrap_err();
        assert!(matches!(err, EditorError::Read { .. }));
    }

    #[test]
    fn load_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.txt");
        fs::write(&path, b"ok\n\xff\xfe\n").unwrap();
        let b = TextBuffer::load(&path).unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0), Some("ok"));
        assert!(b.line(1).is_some_and(|l| l.contains('\u{FFFD}')));
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.txt");
        let mut b = TextBuffer::from_text(&path, "hello\nworld");
        b.insert_char('>');
        b.save().unwrap();
        assert!(b.is_saved());
        assert_eq!(fs::read_to_string(&path).unwrap(), ">hello\nworld\n");

        let again = TextBuffer::load(&path).unwrap();
        assert_eq!(lines(&again), vec![">hello", "world"]);
    }

    #[test]
    fn failed_save_stays_unsaved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("f.txt");
        let mut b = TextBuffer::from_text(&path, "x");
        b.insert_char('y');
        let err = b.save().unwrap_err();
        assert!(matches!(err, EditorError::Write { .. }));
        assert!(!b.is_saved());
    }
}
