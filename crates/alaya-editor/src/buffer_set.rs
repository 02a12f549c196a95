//! The set of open files.
//!
//! Buffers are created once, in argument order, and live until exit. Exactly
//! one is active. Switching files is refused while the active buffer has
//! unsaved changes unless the caller forces it.

use std::path::PathBuf;
use std::rc::Rc;

use log::{error, info, warn};

use crate::buffer::TextBuffer;
use crate::clock::Clock;
use crate::error::EditorError;
use crate::options::Options;
use crate::view::ScreenSize;

/// Result of a file-switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    /// The active buffer changed.
    Opened,
    /// Active buffer has unsaved changes and the switch was not forced.
    Unsaved,
    NoNext,
    NoPrevious,
    AlreadyFirst,
    AlreadyLast,
}

/// Result of saving every unsaved buffer.
#[derive(Debug, Default)]
pub struct SaveAll {
    /// Buffers that had unsaved changes and were written.
    pub written: usize,
    pub failed: Vec<EditorError>,
}

#[derive(Debug)]
pub struct BufferSet {
    buffers: Vec<TextBuffer>,
    active: usize,
}

impl BufferSet {
    /// Wrap already-built buffers, the first one active. `None` when
    /// `buffers` is empty.
    #[must_use]
    pub fn new(buffers: Vec<TextBuffer>) -> Option<Self> {
        if buffers.is_empty() {
            return None;
        }
        Some(Self { buffers, active: 0 })
    }

    /// Load every path. Files that do not exist, or cannot be read, open as
    /// empty buffers. `None` when `paths` is empty.
    #[must_use]
    pub fn open(
        paths: &[PathBuf],
        size: ScreenSize,
        options: &Options,
        clock: &Rc<dyn Clock>,
    ) -> Option<Self> {
        let buffers = paths
            .iter()
            .map(|path| {
                let buf = TextBuffer::load(path).unwrap_or_else(|e| {
                    warn!("{e}; opening {} empty", path.display());
                    TextBuffer::empty(path)
                });
                buf.with_clock(Rc::clone(clock))
                    .with_coalesce(options.undo_coalesce)
                    .with_size(size)
            })
            .collect();
        Self::new(buffers)
    }

    // -- Access -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn active(&self) -> &TextBuffer {
        &self.buffers[self.active]
    }

    #[inline]
    pub fn active_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffers[self.active]
    }

    #[inline]
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Always false; a set holds at least one buffer.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextBuffer> {
        self.buffers.iter()
    }

    // -- Navigation ---------------------------------------------------------

    /// `:next`. The unsaved guard is checked before the boundary.
    pub fn next(&mut self, force: bool) -> Switch {
        if !force && !self.active().is_saved() {
            return Switch::Unsaved;
        }
        if self.active + 1 >= self.buffers.len() {
            return Switch::NoNext;
        }
        self.activate(self.active + 1)
    }

    /// `:prev`. The unsaved guard is checked before the boundary.
    pub fn prev(&mut self, force: bool) -> Switch {
        if !force && !self.active().is_saved() {
            return Switch::Unsaved;
        }
        if self.active == 0 {
            return Switch::NoPrevious;
        }
        self.activate(self.active - 1)
    }

    /// `:first`. The boundary is checked before the unsaved guard.
    pub fn first(&mut self, force: bool) -> Switch {
        if self.active == 0 {
            return Switch::AlreadyFirst;
        }
        if !force && !self.active().is_saved() {
            return Switch::Unsaved;
        }
        self.activate(0)
    }

    /// `:last`. The boundary is checked before the unsaved guard.
    pub fn last(&mut self, force: bool) -> Switch {
        let last = self.buffers.len() - 1;
        if self.active == last {
            return Switch::AlreadyLast;
        }
        if !force && !self.active().is_saved() {
            return Switch::Unsaved;
        }
        self.activate(last)
    }

    fn activate(&mut self, index: usize) -> Switch {
        self.active = index;
        info!("switched to {}", self.active().path().display());
        Switch::Opened
    }

    // -- Saving -------------------------------------------------------------

    /// Write every buffer with unsaved changes. Failures are collected, not
    /// fatal; the other buffers are still written.
    pub fn save_all(&mut self) -> SaveAll {
        let mut report = SaveAll::default();
        for buf in self.buffers.iter_mut().filter(|b| !b.is_saved()) {
            match buf.save() {
                Ok(()) => report.written += 1,
                Err(e) => {
                    error!("{e}");
                    report.failed.push(e);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use pretty_assertions::assert_eq;

    fn set(names: &[&str]) -> BufferSet {
        BufferSet::new(
            names
                .iter()
                .map(|n| TextBuffer::from_text(*n, "text"))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn empty_set_is_refused() {
        assert!(BufferSet::new(Vec::new()).is_none());
    }

    #[test]
    fn open_loads_and_substitutes_missing() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("a.txt");
        std::fs::write(&existing, "one\ntwo\n").unwrap();
        let missing = dir.path().join("b.txt");
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);

        let bs = BufferSet::open(
            &[existing, missing],
            ScreenSize::new(10, 40),
            &Options::default(),
            &clock,
        )
        .unwrap();
        assert_eq!(bs.len(), 2);
        assert_eq!(bs.active().line_count(), 2);
        let second: Vec<usize> = bs.iter().map(TextBuffer::line_count).collect();
        assert_eq!(second, vec![2, 1]);
        assert_eq!(bs.active().size(), ScreenSize::new(10, 40));
    }

    #[test]
    fn open_unreadable_path_is_empty_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let bs = BufferSet::open(
            &[dir.path().to_path_buf()],
            ScreenSize::default(),
            &Options::default(),
            &clock,
        )
        .unwrap();
        assert_eq!(bs.active().lines(), &[String::new()]);
    }

    // -- Navigation ---------------------------------------------------------

    #[test]
    fn next_and_prev_walk_the_list() {
        let mut bs = set(&["a", "b", "c"]);
        assert_eq!(bs.prev(false), Switch::NoPrevious);
        assert_eq!(bs.next(false), Switch::Opened);
        assert_eq!(bs.next(false), Switch::Opened);
        assert_eq!(bs.active_index(), 2);
        assert_eq!(bs.next(false), Switch::NoNext);
        assert_eq!(bs.prev(false), Switch::Opened);
        assert_eq!(bs.active_index(), 1);
    }

    #[test]
    fn first_and_last() {
        let mut bs = set(&["a", "b", "c"]);
        assert_eq!(bs.first(false), Switch::AlreadyFirst);
        assert_eq!(bs.last(false), Switch::Opened);
        assert_eq!(bs.active_index(), 2);
        assert_eq!(bs.last(false), Switch::AlreadyLast);
        assert_eq!(bs.first(false), Switch::Opened);
        assert_eq!(bs.active_index(), 0);
    }

    #[test]
    fn unsaved_guard_and_force() {
        let mut bs = set(&["a", "b"]);
        bs.active_mut().insert_char('x');
        assert_eq!(bs.next(false), Switch::Unsaved);
        assert_eq!(bs.active_index(), 0);
        assert_eq!(bs.next(true), Switch::Opened);
        assert_eq!(bs.active_index(), 1);
    }

    #[test]
    fn guard_order_differs_between_step_and_jump() {
        let mut bs = set(&["only"]);
        bs.active_mut().insert_char('x');
        // next/prev report the guard first
        assert_eq!(bs.next(false), Switch::Unsaved);
        assert_eq!(bs.prev(false), Switch::Unsaved);
        // first/last report the boundary first
        assert_eq!(bs.first(false), Switch::AlreadyFirst);
        assert_eq!(bs.last(false), Switch::AlreadyLast);
    }

    // -- Saving -------------------------------------------------------------

    #[test]
    fn save_all_writes_only_unsaved() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let mut bs = BufferSet::new(vec![
            TextBuffer::from_text(&a, "a"),
            TextBuffer::from_text(&b, "b"),
        ])
        .unwrap();
        bs.active_mut().insert_char('!');

        let report = bs.save_all();
        assert_eq!(report.written, 1);
        assert!(report.failed.is_empty());
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "!a\n");
        assert!(!b.exists());
        assert!(bs.iter().all(TextBuffer::is_saved));
    }

    #[test]
    fn save_all_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("no-such-dir").join("bad.txt");
        let mut bs = BufferSet::new(vec![
            TextBuffer::from_text(&bad, "x"),
            TextBuffer::from_text(&good, "y"),
        ])
        .unwrap();
        bs.active_mut().insert_char('1');
        bs.next(true);
        bs.active_mut().insert_char('2');

        let report = bs.save_all();
        assert_eq!(report.written, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(good.exists());
    }
}
