//! Editor options.
//!
//! | Option          | Default | Effect                                    |
//! |-----------------|---------|-------------------------------------------|
//! | `number`        | off     | line-number gutter, shared by all buffers |
//! | `tab_width`     | 4       | spaces inserted by TAB in Insert mode     |
//! | `undo_coalesce` | 500 ms  | max gap between edits that undo together  |
//!
//! Only `number` is reachable at runtime, through `:set number` and
//! `:set nonumber`. The others are fixed when the controller is built.

use std::time::Duration;

use crate::edit_log::DEFAULT_COALESCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub number: bool,
    pub tab_width: usize,
    pub undo_coalesce: Duration,
}

impl Options {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            number: false,
            tab_width: 4,
            undo_coalesce: DEFAULT_COALESCE,
        }
    }

    /// The text TAB inserts.
    #[must_use]
    pub fn tab_text(&self) -> String {
        " ".repeat(self.tab_width)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
