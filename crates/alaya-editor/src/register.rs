//! Register: the single-line clipboard behind `yy` and `p`.
//!
//! Each buffer owns one register. `yy` overwrites it with a copy of the
//! current line; `p` inserts that copy as a new line below the cursor. The
//! register starts empty and pasting from an empty register does nothing.

/// One line of yanked text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    line: Option<String>,
}

impl Register {
    #[must_use]
    pub const fn new() -> Self {
        Self { line: None }
    }

    /// Store `line`, replacing any previous content.
    pub fn yank(&mut self, line: &str) {
        self.line = Some(line.to_owned());
    }

    /// The stored line, or `None` if nothing has been yanked yet.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.line.as_deref()
    }
}
