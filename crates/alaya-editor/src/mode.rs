//! Modal editing state.
//!
//! The controller is always in exactly one [`Mode`]:
//!
//! | Mode    | Keys mean                              |
//! |---------|----------------------------------------|
//! | Normal  | motions and single-key commands        |
//! | Insert  | text typed into the buffer             |
//! | Command | characters of a `:` command line       |
//!
//! This is plain data. Key handling and transitions live in
//! [`crate::controller`].

use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Command,
}

impl Mode {
    /// Upper-case name for status messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command => "COMMAND",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
